//! Color space conversions
//!
//! sRGB transfer, Oklab/Oklch, HSL and CIE Lab/LCh (D50, as CSS defines
//! `lab()`/`lch()`).

/// A color in the Oklab perceptual space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Oklab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

/// Polar form of [`Oklab`]. Hue in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Oklch {
    pub l: f32,
    pub c: f32,
    pub h: f32,
}

impl Oklab {
    pub fn from_srgb(r: f32, g: f32, b: f32) -> Self {
        let [r, g, b] = [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b)];
        Self::from_linear_srgb(r, g, b)
    }

    pub fn from_linear_srgb(r: f32, g: f32, b: f32) -> Self {
        let l = 0.412_221_47 * r + 0.536_332_55 * g + 0.051_445_99 * b;
        let m = 0.211_903_5 * r + 0.680_699_5 * g + 0.107_396_96 * b;
        let s = 0.088_302_46 * r + 0.281_718_85 * g + 0.629_978_7 * b;

        let l_ = l.cbrt();
        let m_ = m.cbrt();
        let s_ = s.cbrt();

        Self {
            l: 0.210_454_26 * l_ + 0.793_617_8 * m_ - 0.004_072_047 * s_,
            a: 1.977_998_5 * l_ - 2.428_592_2 * m_ + 0.450_593_7 * s_,
            b: 0.025_904_037 * l_ + 0.782_771_77 * m_ - 0.808_675_77 * s_,
        }
    }

    pub fn to_linear_srgb(&self) -> [f32; 3] {
        let l_ = self.l + 0.396_337_78 * self.a + 0.215_803_76 * self.b;
        let m_ = self.l - 0.105_561_346 * self.a - 0.063_854_17 * self.b;
        let s_ = self.l - 0.089_484_18 * self.a - 1.291_485_5 * self.b;

        let l = l_ * l_ * l_;
        let m = m_ * m_ * m_;
        let s = s_ * s_ * s_;

        [
            4.076_741_7 * l - 3.307_711_6 * m + 0.230_969_94 * s,
            -1.268_438 * l + 2.609_757_4 * m - 0.341_319_38 * s,
            -0.004_196_086_3 * l - 0.703_418_6 * m + 1.707_614_7 * s,
        ]
    }

    /// sRGB-encoded components, not clamped.
    pub fn to_srgb(&self) -> [f32; 3] {
        let [r, g, b] = self.to_linear_srgb();
        [linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b)]
    }

    pub fn to_oklch(&self) -> Oklch {
        let c = (self.a * self.a + self.b * self.b).sqrt();
        let h = self.b.atan2(self.a).to_degrees();
        Oklch {
            l: self.l,
            c,
            h: if h < 0.0 { h + 360.0 } else { h },
        }
    }
}

impl Oklch {
    pub fn to_oklab(&self) -> Oklab {
        let h = self.h.to_radians();
        Oklab {
            l: self.l,
            a: self.c * h.cos(),
            b: self.c * h.sin(),
        }
    }
}

pub(crate) fn srgb_to_linear(c: f32) -> f32 {
    let abs = c.abs();
    let v = if abs <= 0.040_45 {
        abs / 12.92
    } else {
        ((abs + 0.055) / 1.055).powf(2.4)
    };
    v.copysign(c)
}

pub(crate) fn linear_to_srgb(c: f32) -> f32 {
    let abs = c.abs();
    let v = if abs <= 0.003_130_8 {
        abs * 12.92
    } else {
        1.055 * abs.powf(1.0 / 2.4) - 0.055
    };
    v.copysign(c)
}

/// HSL to sRGB. Hue in degrees, saturation and lightness in `[0, 1]`.
pub(crate) fn hsl_to_srgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let h = h.rem_euclid(360.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let f = |n: f32| {
        let k = (n + h / 30.0) % 12.0;
        let a = s * l.min(1.0 - l);
        l - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)
    };
    [f(0.0), f(8.0), f(4.0)]
}

/// CIE Lab (D50) to sRGB-encoded components, not clamped.
pub(crate) fn lab_to_srgb(l: f32, a: f32, b: f32) -> [f32; 3] {
    const EPSILON: f32 = 216.0 / 24389.0;
    const KAPPA: f32 = 24389.0 / 27.0;
    const WHITE_D50: [f32; 3] = [0.3457 / 0.3585, 1.0, (1.0 - 0.3457 - 0.3585) / 0.3585];

    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let x = if fx.powi(3) > EPSILON {
        fx.powi(3)
    } else {
        (116.0 * fx - 16.0) / KAPPA
    };
    let y = if l > KAPPA * EPSILON {
        fy.powi(3)
    } else {
        l / KAPPA
    };
    let z = if fz.powi(3) > EPSILON {
        fz.powi(3)
    } else {
        (116.0 * fz - 16.0) / KAPPA
    };

    let xyz_d50 = [x * WHITE_D50[0], y * WHITE_D50[1], z * WHITE_D50[2]];

    // Bradford chromatic adaptation D50 -> D65
    let xyz = mul3(
        [
            [0.955_473_45, -0.023_098_537, 0.063_259_31],
            [-0.028_369_706, 1.009_995_5, 0.021_041_399],
            [0.012_314_002, -0.020_507_697, 1.330_366],
        ],
        xyz_d50,
    );

    let [r, g, b] = mul3(
        [
            [3.240_97, -1.537_383_2, -0.498_610_76],
            [-0.969_243_65, 1.875_967_5, 0.041_555_06],
            [0.055_630_08, -0.203_976_96, 1.056_971_5],
        ],
        xyz,
    );

    [linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b)]
}

/// CIE LCh (D50) to sRGB-encoded components. Hue in degrees.
pub(crate) fn lch_to_srgb(l: f32, c: f32, h: f32) -> [f32; 3] {
    let h = h.to_radians();
    lab_to_srgb(l, c * h.cos(), c * h.sin())
}

fn mul3(m: [[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3], tol: f32) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tol)
    }

    #[test]
    fn oklab_white_has_unit_lightness() {
        let white = Oklab::from_srgb(1.0, 1.0, 1.0);
        assert!((white.l - 1.0).abs() < 1e-3);
        assert!(white.a.abs() < 1e-3 && white.b.abs() < 1e-3);
    }

    #[test]
    fn oklab_round_trips_srgb() {
        let samples = [[0.2, 0.4, 0.6], [1.0, 0.0, 0.0], [0.05, 0.9, 0.3]];
        for rgb in samples {
            let back = Oklab::from_srgb(rgb[0], rgb[1], rgb[2]).to_srgb();
            assert!(close(rgb, back, 1e-3), "{rgb:?} -> {back:?}");
        }
    }

    #[test]
    fn oklch_polar_form_matches_cartesian() {
        let lab = Oklab::from_srgb(0.8, 0.3, 0.1);
        let back = lab.to_oklch().to_oklab();
        assert!((lab.a - back.a).abs() < 1e-5 && (lab.b - back.b).abs() < 1e-5);
    }

    #[test]
    fn cie_lab_extremes_map_to_black_and_white() {
        assert!(close(lab_to_srgb(100.0, 0.0, 0.0), [1.0, 1.0, 1.0], 2e-3));
        assert!(close(lab_to_srgb(0.0, 0.0, 0.0), [0.0, 0.0, 0.0], 1e-4));
    }

    #[test]
    fn hsl_primaries() {
        assert!(close(hsl_to_srgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0], 1e-6));
        assert!(close(hsl_to_srgb(120.0, 1.0, 0.5), [0.0, 1.0, 0.0], 1e-6));
        assert!(close(hsl_to_srgb(240.0, 1.0, 0.5), [0.0, 0.0, 1.0], 1e-6));
        assert!(close(hsl_to_srgb(0.0, 0.0, 0.25), [0.25, 0.25, 0.25], 1e-6));
    }
}
