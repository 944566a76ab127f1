//! Color types and utilities
//!
//! Colors are stored as four `f32` components in `[0, 1]`, sRGB-encoded and
//! scaled linearly from bytes. Interpolation converts into Oklab so that equal
//! steps in `t` look like equal steps to the eye.

mod named;
mod parse;
mod space;

pub use space::{Oklab, Oklch};

/// RGBA color with f32 components (0.0 to 1.0)
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const RED: Color = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create from byte components (0-255).
    ///
    /// Exact `x / 255` scaling; no transfer function is applied.
    pub fn from_bytes(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Create from hex value (0xRRGGBB or 0xRRGGBBAA)
    pub fn from_hex(hex: u32) -> Self {
        if hex > 0xFFFFFF {
            Self::from_bytes(
                ((hex >> 24) & 0xFF) as u8,
                ((hex >> 16) & 0xFF) as u8,
                ((hex >> 8) & 0xFF) as u8,
                (hex & 0xFF) as u8,
            )
        } else {
            Self::from_bytes(
                ((hex >> 16) & 0xFF) as u8,
                ((hex >> 8) & 0xFF) as u8,
                (hex & 0xFF) as u8,
                255,
            )
        }
    }

    /// Parse CSS color syntax.
    ///
    /// Accepts hex (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), `rgb()`,
    /// `rgba()`, `hsl()`, `hsla()`, `oklab()`, `oklch()`, `lab()`, `lch()`
    /// and CSS named colors. Returns `None` for anything else; callers pick
    /// their own fallback.
    pub fn parse(input: &str) -> Option<Color> {
        parse::parse_color(input)
    }

    /// Set alpha and return new color
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { a: alpha, ..self }
    }

    /// Clamp every component into `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    /// Convert to u8 array [r, g, b, a], rounding to nearest.
    pub fn to_bytes(&self) -> [u8; 4] {
        let c = self.clamped();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
            (c.a * 255.0).round() as u8,
        ]
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_bytes();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_oklab(&self) -> Oklab {
        Oklab::from_srgb(self.r, self.g, self.b)
    }

    pub fn to_oklch(&self) -> Oklch {
        self.to_oklab().to_oklch()
    }

    /// Build a color from Oklab coordinates, clipping out-of-gamut results.
    pub fn from_oklab(lab: Oklab, alpha: f32) -> Self {
        let [r, g, b] = lab.to_srgb();
        Color::new(r, g, b, alpha).clamped()
    }

    /// Interpolate between two colors in Oklab.
    ///
    /// `t` is not clamped: values outside `[0, 1]` extrapolate and the result
    /// is gamut-clipped. Callers that need strict bounds clamp `t` first.
    pub fn lerp(a: Color, b: Color, t: f32) -> Color {
        let la = a.to_oklab();
        let lb = b.to_oklab();
        let mixed = Oklab {
            l: la.l + (lb.l - la.l) * t,
            a: la.a + (lb.a - la.a) * t,
            b: la.b + (lb.b - la.b) * t,
        };
        Color::from_oklab(mixed, a.a + (b.a - a.a) * t)
    }

    /// Component-wise distance check, used where float noise is expected.
    pub fn approx_eq(&self, other: &Color, tolerance: f32) -> bool {
        (self.r - other.r).abs() <= tolerance
            && (self.g - other.g).abs() <= tolerance
            && (self.b - other.b).abs() <= tolerance
            && (self.a - other.a).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_is_exact_linear_scaling() {
        let c = Color::from_bytes(255, 0, 51, 128);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert_eq!(c.b, 0.2);
        assert_eq!(c.a, 128.0 / 255.0);
    }

    #[test]
    fn red_survives_hex_round_trip() {
        let red = Color::from_bytes(255, 0, 0, 255);
        assert_eq!(red.to_hex(), "#ff0000");
        let parsed = Color::parse(&red.to_hex()).unwrap();
        assert!(parsed.approx_eq(&red, 1e-6));
    }

    #[test]
    fn translucent_hex_keeps_alpha() {
        let c = Color::from_bytes(18, 52, 86, 120);
        assert_eq!(c.to_hex(), "#12345678");
        assert!(Color::parse("#12345678").unwrap().approx_eq(&c, 1e-6));
    }

    #[test]
    fn lerp_is_perceptual_not_linear() {
        let mid = Color::lerp(Color::BLACK, Color::WHITE, 0.5);
        let naive = Color::rgb(0.5, 0.5, 0.5);
        assert!(!mid.approx_eq(&naive, 0.01), "got {mid:?}");
        // Oklab L = 0.5 is noticeably darker than sRGB 0.5 gray.
        assert!(mid.r < 0.45 && mid.r > 0.3, "got {mid:?}");
        assert!((mid.r - mid.g).abs() < 1e-3 && (mid.g - mid.b).abs() < 1e-3);
    }

    #[test]
    fn lerp_endpoints_reproduce_inputs() {
        let a = Color::from_hex(0x3366cc);
        let b = Color::from_hex(0xffaa00);
        assert!(Color::lerp(a, b, 0.0).approx_eq(&a, 1e-3));
        assert!(Color::lerp(a, b, 1.0).approx_eq(&b, 1e-3));
    }

    #[test]
    fn lerp_does_not_clamp_t_but_clips_gamut() {
        let c = Color::lerp(Color::BLACK, Color::WHITE, 1.5);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.a, 1.0);
        let alpha = Color::lerp(Color::TRANSPARENT, Color::BLACK, 0.25).a;
        assert!((alpha - 0.25).abs() < 1e-6);
    }
}
