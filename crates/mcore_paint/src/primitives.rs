//! Geometric primitives

use crate::color::Color;

/// A 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Zero or negative area. NaN extents also count as empty.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Overlapping region of two rectangles.
    ///
    /// Disjoint inputs produce a zero-sized rectangle rather than `None` so a
    /// clip can be pushed and popped symmetrically even when it hides
    /// everything.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        Rect::new(x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0))
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.intersect(other).is_empty()
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// A rectangle with one uniform corner radius
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct RoundedRect {
    pub rect: Rect,
    pub radius: f32,
}

impl RoundedRect {
    pub const fn new(rect: Rect, radius: f32) -> Self {
        Self { rect, radius }
    }

    /// Radius limited to half the shorter side, never negative.
    pub fn effective_radius(&self) -> f32 {
        let max = self.rect.width.min(self.rect.height) * 0.5;
        self.radius.clamp(0.0, max.max(0.0))
    }
}

/// Stroke drawn inside a styled rectangle's edge
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Border {
    pub width: f32,
    pub color: Color,
}

impl Border {
    pub const fn new(width: f32, color: Color) -> Self {
        Self { width, color }
    }
}

/// Drop shadow parameters
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Shadow {
    pub offset_x: f32,
    pub offset_y: f32,
    pub blur_radius: f32,
    pub color: Color,
}

impl Shadow {
    pub const fn new(offset_x: f32, offset_y: f32, blur_radius: f32, color: Color) -> Self {
        Self {
            offset_x,
            offset_y,
            blur_radius,
            color,
        }
    }

    /// Area the shadow can touch for a given shape, used for clip culling.
    pub fn bounds(&self, shape: &Rect) -> Rect {
        let blur = self.blur_radius.max(0.0);
        Rect::new(
            shape.x + self.offset_x - blur,
            shape.y + self.offset_y - blur,
            shape.width + blur * 2.0,
            shape.height + blur * 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_overlapping() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 25.0, 100.0, 100.0);
        assert_eq!(a.intersect(&b), Rect::new(50.0, 25.0, 50.0, 75.0));
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_intersect_disjoint_is_empty() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 5.0, 5.0);
        let r = a.intersect(&b);
        assert!(r.is_empty());
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_effective_radius_clamped() {
        let rr = RoundedRect::new(Rect::new(0.0, 0.0, 20.0, 10.0), 50.0);
        assert_eq!(rr.effective_radius(), 5.0);
        let neg = RoundedRect::new(Rect::new(0.0, 0.0, 20.0, 10.0), -3.0);
        assert_eq!(neg.effective_radius(), 0.0);
    }

    #[test]
    fn test_shadow_bounds_cover_blur() {
        let shadow = Shadow::new(2.0, 4.0, 3.0, Color::BLACK);
        let b = shadow.bounds(&Rect::new(10.0, 10.0, 20.0, 20.0));
        assert_eq!(b, Rect::new(9.0, 11.0, 26.0, 26.0));
    }
}
