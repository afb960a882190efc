use glam::Vec2;

/// Axis-aligned rectangle (top-left origin).
///
/// UI elements author their rects in logical pixels; the UI pass calls
/// [`Rect::scaled`] with the device-pixel-ratio right before upload.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let min = self.origin.min(self.max());
        let max = self.origin.max(self.max());
        Self { origin: min, size: max - min }
    }

    /// Scales origin and size by `factor`, e.g. logical → device pixels.
    #[inline]
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            origin: self.origin * factor,
            size: self.size * factor,
        }
    }
}
