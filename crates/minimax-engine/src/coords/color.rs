/// Linear RGBA color (not sRGB-encoded).
///
/// Used as the clear color of the geometry pass and as the fill of UI quads.
/// UI quads are blended as premultiplied alpha; see [`ColorRgba::premultiplied`].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Builds a color from a packed `0xRRGGBBAA` value, 8 bits per channel.
    ///
    /// RGB bytes are sRGB-encoded, as in CSS or an image editor, and are
    /// decoded to linear so an sRGB surface shows the same shade. Alpha is
    /// taken as is.
    pub fn from_rgba8_hex(rgba: u32) -> Self {
        let byte = |shift: u32| ((rgba >> shift) & 0xff) as f32 / 255.0;
        Self::new(
            srgb_to_linear(byte(24)),
            srgb_to_linear(byte(16)),
            srgb_to_linear(byte(8)),
            byte(0),
        )
    }

    /// Returns the color with `alpha` multiplied in and RGB premultiplied.
    #[inline]
    pub fn premultiplied(self, alpha: f32) -> Self {
        let a = (self.a * alpha).clamp(0.0, 1.0);
        Self::new(self.r * a, self.g * a, self.b * a, a)
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl From<ColorRgba> for wgpu::Color {
    fn from(c: ColorRgba) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_to_srgb(c: f32) -> f32 {
        if c <= 0.0031308 {
            c * 12.92
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        }
    }

    #[test]
    fn hex_unpacks_channels_in_rgba_order() {
        let c = ColorRgba::from_rgba8_hex(0xff00_8080);
        assert!((c.r - 1.0).abs() < 1e-6);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 0.215_860_5).abs() < 1e-5, "b = {}", c.b);
        // Alpha stays linear.
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn hex_gray_is_stored_linear_and_presents_as_written() {
        let c = ColorRgba::from_rgba8_hex(0x3030_30ff);
        assert!((c.r - 0.029_556_8).abs() < 1e-5, "r = {}", c.r);
        assert_eq!(c.r, c.g);
        assert_eq!(c.g, c.b);

        // An sRGB surface re-encodes the clear value back to 0x30.
        let shown = (linear_to_srgb(c.r) * 255.0).round() as u32;
        assert_eq!(shown, 0x30);
    }

    #[test]
    fn dark_channels_use_the_linear_segment() {
        let c = ColorRgba::from_rgba8_hex(0x0a00_00ff);
        assert!((c.r - (10.0 / 255.0) / 12.92).abs() < 1e-7);
    }

    #[test]
    fn premultiplied_scales_rgb_by_alpha() {
        let c = ColorRgba::new(1.0, 0.5, 0.25, 1.0).premultiplied(0.5);
        assert_eq!(c, ColorRgba::new(0.5, 0.25, 0.125, 0.5));
    }

    #[test]
    fn premultiplied_clamps_alpha() {
        let c = ColorRgba::white().premultiplied(2.0);
        assert_eq!(c.a, 1.0);
    }
}
