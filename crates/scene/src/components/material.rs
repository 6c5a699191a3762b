use serde::{Deserialize, Serialize};

/// Linear RGB color, each channel in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// `0xRRGGBB`
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::rgb(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    pub wireframe: bool,
}

impl Material {
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            opacity: 1.0,
            wireframe: false,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn wireframe(mut self) -> Self {
        self.wireframe = true;
        self
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, Material};

    #[test]
    fn hex_colors_decode_per_channel() {
        assert_eq!(Color::from_hex(0xff0000), Color::RED);
        assert_eq!(Color::from_hex(0x00ff00), Color::GREEN);
        let pink = Color::from_hex(0xff1493);
        assert_eq!(pink.r, 1.0);
        assert!((pink.g - 20.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn builder_clamps_opacity() {
        let m = Material::solid(Color::BLUE).with_opacity(1.5).wireframe();
        assert_eq!(m.opacity, 1.0);
        assert!(m.wireframe);
        assert!(!m.is_transparent());
        assert!(Material::solid(Color::BLUE).with_opacity(0.4).is_transparent());
    }
}
