//! Linear RGBA color used for material albedo.

use serde::{Deserialize, Serialize};

fn opaque_alpha() -> f32 {
    1.0
}

/// RGBA color with float channels, nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel. Omitted alpha deserializes as fully opaque.
    #[serde(default = "opaque_alpha")]
    pub a: f32,
}

impl Color {
    /// Fully transparent black, used for the air material.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Build an opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build a color with explicit alpha.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Channels as an array, in RGBA order.
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns true if the color is fully transparent.
    pub fn is_transparent(self) -> bool {
        self.a <= 0.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 4]> for Color {
    fn from(c: [f32; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }
}

impl From<[f32; 3]> for Color {
    fn from(c: [f32; 3]) -> Self {
        Self::rgb(c[0], c[1], c[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_is_opaque() {
        let c = Color::rgb(0.5, 0.5, 0.5);
        assert_eq!(c.a, 1.0);
        assert!(!c.is_transparent());
        assert!(Color::TRANSPARENT.is_transparent());
    }

    #[test]
    fn missing_alpha_deserializes_opaque() {
        let c: Color = serde_json::from_str(r#"{"r":0.1,"g":0.2,"b":0.3}"#).unwrap();
        assert_eq!(c, Color::rgb(0.1, 0.2, 0.3));
    }

    #[test]
    fn array_conversions() {
        assert_eq!(Color::from([1.0, 0.0, 0.0]).to_array(), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(Color::from([0.0, 0.0, 0.0, 0.0]), Color::TRANSPARENT);
    }
}
