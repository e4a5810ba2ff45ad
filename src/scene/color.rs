/// Linear RGB color with channels in `0.0..=1.0`, the renderer's native form.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("expected 6 hex digits, got {0:?}")]
    Length(String),
    #[error("invalid hex digits in {0:?}")]
    Digits(String),
}

impl Color {
    pub const RED: Self = Self::new(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0);
    pub const YELLOW: Self = Self::new(1.0, 1.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Per-channel 0–255 values as reported by the host. Out of range values are clamped.
    pub fn from_ints(rgb: [f64; 3]) -> Self {
        let channel = |value: f64| (value.clamp(0.0, 255.0) / 255.0) as f32;
        Self::new(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]))
    }

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(text: &str) -> Result<Self, ColorParseError> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(ColorParseError::Length(text.to_string()));
        }
        if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digits(text.to_string()));
        }
        let value =
            u32::from_str_radix(digits, 16).map_err(|_| ColorParseError::Digits(text.to_string()))?;
        Ok(Self::from_ints([
            ((value >> 16) & 0xFF) as f64,
            ((value >> 8) & 0xFF) as f64,
            (value & 0xFF) as f64,
        ]))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::YELLOW
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, ColorParseError};

    #[test]
    fn hex_parses_with_and_without_hash() {
        assert_eq!(Color::from_hex("#00ff00").unwrap(), Color::GREEN);
        assert_eq!(Color::from_hex("FF0000").unwrap(), Color::RED);
    }

    #[test]
    fn hex_rejects_bad_input() {
        assert!(matches!(
            Color::from_hex("#0f0"),
            Err(ColorParseError::Length(_))
        ));
        assert!(matches!(
            Color::from_hex("#zz0000"),
            Err(ColorParseError::Digits(_))
        ));
        // Sign characters must not slip through from_str_radix.
        assert!(Color::from_hex("+12345").is_err());
    }

    #[test]
    fn ints_are_normalized_and_clamped() {
        let color = Color::from_ints([255.0, 0.0, 300.0]);
        assert_eq!(color, Color::new(1.0, 0.0, 1.0));
        let mid = Color::from_ints([51.0, -4.0, 102.0]);
        assert!((mid.r - 0.2).abs() < 1e-6);
        assert_eq!(mid.g, 0.0);
        assert!((mid.b - 0.4).abs() < 1e-6);
    }
}
