//! A simple RGB color type for borders and the bar color schemes
use crate::{Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A packed `0x00RRGGBB` color as used for X border pixels.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    /// The raw pixel value to hand to the X server.
    pub fn pixel(&self) -> u32 {
        self.0
    }

    /// The red, green and blue components of this color.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let Color(c) = *self;

        ((c >> 16) as u8, (c >> 8) as u8, c as u8)
    }

    /// Render this color as a `#rrggbb` hex string.
    pub fn as_hex_string(&self) -> String {
        format!("#{:06x}", self.0)
    }

    fn try_from_hex(hex: &str) -> Result<Self> {
        let err = || Error::InvalidHexColor { hex: hex.into() };

        let s = hex.strip_prefix('#').ok_or_else(err)?;
        if s.len() != 6 {
            return Err(err());
        }

        let packed = u32::from_str_radix(s, 16).map_err(|_| err())?;

        Ok(Self(packed))
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }
}

impl TryFrom<&str> for Color {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::try_from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::try_from_hex(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("#000000", (0, 0, 0); "black")]
    #[test_case("#ffffff", (255, 255, 255); "white")]
    #[test_case("#888888", (0x88, 0x88, 0x88); "grey")]
    #[test_case("#cc241d", (0xcc, 0x24, 0x1d); "mixed")]
    #[test]
    fn try_from_hex(hex: &str, rgb: (u8, u8, u8)) {
        let c = Color::try_from(hex).expect("valid hex code");

        assert_eq!(c.rgb(), rgb);
        assert_eq!(c.as_hex_string(), hex.to_lowercase());
    }

    #[test_case("000000"; "missing hash")]
    #[test_case("#fff"; "too short")]
    #[test_case("#ffffffff"; "too long")]
    #[test_case("#zzzzzz"; "not hex")]
    #[test]
    fn invalid_hex_is_an_error(hex: &str) {
        assert!(Color::try_from(hex).is_err());
    }
}
