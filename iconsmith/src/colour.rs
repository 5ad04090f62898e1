//! `colour`
//!
//! RGB colours as they appear in the icon markup.

use std::fmt;

use crate::document::ParseError;

/// The background colour used when the document does not name one.
pub const DEFAULT_BACKGROUND: Colour = Colour([0x0B, 0x35, 0x71]);

/// Opaque white, used for every polygon.
pub const WHITE: Colour = Colour([0xFF, 0xFF, 0xFF]);

/// An opaque colour [R, G, B].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Colour(pub [u8; 3]);

impl Colour {
    /// Parses a `#RRGGBB` colour. The three digit `#RGB` shorthand is also accepted.
    ///
    /// # Arguments
    /// * `value`: The attribute value, surrounding whitespace is ignored.
    ///
    /// # Errors
    /// [`ParseError::InvalidColour`] if `value` is not a hex colour.
    pub fn from_hex(value: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidColour(value.to_string());

        let digits = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |hex: &str| u8::from_str_radix(hex, 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Colour([
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            ])),
            3 => {
                let mut rgb = [0; 3];
                for (slot, c) in rgb.iter_mut().zip(digits.chars()) {
                    // 0xA -> 0xAA
                    *slot = channel(&c.to_string())? * 0x11;
                }
                Ok(Colour(rgb))
            }
            _ => Err(invalid()),
        }
    }

    /// Red channel.
    pub fn red(self) -> u8 {
        self.0[0]
    }

    /// Green channel.
    pub fn green(self) -> u8 {
        self.0[1]
    }

    /// Blue channel.
    pub fn blue(self) -> u8 {
        self.0[2]
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

impl PartialEq<[u8; 3]> for Colour {
    fn eq(&self, other: &[u8; 3]) -> bool {
        self.0.eq(other)
    }
}
