//! Station code types.

use std::fmt;

/// Error returned when a station code fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidCrs {
    #[error("station code must be exactly 3 characters")]
    WrongLength,
    #[error("station code must be uppercase letters A-Z")]
    NotUppercase,
}

/// A validated 3-letter CRS station code.
///
/// Every station is identified by a CRS (Computer Reservation System)
/// code of exactly three uppercase ASCII letters. Values of this type
/// are valid by construction, so the store and planner never re-check
/// the codes they are handed.
///
/// # Examples
///
/// ```
/// use journey_server::domain::Crs;
///
/// let pnz = Crs::parse("PNZ").unwrap();
/// assert_eq!(pnz.as_str(), "PNZ");
///
/// assert!(Crs::parse("pnz").is_err());
/// assert!(Crs::parse("PENZANCE").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs([u8; 3]);

impl Crs {
    /// Parse a station code.
    ///
    /// The input must be exactly three uppercase ASCII letters; anything
    /// else, including lowercase, is rejected.
    pub fn parse(s: &str) -> Result<Self, InvalidCrs> {
        let bytes = s.as_bytes();

        let &[a, b, c] = bytes else {
            return Err(InvalidCrs::WrongLength);
        };

        if !bytes.iter().all(|b| b.is_ascii_uppercase()) {
            return Err(InvalidCrs::NotUppercase);
        }

        Ok(Crs([a, b, c]))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // SAFETY: only uppercase ASCII letters are ever stored
        std::str::from_utf8(&self.0).unwrap()
    }
}

impl fmt::Debug for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Crs({})", self.as_str())
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
