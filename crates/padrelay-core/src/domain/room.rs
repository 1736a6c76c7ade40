//! Room codes.
//!
//! A room code routes this relay's packets to one remote session.  It is
//! sent on the wire as a JSON integer and must render as exactly six
//! decimal digits, so the valid range is `100000..=999999`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when user input is not a valid room code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomCodeError {
    #[error("room code is empty")]
    Empty,
    #[error("room code must contain only digits, got {0:?}")]
    NotNumeric(String),
    #[error("room code must be exactly 6 digits, got {0}")]
    WrongLength(usize),
    #[error("room code must not start with 0")]
    LeadingZero,
}

/// A validated six-digit room code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RoomCode(u32);

impl RoomCode {
    pub const MIN: u32 = 100_000;
    pub const MAX: u32 = 999_999;

    /// Wraps an integer, rejecting values outside `100000..=999999`.
    pub fn new(value: u32) -> Result<Self, RoomCodeError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RoomCodeError::WrongLength(value.to_string().len()))
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl FromStr for RoomCode {
    type Err = RoomCodeError;

    /// Parses user input.  Surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RoomCodeError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RoomCodeError::NotNumeric(s.to_string()));
        }
        if s.len() != 6 {
            return Err(RoomCodeError::WrongLength(s.len()));
        }
        if s.starts_with('0') {
            return Err(RoomCodeError::LeadingZero);
        }
        // Six ASCII digits always fit in a u32.
        s.parse::<u32>()
            .map(Self)
            .map_err(|_| RoomCodeError::NotNumeric(s.to_string()))
    }
}

impl TryFrom<u32> for RoomCode {
    type Error = RoomCodeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomCode> for u32 {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}
