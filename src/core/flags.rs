use serde::Serialize;
use std::fmt;
use std::ops::BitOr;

use crate::error::{Error, Result};

/// One character per flag bit, lowest bit first; `-` marks an unset bit.
const FLAG_CHARS: &[u8; 12] = b"pPuUrR12sfdS";

/// SAM FLAG field bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Flags(pub u16);

impl Flags {
    pub const PAIRED: Self = Self(0x1);
    pub const PROPER_PAIR: Self = Self(0x2);
    pub const UNMAPPED: Self = Self(0x4);
    pub const MATE_UNMAPPED: Self = Self(0x8);
    pub const REVERSE: Self = Self(0x10);
    pub const MATE_REVERSE: Self = Self(0x20);
    pub const READ1: Self = Self(0x40);
    pub const READ2: Self = Self(0x80);
    pub const SECONDARY: Self = Self(0x100);
    pub const QC_FAIL: Self = Self(0x200);
    pub const DUPLICATE: Self = Self(0x400);
    pub const SUPPLEMENTARY: Self = Self(0x800);

    #[must_use]
    pub fn bits(self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parse a FLAG field written in any [`FlagFormat`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRecord` if the text is not a valid flag value.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::record(format!("invalid FLAG: {s:?}"));

        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return u16::from_str_radix(hex, 16).map(Self).map_err(|_| invalid());
        }
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s.parse().map(Self).map_err(|_| invalid());
        }
        if s.is_empty() {
            return Err(invalid());
        }

        let mut bits = 0u16;
        for b in s.bytes() {
            if b == b'-' {
                continue;
            }
            let bit = FLAG_CHARS.iter().position(|&c| c == b).ok_or_else(invalid)?;
            bits |= 1u16 << bit;
        }
        Ok(Self(bits))
    }

    /// Render the flag in `format`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRecord` when bits above `0x800` are set and
    /// `format` is [`FlagFormat::String`], which has no character for them.
    pub fn format(self, format: FlagFormat) -> Result<String> {
        match format {
            FlagFormat::Decimal => Ok(self.0.to_string()),
            FlagFormat::Hex => Ok(format!("0x{:x}", self.0)),
            FlagFormat::String => {
                if self.0 >> FLAG_CHARS.len() != 0 {
                    return Err(Error::record(format!(
                        "FLAG 0x{:x} has bits with no string form",
                        self.0
                    )));
                }
                Ok(FLAG_CHARS
                    .iter()
                    .enumerate()
                    .map(|(i, &c)| if self.0 & (1u16 << i) != 0 { char::from(c) } else { '-' })
                    .collect())
            }
        }
    }
}

impl BitOr for Flags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the FLAG field is rendered when writing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FlagFormat {
    /// `99`
    #[default]
    Decimal = 0,
    /// `0x63`
    Hex = 1,
    /// `pP---R1-----`
    String = 2,
}

impl FlagFormat {
    #[must_use]
    pub fn code(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for FlagFormat {
    type Error = Error;

    fn try_from(code: i64) -> Result<Self> {
        if !(Self::Decimal.code()..=Self::String.code()).contains(&code) {
            return Err(Error::InvalidFlagFormat(code));
        }
        Ok(match code {
            0 => Self::Decimal,
            1 => Self::Hex,
            _ => Self::String,
        })
    }
}
