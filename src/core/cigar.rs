use std::fmt;

use crate::error::{Error, Result};
use crate::utils::validation::valid_len;

/// A CIGAR operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CigarOpKind {
    /// `M`: alignment match (sequence match or mismatch)
    Match,
    /// `I`: insertion to the reference
    Insertion,
    /// `D`: deletion from the reference
    Deletion,
    /// `N`: skipped region from the reference
    Skip,
    /// `S`: soft clip
    SoftClip,
    /// `H`: hard clip
    HardClip,
    /// `P`: padding
    Pad,
    /// `=`: sequence match
    SequenceMatch,
    /// `X`: sequence mismatch
    SequenceMismatch,
}

impl CigarOpKind {
    fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            b'M' => Self::Match,
            b'I' => Self::Insertion,
            b'D' => Self::Deletion,
            b'N' => Self::Skip,
            b'S' => Self::SoftClip,
            b'H' => Self::HardClip,
            b'P' => Self::Pad,
            b'=' => Self::SequenceMatch,
            b'X' => Self::SequenceMismatch,
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Match => 'M',
            Self::Insertion => 'I',
            Self::Deletion => 'D',
            Self::Skip => 'N',
            Self::SoftClip => 'S',
            Self::HardClip => 'H',
            Self::Pad => 'P',
            Self::SequenceMatch => '=',
            Self::SequenceMismatch => 'X',
        }
    }

    #[must_use]
    pub fn consumes_reference(self) -> bool {
        matches!(
            self,
            Self::Match | Self::Deletion | Self::Skip | Self::SequenceMatch | Self::SequenceMismatch
        )
    }

    #[must_use]
    pub fn consumes_query(self) -> bool {
        matches!(
            self,
            Self::Match
                | Self::Insertion
                | Self::SoftClip
                | Self::SequenceMatch
                | Self::SequenceMismatch
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CigarOp {
    pub kind: CigarOpKind,
    pub len: u32,
}

impl CigarOp {
    #[must_use]
    pub fn new(kind: CigarOpKind, len: u32) -> Self {
        Self { kind, len }
    }
}

/// An alignment's CIGAR; empty when unavailable (`*`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Cigar(Vec<CigarOp>);

impl Cigar {
    #[must_use]
    pub fn new(ops: Vec<CigarOp>) -> Self {
        Self(ops)
    }

    /// Parse CIGAR text such as `10M2I5M`, or `*` for none.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRecord` for unknown operations, missing or
    /// out-of-range lengths.
    pub fn parse(s: &str) -> Result<Self> {
        if s == "*" {
            return Ok(Self::default());
        }
        if s.is_empty() {
            return Err(Error::record("empty CIGAR"));
        }

        let mut ops = Vec::new();
        let mut len: i64 = 0;
        let mut has_digits = false;

        for b in s.bytes() {
            if b.is_ascii_digit() {
                len = len * 10 + i64::from(b - b'0');
                if len > i64::from(u32::MAX) {
                    return Err(Error::record(format!("CIGAR length overflow in {s:?}")));
                }
                has_digits = true;
                continue;
            }

            let kind = CigarOpKind::from_byte(b).ok_or_else(|| {
                Error::record(format!("unknown CIGAR op {:?} in {s:?}", char::from(b)))
            })?;
            if !has_digits || !valid_len(len) {
                return Err(Error::record(format!("invalid CIGAR op length in {s:?}")));
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let op_len = len as u32;
            ops.push(CigarOp::new(kind, op_len));
            len = 0;
            has_digits = false;
        }

        if has_digits {
            return Err(Error::record(format!("CIGAR {s:?} ends without an operation")));
        }
        Ok(Self(ops))
    }

    #[must_use]
    pub fn ops(&self) -> &[CigarOp] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of reference bases the alignment spans.
    #[must_use]
    pub fn reference_len(&self) -> i64 {
        self.0
            .iter()
            .filter(|op| op.kind.consumes_reference())
            .map(|op| i64::from(op.len))
            .sum()
    }

    /// Number of read bases the CIGAR accounts for.
    #[must_use]
    pub fn query_len(&self) -> i64 {
        self.0
            .iter()
            .filter(|op| op.kind.consumes_query())
            .map(|op| i64::from(op.len))
            .sum()
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("*");
        }
        for op in &self.0 {
            write!(f, "{}{}", op.len, op.kind.as_char())?;
        }
        Ok(())
    }
}
