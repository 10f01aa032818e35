use std::fmt;

use crate::core::cigar::Cigar;
use crate::core::flags::{FlagFormat, Flags};
use crate::core::header::Header;
use crate::core::reference::Binding;
use crate::error::{Error, Result};
use crate::parsing;
use crate::utils::binning::{reg2bin, UNMAPPED_BIN};
use crate::utils::validation::{valid_index_pos, valid_int32};

/// MAPQ value meaning "not available".
pub const MAPQ_UNAVAILABLE: u8 = 255;

/// A decoded SAM alignment line.
///
/// Positions are zero-based with `-1` for unknown. `seq` holds bases as
/// written, `qual` holds Phred scores (not offset by 33); both are empty
/// when the field is `*`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub flags: Flags,
    pub reference: Binding,
    pub pos: i32,
    pub mapq: u8,
    pub cigar: Cigar,
    pub mate_reference: Binding,
    pub mate_pos: i32,
    pub template_len: i32,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
    pub aux: Vec<Aux>,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            name: String::new(),
            flags: Flags::default(),
            reference: Binding::Unmapped,
            pos: -1,
            mapq: MAPQ_UNAVAILABLE,
            cigar: Cigar::default(),
            mate_reference: Binding::Unmapped,
            mate_pos: -1,
            template_len: 0,
            seq: Vec::new(),
            qual: Vec::new(),
            aux: Vec::new(),
        }
    }
}

impl Record {
    /// Decode one SAM line (without its line terminator).
    ///
    /// With a header, reference names bind to the header's shared
    /// references. Without one, each mapped name gets a fresh unregistered
    /// [`Reference`](crate::core::reference::Reference).
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRecord` if the line is malformed, a value is out
    /// of range, or a reference name is absent from `header`.
    pub fn decode(header: Option<&Header>, line: &[u8]) -> Result<Self> {
        parsing::record::decode_record(header, line)
    }

    /// Encode as one SAM line without a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRecord` if a field cannot be represented.
    pub fn encode(&self, format: FlagFormat) -> Result<Vec<u8>> {
        parsing::record::encode_record(self, format)
    }

    /// Zero-based exclusive end on the reference. A record without
    /// reference-consuming CIGAR operations covers one base.
    #[must_use]
    pub fn end(&self) -> i64 {
        let span = self.cigar.reference_len();
        i64::from(self.pos) + if span == 0 { 1 } else { span }
    }

    /// Index bin for this record.
    ///
    /// Unmapped records get [`UNMAPPED_BIN`]; `None` if the alignment lies
    /// outside the range the binning index can address.
    #[must_use]
    pub fn bin(&self) -> Option<u16> {
        if self.flags.contains(Flags::UNMAPPED) {
            return Some(UNMAPPED_BIN);
        }
        let beg = i64::from(self.pos);
        let end = self.end();
        if !valid_index_pos(beg) || !valid_index_pos(end) {
            return None;
        }
        Some(reg2bin(beg, end))
    }

    /// Optional field with the given two-character tag.
    #[must_use]
    pub fn aux(&self, tag: &[u8; 2]) -> Option<&AuxValue> {
        self.aux.iter().find(|a| &a.tag == tag).map(|a| &a.value)
    }
}

/// A typed optional field (`TAG:TYPE:VALUE`).
#[derive(Debug, Clone, PartialEq)]
pub struct Aux {
    pub tag: [u8; 2],
    pub value: AuxValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuxValue {
    /// `A`: printable character
    Char(u8),
    /// `i`: integer, any width up to 32 bits signed or unsigned
    Int(i64),
    /// `f`: single-precision float
    Float(f32),
    /// `Z`: printable string
    String(String),
    /// `H`: hex-encoded byte array
    Hex(String),
    /// `B`: numeric array with element subtype
    Array { subtype: u8, values: Vec<f64> },
}

impl AuxValue {
    fn type_code(&self) -> char {
        match self {
            Self::Char(_) => 'A',
            Self::Int(_) => 'i',
            Self::Float(_) => 'f',
            Self::String(_) => 'Z',
            Self::Hex(_) => 'H',
            Self::Array { .. } => 'B',
        }
    }
}

impl Aux {
    /// Parse one `TAG:TYPE:VALUE` field.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRecord` if the field is malformed or its value
    /// does not match its type.
    pub fn parse(field: &str) -> Result<Self> {
        let invalid = |why: &str| Error::record(format!("invalid optional field {field:?}: {why}"));

        let bytes = field.as_bytes();
        if bytes.len() < 5 || bytes[2] != b':' || bytes[4] != b':' {
            return Err(invalid("expected TAG:TYPE:VALUE"));
        }
        if !bytes[0].is_ascii_alphabetic() || !bytes[1].is_ascii_alphanumeric() {
            return Err(invalid("bad tag"));
        }
        let tag = [bytes[0], bytes[1]];
        let value = &field[5..];

        let value = match bytes[3] {
            b'A' => match value.as_bytes() {
                [c] if (b'!'..=b'~').contains(c) => AuxValue::Char(*c),
                _ => return Err(invalid("expected one printable character")),
            },
            b'i' => {
                let n: i64 = value.parse().map_err(|_| invalid("expected integer"))?;
                if !valid_int32(n) && !(0..=i64::from(u32::MAX)).contains(&n) {
                    return Err(invalid("integer out of range"));
                }
                AuxValue::Int(n)
            }
            b'f' => AuxValue::Float(value.parse().map_err(|_| invalid("expected float"))?),
            b'Z' => {
                if !value.bytes().all(|b| b == b' ' || b.is_ascii_graphic()) {
                    return Err(invalid("non-printable string"));
                }
                AuxValue::String(value.to_string())
            }
            b'H' => {
                if value.len() % 2 != 0 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(invalid("expected even-length hex"));
                }
                AuxValue::Hex(value.to_string())
            }
            b'B' => parse_array(value).ok_or_else(|| invalid("bad numeric array"))?,
            _ => return Err(invalid("unknown type")),
        };

        Ok(Self { tag, value })
    }
}

#[allow(clippy::cast_precision_loss)]
fn parse_array(value: &str) -> Option<AuxValue> {
    let mut parts = value.split(',');
    let subtype = match parts.next()?.as_bytes() {
        [s @ (b'c' | b'C' | b's' | b'S' | b'i' | b'I' | b'f')] => *s,
        _ => return None,
    };

    let (min, max) = match subtype {
        b'c' => (f64::from(i8::MIN), f64::from(i8::MAX)),
        b'C' => (0.0, f64::from(u8::MAX)),
        b's' => (f64::from(i16::MIN), f64::from(i16::MAX)),
        b'S' => (0.0, f64::from(u16::MAX)),
        b'i' => (f64::from(i32::MIN), f64::from(i32::MAX)),
        b'I' => (0.0, f64::from(u32::MAX)),
        _ => (f64::NEG_INFINITY, f64::INFINITY),
    };

    let mut values = Vec::new();
    for part in parts {
        let v = if subtype == b'f' {
            f64::from(part.parse::<f32>().ok()?)
        } else {
            part.parse::<i64>().ok()? as f64
        };
        if v < min || v > max {
            return None;
        }
        values.push(v);
    }
    Some(AuxValue::Array { subtype, values })
}

impl fmt::Display for Aux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}:",
            char::from(self.tag[0]),
            char::from(self.tag[1]),
            self.value.type_code()
        )?;
        match &self.value {
            AuxValue::Char(c) => write!(f, "{}", char::from(*c)),
            AuxValue::Int(n) => write!(f, "{n}"),
            AuxValue::Float(x) => write!(f, "{x}"),
            AuxValue::String(s) | AuxValue::Hex(s) => f.write_str(s),
            AuxValue::Array { subtype, values } => {
                write!(f, "{}", char::from(*subtype))?;
                for v in values {
                    if *subtype == b'f' {
                        #[allow(clippy::cast_possible_truncation)]
                        let v = *v as f32;
                        write!(f, ",{v}")?;
                    } else {
                        #[allow(clippy::cast_possible_truncation)]
                        let v = *v as i64;
                        write!(f, ",{v}")?;
                    }
                }
                Ok(())
            }
        }
    }
}
