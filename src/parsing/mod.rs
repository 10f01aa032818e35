//! Text codecs for SAM header blocks and alignment lines.
//!
//! These are the functions behind [`Header::parse_text`],
//! [`Header::to_text`], [`Record::decode`] and [`Record::encode`].
//!
//! ## Example
//!
//! ```rust
//! use samstream::core::flags::FlagFormat;
//! use samstream::parsing::{header::parse_header_text, record::{decode_record, encode_record}};
//!
//! let header = parse_header_text("@SQ\tSN:chr1\tLN:248956422\n").unwrap();
//! let line = b"read1\t16\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tIIII";
//! let record = decode_record(Some(&header), line).unwrap();
//! assert_eq!(record.pos, 99);
//! assert_eq!(encode_record(&record, FlagFormat::Decimal).unwrap(), line);
//! ```
//!
//! ## Supported `@SQ` Tags
//!
//! | Tag | Description | Required |
//! |-----|-------------|----------|
//! | SN  | Sequence name | Yes |
//! | LN  | Sequence length | No |
//! | M5  | MD5 checksum | No |
//! | AS  | Assembly identifier | No |
//! | UR  | URI for sequence | No |
//! | SP  | Species | No |
//! | AN  | Alternate names (aliases) | No |
//!
//! Other tags are kept and written back unchanged.
//!
//! [`Header::parse_text`]: crate::core::header::Header::parse_text
//! [`Header::to_text`]: crate::core::header::Header::to_text
//! [`Record::decode`]: crate::core::record::Record::decode
//! [`Record::encode`]: crate::core::record::Record::encode

pub mod header;
pub mod record;
