//! Streaming SAM input and output.
//!
//! - [`Reader`]: reads a header (if present) and decodes records, discovering
//!   references from the records themselves when there is no header
//! - [`RecordIterator`]: cursor over any [`RecordRead`] source that stops for
//!   good at end of stream or on the first error
//! - [`Writer`]: writes a header and then one record per line
//!
//! ## Example
//!
//! ```rust
//! use samstream::core::flags::FlagFormat;
//! use samstream::io::{Reader, Writer};
//!
//! # fn main() -> samstream::Result<()> {
//! let input = b"r1\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tIIII\n";
//! let mut reader = Reader::new(&input[..])?;
//! let mut writer = Writer::new(Vec::new(), reader.header(), FlagFormat::Hex)?;
//! for record in reader.records() {
//!     writer.write_record(&record?)?;
//! }
//! assert_eq!(reader.header().len(), 1);
//! assert_eq!(
//!     writer.into_inner(),
//!     b"r1\t0x0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tIIII\n"
//! );
//! # Ok(())
//! # }
//! ```

pub mod iterator;
pub mod reader;
pub mod reconcile;
pub mod writer;

pub use iterator::{RecordIterator, RecordRead};
pub use reader::{Reader, Records};
pub use writer::Writer;
