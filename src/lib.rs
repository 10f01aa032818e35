//! # samstream
//!
//! A streaming reader and writer for SAM text alignment files.
//!
//! SAM files usually start with a header whose `@SQ` lines list the reference
//! sequences that records align to, but plenty of tools emit bare records
//! with no header at all. `samstream` reads both: with a header, records bind
//! to its references; without one, references are discovered from the
//! records as they are read, and every record naming the same sequence
//! shares one [`Reference`] instance.
//!
//! ## Features
//!
//! - **Header or no header**: detected from the first byte of the stream
//! - **Shared references**: records hold `Arc<Reference>`, so identity is a
//!   pointer comparison
//! - **Sticky iteration**: [`RecordIterator`] stops for good on end of stream
//!   or the first error, and tells the two apart
//! - **FLAG formats**: write FLAG as decimal, hex, or a character string
//! - **Binning**: [`reg2bin`] computes the UCSC/BAI index bin of an interval
//!
//! ## Example
//!
//! ```rust
//! use samstream::{FlagFormat, Reader, RecordIterator, Writer};
//!
//! # fn main() -> samstream::Result<()> {
//! let input = b"r1\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tIIII\n\
//! r2\t0\tchr1\t300\t60\t4M\t*\t0\t0\tACGT\tIIII\n";
//!
//! let reader = Reader::new(&input[..])?;
//! let mut out = Writer::new(Vec::new(), reader.header(), FlagFormat::String)?;
//!
//! let mut records = RecordIterator::new(reader);
//! while records.advance() {
//!     if let Some(record) = records.record() {
//!         out.write_record(record)?;
//!     }
//! }
//! assert!(records.error().is_none());
//!
//! let reader = records.into_inner();
//! assert_eq!(reader.header().len(), 1);
//! assert_eq!(reader.header().references()[0].name, "chr1");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Headers, references, records and their fields
//! - [`parsing`]: Text codecs for header blocks and alignment lines
//! - [`io`]: Streaming reader, iterator, and writer
//! - [`utils`]: Range checks and index binning
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod error;
pub mod io;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::flags::{FlagFormat, Flags};
pub use core::header::Header;
pub use core::record::Record;
pub use core::reference::{Binding, Reference};
pub use error::{Error, Result};
pub use io::{Reader, RecordIterator, RecordRead, Writer};
pub use utils::binning::reg2bin;
