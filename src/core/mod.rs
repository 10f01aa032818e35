//! Core data types for SAM headers and alignment records.
//!
//! - [`Reference`](reference::Reference): one reference sequence, shared by
//!   every record aligned to it
//! - [`Binding`](reference::Binding): a record's RNAME or RNEXT, either a
//!   shared reference or unmapped (`*`)
//! - [`Header`](header::Header): the `@SQ` dictionary plus other header lines
//! - [`Record`](record::Record): one alignment line, with
//!   [`Flags`](flags::Flags), [`Cigar`](cigar::Cigar) and optional fields
//!
//! ## Reference identity
//!
//! Records never hold a reference by value. Every record naming `chr1`
//! holds a clone of the same `Arc<Reference>` the header holds, so
//! `Arc::ptr_eq` tells whether two records sit on the same sequence. This
//! holds with or without a header in the input:
//!
//! | Input         | Where references come from                      |
//! |---------------|-------------------------------------------------|
//! | Header block  | `@SQ` lines, in order                           |
//! | No header     | First record naming each sequence, in order     |

pub mod cigar;
pub mod flags;
pub mod header;
pub mod record;
pub mod reference;
