//! Streaming SAM reader.
//!
//! The reader decides its mode from the first byte of the stream:
//!
//! - `@`: a header block is read and parsed up front, and records are
//!   decoded against it.
//! - anything else, or an empty stream: there is no header. Records are
//!   decoded by name and reconciled through a [`ReferenceTable`], which
//!   builds up [`Reader::header`] in first-seen order.

use std::io::{self, BufRead};

use tracing::{debug, trace};

use crate::core::header::Header;
use crate::core::record::Record;
use crate::error::{Error, Result};
use crate::io::iterator::RecordRead;
use crate::io::reconcile::ReferenceTable;

/// First byte of every header line.
const HEADER_PREFIX: u8 = b'@';

/// SAM text reader over any buffered byte source.
pub struct Reader<R> {
    inner: R,
    header: Header,
    table: Option<ReferenceTable>,
    buf: Vec<u8>,
}

impl<R: BufRead> Reader<R> {
    /// Create a reader, consuming the header block if the stream has one.
    ///
    /// # Example
    ///
    /// ```
    /// use samstream::io::Reader;
    ///
    /// # fn main() -> samstream::Result<()> {
    /// let data = b"@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:1000\n";
    /// let reader = Reader::new(&data[..])?;
    /// assert_eq!(reader.header().len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `Error::TruncatedHeader` if the stream ends inside a header
    /// line, `Error::InvalidHeader` (or another header error) if the block
    /// does not parse, or `Error::Io` if the source fails.
    pub fn new(mut inner: R) -> Result<Self> {
        if peek(&mut inner)? != Some(HEADER_PREFIX) {
            debug!("No SAM header present, discovering references from records");
            return Ok(Self {
                inner,
                header: Header::new(),
                table: Some(ReferenceTable::new()),
                buf: Vec::new(),
            });
        }

        let block = read_header_block(&mut inner)?;
        let text = std::str::from_utf8(&block)
            .map_err(|_| Error::header("header is not valid UTF-8"))?;
        let header = Header::parse_text(text)?;

        Ok(Self {
            inner,
            header,
            table: None,
            buf: block,
        })
    }

    /// The header read from the stream.
    ///
    /// Without a header block this only lists references seen so far.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// True if the stream began with a header block.
    #[must_use]
    pub fn has_header_block(&self) -> bool {
        self.table.is_none()
    }

    /// Read the next record; `Ok(None)` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRecord` for a line that does not decode,
    /// `Error::DuplicateReference` or `Error::InvalidHeader` if a discovered
    /// reference cannot be registered, or `Error::Io` if the source fails.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        self.buf.clear();
        if self.inner.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        let line = strip_line_ending(&self.buf);

        let record = match self.table.as_mut() {
            None => Record::decode(Some(&self.header), line)?,
            Some(table) => {
                let mut record = Record::decode(None, line)?;
                record.reference =
                    table.reconcile(&mut self.header, std::mem::take(&mut record.reference))?;
                record.mate_reference = table
                    .reconcile(&mut self.header, std::mem::take(&mut record.mate_reference))?;
                record
            }
        };

        trace!(name = %record.name, reference = record.reference.name(), "Read SAM record");
        Ok(Some(record))
    }

    /// Iterate over the remaining records.
    pub fn records(&mut self) -> Records<'_, R> {
        Records { reader: self }
    }

    /// Give up the reader, keeping the header.
    pub fn into_header(self) -> Header {
        self.header
    }

    /// Give up the reader, returning the source positioned after the last
    /// line read.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: BufRead> RecordRead for Reader<R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        Reader::read_record(self)
    }
}

/// Iterator over the records of a [`Reader`].
pub struct Records<'a, R> {
    reader: &'a mut Reader<R>,
}

impl<'a, R: BufRead> Iterator for Records<'a, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}

fn peek<R: BufRead>(reader: &mut R) -> io::Result<Option<u8>> {
    loop {
        match reader.fill_buf() {
            Ok(buf) => return Ok(buf.first().copied()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

/// Read whole lines while the next one starts with `@`.
fn read_header_block<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut block = Vec::new();
    loop {
        let n = reader.read_until(b'\n', &mut block)?;
        if n == 0 || block.last() != Some(&b'\n') {
            return Err(Error::TruncatedHeader);
        }
        if peek(reader)? != Some(HEADER_PREFIX) {
            return Ok(block);
        }
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
