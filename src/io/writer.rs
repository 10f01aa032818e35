use std::io::Write;

use tracing::{debug, trace};

use crate::core::flags::FlagFormat;
use crate::core::header::Header;
use crate::core::record::Record;
use crate::error::Result;

/// SAM text writer.
///
/// The header is written once, at construction; each record is then written
/// as one line. Nothing is buffered here, so wrap unbuffered sinks in a
/// `BufWriter`.
pub struct Writer<W: Write> {
    inner: W,
    format: FlagFormat,
}

impl<W: Write> Writer<W> {
    /// Create a writer, writing `header` to `inner` before returning.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the header cannot be written.
    pub fn new(mut inner: W, header: &Header, format: FlagFormat) -> Result<Self> {
        let text = header.to_text();
        inner.write_all(text.as_bytes())?;
        debug!(references = header.len(), ?format, "Wrote SAM header");
        Ok(Self { inner, format })
    }

    /// Like [`new`](Self::new), taking the FLAG format as its numeric code.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidFlagFormat` for a code outside `0..=2`, in
    /// which case nothing is written.
    ///
    /// ```
    /// use samstream::core::header::Header;
    /// use samstream::io::Writer;
    ///
    /// let mut out = Vec::new();
    /// assert!(Writer::with_format_code(&mut out, &Header::new(), 7).is_err());
    /// assert!(out.is_empty());
    /// ```
    pub fn with_format_code(inner: W, header: &Header, code: i64) -> Result<Self> {
        let format = FlagFormat::try_from(code)?;
        Self::new(inner, header, format)
    }

    /// Write one record followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRecord` if the record cannot be encoded, or
    /// `Error::Io` if the write fails. A failed write is not retried.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        let mut line = record.encode(self.format)?;
        line.push(b'\n');
        self.inner.write_all(&line)?;
        trace!(name = %record.name, "Wrote SAM record");
        Ok(())
    }

    /// Flush the underlying sink.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the underlying flush fails.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// FLAG format used for every record.
    #[must_use]
    pub fn format(&self) -> FlagFormat {
        self.format
    }

    /// The underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Give up the writer, returning the sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::flags::Flags;
    use crate::error::Error;

    #[test]
    fn test_header_written_on_construction() {
        let header = Header::parse_text("@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:100\n").unwrap();
        let writer = Writer::new(Vec::new(), &header, FlagFormat::Decimal).unwrap();
        assert_eq!(writer.get_ref(), b"@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:100\n");
    }

    #[test]
    fn test_empty_header_writes_nothing() {
        let writer = Writer::new(Vec::new(), &Header::new(), FlagFormat::Hex).unwrap();
        assert!(writer.into_inner().is_empty());
    }

    #[test]
    fn test_invalid_format_code_writes_nothing() {
        let header = Header::parse_text("@SQ\tSN:chr1\tLN:100\n").unwrap();
        let mut out = Vec::new();
        for code in [-1, 3, 42] {
            let result = Writer::with_format_code(&mut out, &header, code);
            assert!(matches!(result, Err(Error::InvalidFlagFormat(c)) if c == code));
        }
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_record_in_each_format() {
        let record = Record {
            name: "r1".to_string(),
            flags: Flags::PAIRED | Flags::UNMAPPED,
            ..Record::default()
        };
        let expected = [(0, "5"), (1, "0x5"), (2, "p-u---------")];
        for (code, flag) in expected {
            let mut writer = Writer::with_format_code(Vec::new(), &Header::new(), code).unwrap();
            writer.write_record(&record).unwrap();
            let text = String::from_utf8(writer.into_inner()).unwrap();
            assert_eq!(text, format!("r1\t{flag}\t*\t0\t255\t*\t*\t0\t0\t*\t*\n"));
        }
    }

    #[test]
    fn test_unencodable_record_writes_nothing() {
        let mut writer = Writer::new(Vec::new(), &Header::new(), FlagFormat::Decimal).unwrap();
        for name in ["bad\tname", "@rg", "a b"] {
            let record = Record {
                name: name.to_string(),
                ..Record::default()
            };
            assert!(matches!(
                writer.write_record(&record),
                Err(Error::InvalidRecord(_))
            ));
        }
        assert!(writer.get_ref().is_empty());
    }
}
