//! Cursor-style record iteration with sticky termination.

use crate::core::record::Record;
use crate::error::{Error, Result};

/// A source of decoded records.
pub trait RecordRead {
    /// Next record, or `Ok(None)` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns any error raised while reading or decoding.
    fn read_record(&mut self) -> Result<Option<Record>>;
}

impl<S: RecordRead + ?Sized> RecordRead for &mut S {
    fn read_record(&mut self) -> Result<Option<Record>> {
        (**self).read_record()
    }
}

#[derive(Debug)]
enum State {
    Running(Option<Record>),
    Exhausted,
    Failed(Error),
}

/// Cursor over a [`RecordRead`] source.
///
/// Call [`advance`](Self::advance) until it returns `false`, then check
/// [`error`](Self::error) to tell a clean end of stream from a failure. Once
/// the iterator has stopped it stays stopped and never reads from the
/// source again.
///
/// ```
/// use samstream::io::{Reader, RecordIterator};
///
/// # fn main() -> samstream::Result<()> {
/// let data = b"r1\t4\t*\t0\t0\t*\t*\t0\t0\t*\t*\n";
/// let mut iter = RecordIterator::new(Reader::new(&data[..])?);
/// let mut names = Vec::new();
/// while iter.advance() {
///     if let Some(record) = iter.record() {
///         names.push(record.name.clone());
///     }
/// }
/// assert!(iter.error().is_none());
/// assert_eq!(names, ["r1"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RecordIterator<S> {
    source: S,
    state: State,
}

impl<S: RecordRead> RecordIterator<S> {
    /// Wrap `source`; nothing is read until the first `advance`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: State::Running(None),
        }
    }

    /// Move to the next record. Returns `false` at end of stream or after an
    /// error, and on every call after that.
    pub fn advance(&mut self) -> bool {
        if !matches!(self.state, State::Running(_)) {
            return false;
        }
        self.state = match self.source.read_record() {
            Ok(Some(record)) => State::Running(Some(record)),
            Ok(None) => State::Exhausted,
            Err(e) => State::Failed(e),
        };
        matches!(self.state, State::Running(_))
    }

    /// The current record; `None` before the first `advance` and after the
    /// iterator stops.
    #[must_use]
    pub fn record(&self) -> Option<&Record> {
        match &self.state {
            State::Running(record) => record.as_ref(),
            _ => None,
        }
    }

    /// The error that stopped iteration. End of stream is not an error.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        match &self.state {
            State::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Give up the iterator, returning the source.
    pub fn into_inner(self) -> S {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Yields `ok` records, then either an error or end of stream.
    struct Scripted {
        ok: usize,
        fail: bool,
        calls: usize,
    }

    impl Scripted {
        fn new(ok: usize, fail: bool) -> Self {
            Self { ok, fail, calls: 0 }
        }
    }

    impl RecordRead for Scripted {
        fn read_record(&mut self) -> Result<Option<Record>> {
            self.calls += 1;
            if self.calls <= self.ok {
                return Ok(Some(Record {
                    name: format!("r{}", self.calls),
                    ..Record::default()
                }));
            }
            if self.fail {
                return Err(Error::InvalidRecord("boom".to_string()));
            }
            Ok(None)
        }
    }

    #[test]
    fn test_clean_end_of_stream() {
        let mut iter = RecordIterator::new(Scripted::new(2, false));
        assert!(iter.record().is_none());

        assert!(iter.advance());
        assert_eq!(iter.record().unwrap().name, "r1");
        assert!(iter.advance());
        assert_eq!(iter.record().unwrap().name, "r2");

        assert!(!iter.advance());
        assert!(iter.record().is_none());
        assert!(iter.error().is_none());
    }

    #[test]
    fn test_error_is_sticky() {
        let mut iter = RecordIterator::new(Scripted::new(1, true));
        assert!(iter.advance());
        assert!(!iter.advance());
        assert!(matches!(iter.error(), Some(Error::InvalidRecord(_))));
        assert!(iter.record().is_none());

        for _ in 0..3 {
            assert!(!iter.advance());
        }
        assert!(iter.error().is_some());
        assert_eq!(iter.into_inner().calls, 2);
    }

    #[test]
    fn test_exhausted_source_not_polled_again() {
        let mut iter = RecordIterator::new(Scripted::new(0, false));
        assert!(!iter.advance());
        assert!(!iter.advance());
        assert_eq!(iter.into_inner().calls, 1);
    }

    #[test]
    fn test_borrowed_source() {
        let mut source = Scripted::new(3, false);
        let mut iter = RecordIterator::new(&mut source);
        let mut n = 0;
        while iter.advance() {
            n += 1;
        }
        assert_eq!(n, 3);
        assert_eq!(source.calls, 4);
    }
}
