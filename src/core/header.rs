use std::collections::HashMap;
use std::sync::Arc;

use crate::core::reference::Reference;
use crate::error::{Error, Result};
use crate::parsing;
use crate::utils::validation::{check_reference_limit, is_valid_reference_name};

/// A non-`@SQ` header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLine {
    /// `@XX` followed by `TAG:VALUE` fields (`@HD`, `@RG`, `@PG`, ...)
    Tagged {
        kind: String,
        fields: Vec<(String, String)>,
    },
    /// `@CO` free text
    Comment(String),
}

impl HeaderLine {
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Tagged { kind, .. } => kind,
            Self::Comment(_) => "CO",
        }
    }

    /// Value of `tag` on a tagged line.
    #[must_use]
    pub fn field(&self, tag: &str) -> Option<&str> {
        match self {
            Self::Tagged { fields, .. } => fields
                .iter()
                .find(|(t, _)| t == tag)
                .map(|(_, v)| v.as_str()),
            Self::Comment(_) => None,
        }
    }
}

/// A SAM header: metadata lines plus an ordered, name-unique reference
/// dictionary.
///
/// Reference indices follow insertion order and are never reassigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    lines: Vec<HeaderLine>,
    references: Vec<Arc<Reference>>,
    by_name: HashMap<String, usize>,
}

impl Header {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a complete header block.
    ///
    /// # Errors
    ///
    /// See [`parsing::header::parse_header_text`].
    pub fn parse_text(text: &str) -> Result<Self> {
        parsing::header::parse_header_text(text)
    }

    /// Render the header as SAM text, one line per entry, `@HD` first.
    #[must_use]
    pub fn to_text(&self) -> String {
        parsing::header::format_header_text(self)
    }

    /// Register a reference, assigning it the next dictionary index.
    ///
    /// Returns the shared instance records should bind to.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateReference` if the name is already present,
    /// `Error::InvalidHeader` for a malformed name, or
    /// `Error::TooManyReferences` if the dictionary is full.
    pub fn add_reference(&mut self, mut reference: Reference) -> Result<Arc<Reference>> {
        if !is_valid_reference_name(&reference.name) {
            return Err(Error::header(format!(
                "invalid reference name: {:?}",
                reference.name
            )));
        }
        if self.by_name.contains_key(&reference.name) {
            return Err(Error::DuplicateReference(reference.name));
        }
        if check_reference_limit(self.references.len()).is_some() {
            return Err(Error::TooManyReferences(self.references.len()));
        }

        let index = self.references.len();
        reference.index = Some(index);
        let reference = Arc::new(reference);
        self.by_name.insert(reference.name.clone(), index);
        self.references.push(Arc::clone(&reference));
        Ok(reference)
    }

    /// Append a metadata line.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidHeader` for `@SQ` lines, which must go
    /// through [`Header::add_reference`].
    pub fn push_line(&mut self, line: HeaderLine) -> Result<()> {
        if line.kind() == "SQ" {
            return Err(Error::header("@SQ lines must be added as references"));
        }
        self.lines.push(line);
        Ok(())
    }

    #[must_use]
    pub fn reference(&self, name: &str) -> Option<&Arc<Reference>> {
        self.by_name.get(name).map(|&i| &self.references[i])
    }

    /// References in dictionary order.
    #[must_use]
    pub fn references(&self) -> &[Arc<Reference>] {
        &self.references
    }

    #[must_use]
    pub fn lines(&self) -> &[HeaderLine] {
        &self.lines
    }

    /// Number of references in the dictionary
    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    /// True if the dictionary has no references; metadata lines are not
    /// counted, matching [`Header::len`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Format version from `@HD VN`.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.hd_field("VN")
    }

    /// Sort order from `@HD SO`.
    #[must_use]
    pub fn sort_order(&self) -> Option<&str> {
        self.hd_field("SO")
    }

    fn hd_field(&self, tag: &str) -> Option<&str> {
        self.lines
            .iter()
            .find(|l| l.kind() == "HD")
            .and_then(|l| l.field(tag))
    }
}
