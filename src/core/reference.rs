use serde::Serialize;
use std::sync::Arc;

/// Name used in SAM text for a missing reference.
pub const UNMAPPED_NAME: &str = "*";

/// A reference sequence from the header dictionary (`@SQ` line).
///
/// Once registered with a [`Header`](crate::core::header::Header) a
/// reference is shared as `Arc<Reference>`; every record that names it holds
/// the same allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Sequence name (SN tag)
    pub name: String,

    /// Sequence length (LN tag); unknown for references discovered from
    /// records alone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,

    /// Position in the header dictionary, assigned on registration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    /// MD5 checksum of the sequence (M5 tag), lowercase hex
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,

    /// Assembly identifier (AS tag)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assembly: Option<String>,

    /// URI where sequence can be retrieved (UR tag)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Species (SP tag)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,

    /// Alternative names (AN tag)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// Any other tags, in input order
    #[serde(skip)]
    pub other: Vec<(String, String)>,
}

impl Reference {
    pub fn new(name: impl Into<String>, length: u32) -> Self {
        let mut reference = Self::unregistered(name);
        reference.length = Some(length);
        reference
    }

    /// A reference known only by name, as produced when decoding a record
    /// without a header.
    pub fn unregistered(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            length: None,
            index: None,
            md5: None,
            assembly: None,
            uri: None,
            species: None,
            aliases: Vec::new(),
            other: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The reference a record field points at.
#[derive(Debug, Clone, Default)]
pub enum Binding {
    Mapped(Arc<Reference>),
    #[default]
    Unmapped,
}

impl Binding {
    /// Name as written in SAM text; `*` when unmapped.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Mapped(reference) => reference.name(),
            Self::Unmapped => UNMAPPED_NAME,
        }
    }

    #[must_use]
    pub fn reference(&self) -> Option<&Arc<Reference>> {
        match self {
            Self::Mapped(reference) => Some(reference),
            Self::Unmapped => None,
        }
    }

    #[must_use]
    pub fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped(_))
    }

    /// Dictionary index of the bound reference, if it has been registered.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.reference().and_then(|r| r.index)
    }

    /// True when both bindings hold the very same `Arc`, or are both unmapped.
    #[must_use]
    pub fn same_reference(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Mapped(a), Self::Mapped(b)) => Arc::ptr_eq(a, b),
            (Self::Unmapped, Self::Unmapped) => true,
            _ => false,
        }
    }
}

impl PartialEq for Binding {
    /// Bindings compare by reference name and dictionary slot, so records
    /// decoded against equivalent headers compare equal.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Mapped(a), Self::Mapped(b)) => {
                Arc::ptr_eq(a, b) || (a.name == b.name && a.index == b.index)
            }
            (Self::Unmapped, Self::Unmapped) => true,
            _ => false,
        }
    }
}

impl Eq for Binding {}
