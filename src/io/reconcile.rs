use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::core::header::Header;
use crate::core::reference::{Binding, Reference};
use crate::error::Result;

/// Name-to-reference table built while reading a stream that has no header.
///
/// The first record naming a reference registers it in the header; every
/// later record naming it is rebound to that same `Arc`. Entries are never
/// removed.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    seen: HashMap<String, Arc<Reference>>,
}

impl ReferenceTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebind `binding` to its canonical reference, registering new names.
    ///
    /// # Errors
    ///
    /// Propagates `Header::add_reference` failures for newly seen names.
    pub fn reconcile(&mut self, header: &mut Header, binding: Binding) -> Result<Binding> {
        let Binding::Mapped(decoded) = binding else {
            return Ok(Binding::Unmapped);
        };

        if let Some(known) = self.seen.get(decoded.name()) {
            return Ok(Binding::Mapped(Arc::clone(known)));
        }

        let reference = Arc::try_unwrap(decoded).unwrap_or_else(|shared| (*shared).clone());
        let registered = header.add_reference(reference)?;
        debug!(
            reference = %registered.name,
            index = ?registered.index,
            "Discovered reference sequence"
        );
        self.seen
            .insert(registered.name.clone(), Arc::clone(&registered));
        Ok(Binding::Mapped(registered))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unregistered(name: &str) -> Binding {
        Binding::Mapped(Arc::new(Reference::unregistered(name)))
    }

    #[test]
    fn test_new_name_is_registered() {
        let mut header = Header::new();
        let mut table = ReferenceTable::new();

        let bound = table.reconcile(&mut header, unregistered("chr1")).unwrap();

        assert_eq!(header.len(), 1);
        assert_eq!(table.len(), 1);
        assert_eq!(bound.index(), Some(0));
        assert!(Arc::ptr_eq(
            bound.reference().unwrap(),
            header.reference("chr1").unwrap()
        ));
    }

    #[test]
    fn test_known_name_shares_instance() {
        let mut header = Header::new();
        let mut table = ReferenceTable::new();

        let first = table.reconcile(&mut header, unregistered("chr1")).unwrap();
        let second = table.reconcile(&mut header, unregistered("chr1")).unwrap();
        let other = table.reconcile(&mut header, unregistered("chr2")).unwrap();

        assert!(first.same_reference(&second));
        assert!(!first.same_reference(&other));
        assert_eq!(other.index(), Some(1));
        assert_eq!(header.len(), 2);
    }

    #[test]
    fn test_unmapped_creates_no_entry() {
        let mut header = Header::new();
        let mut table = ReferenceTable::new();

        let bound = table.reconcile(&mut header, Binding::Unmapped).unwrap();

        assert_eq!(bound, Binding::Unmapped);
        assert!(table.is_empty());
        assert!(header.is_empty());
    }
}
