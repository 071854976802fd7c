// ============================================================================
// Deep Copy Protocol
// ============================================================================
//
// Structural duplication contract for content types. Snapshots and resets
// must never alias mutable state, so every owned sub-object is cloned
// recursively while reference-only fields (shared catalog data behind an
// Arc) keep pointing at the same allocation.
//
// ============================================================================

pub mod registry;

use log::warn;
use thiserror::Error;

pub use registry::{CopyContract, contracts};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CopyError {
    #[error("No deep copy implementation for {type_name}")]
    Unsupported { type_name: &'static str },
}

pub type CopyResult<T> = Result<T, CopyError>;

/// Core trait for content types that can be structurally duplicated.
///
/// Implementors must guarantee:
/// - owned collections are duplicated, never aliased;
/// - owned sub-objects are copied recursively;
/// - scalars are copied by value;
/// - reference-only fields are shared (`Arc` clone), never cloned deeply;
/// - excluded fields (storage identity, update timestamp, derived caches)
///   are left at their default in the copy.
///
/// A type may intentionally not support copying, in which case it returns
/// [`CopyError::Unsupported`]. Collection call sites decide whether that is
/// fatal; see [`copy_or_skip`].
pub trait DeepCopy: Sized {
    fn deep_copy(&self) -> CopyResult<Self>;
}

/// Deep-copies an optional sub-object, passing `None` through.
pub fn deep_copy_opt<T: DeepCopy>(value: &Option<T>) -> CopyResult<Option<T>> {
    match value {
        Some(inner) => Ok(Some(inner.deep_copy()?)),
        None => Ok(None),
    }
}

/// Copies every element of a collection, skipping elements whose type has
/// no copy implementation instead of failing the whole operation.
///
/// Each skip is logged. This is the single place that encodes the
/// skip-instead-of-fail policy, so tightening it later is one change.
pub fn copy_or_skip<T: DeepCopy>(items: &[T], context: &str) -> Vec<T> {
    let mut copies = Vec::with_capacity(items.len());
    for item in items {
        match item.deep_copy() {
            Ok(copy) => copies.push(copy),
            Err(CopyError::Unsupported { type_name }) => {
                warn!("Skipping {type_name} while copying {context}: no deep copy implementation");
            }
        }
    }
    copies
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Copyable(u32);

    impl DeepCopy for Copyable {
        fn deep_copy(&self) -> CopyResult<Self> {
            Ok(Copyable(self.0))
        }
    }

    #[derive(Debug)]
    struct Uncopyable;

    impl DeepCopy for Uncopyable {
        fn deep_copy(&self) -> CopyResult<Self> {
            Err(CopyError::Unsupported {
                type_name: "Uncopyable",
            })
        }
    }

    #[test]
    fn test_copy_or_skip_keeps_supported_elements() {
        let items = vec![Copyable(1), Copyable(2)];
        let copies = copy_or_skip(&items, "test data");
        assert_eq!(copies.len(), 2);
        assert_eq!(copies[1].0, 2);
    }

    #[test]
    fn test_copy_or_skip_drops_unsupported_elements() {
        let items = vec![Uncopyable, Uncopyable];
        let copies = copy_or_skip(&items, "test data");
        assert!(copies.is_empty());
    }

    #[test]
    fn test_deep_copy_opt_passes_none_through() {
        let value: Option<Copyable> = None;
        assert!(deep_copy_opt(&value).unwrap().is_none());
    }

    #[test]
    fn test_unsupported_error_names_the_type() {
        let err = Uncopyable.deep_copy().unwrap_err();
        assert_eq!(
            err.to_string(),
            "No deep copy implementation for Uncopyable"
        );
    }
}
