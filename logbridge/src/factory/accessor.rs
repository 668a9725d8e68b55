//! One-time binding to the backend's logical context store.

use std::fmt;

use thiserror::Error;

use crate::backend::context::ContextTags;
use crate::backend::extension::{self, ContextStoreFn};

/// Accessor binding failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessorBindingError {
    /// The backend does not publish the extension.
    #[error("backend does not publish extension '{name}'")]
    Missing { name: String },

    /// The backend publishes an incompatible version of the extension.
    #[error("backend extension '{name}' has ABI version {found}, expected {expected}")]
    AbiMismatch {
        name: String,
        expected: u32,
        found: u32,
    },
}

/// Direct handle on the backend's per-logical-context tag store.
///
/// Bound once; afterwards each call is a plain function call returning the
/// caller's current map, with no lookups through the public context API.
#[derive(Clone, Copy)]
pub struct ContextAccessor {
    store: ContextStoreFn,
}

impl ContextAccessor {
    /// Bind to the backend's logical context store.
    pub fn bind() -> Result<Self, AccessorBindingError> {
        Self::bind_to(
            extension::LOGICAL_CONTEXT_STORE,
            extension::LOGICAL_CONTEXT_STORE_ABI,
        )
    }

    pub(crate) fn bind_to(name: &str, abi: u32) -> Result<Self, AccessorBindingError> {
        let ext = extension::lookup(name).ok_or_else(|| AccessorBindingError::Missing {
            name: name.to_string(),
        })?;

        if ext.abi != abi {
            return Err(AccessorBindingError::AbiMismatch {
                name: name.to_string(),
                expected: abi,
                found: ext.abi,
            });
        }

        tracing::trace!(extension = name, abi, "Bound logical context accessor");
        Ok(Self { store: ext.store })
    }

    /// Tags of the caller's current logical call context.
    #[inline]
    pub fn current(&self) -> ContextTags {
        (self.store)()
    }
}

impl fmt::Debug for ContextAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextAccessor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::context;

    #[test]
    fn test_bind_succeeds() {
        let accessor = ContextAccessor::bind().unwrap();
        assert!(accessor.current().same_map(&context::current()));
    }

    #[test]
    fn test_accessor_sees_public_api_writes() {
        std::thread::spawn(|| {
            let accessor = ContextAccessor::bind().unwrap();
            context::set("tenant", "t1");
            assert_eq!(
                accessor.current().get("tenant"),
                Some(context::ContextValue::from("t1"))
            );
            accessor.current().set("request_id", "abc");
            assert_eq!(
                context::get("request_id"),
                Some(context::ContextValue::from("abc"))
            );
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_missing_extension() {
        let err = ContextAccessor::bind_to("no-such-store", 1).unwrap_err();
        assert_eq!(
            err,
            AccessorBindingError::Missing {
                name: "no-such-store".to_string()
            }
        );
    }

    #[test]
    fn test_abi_mismatch() {
        let err =
            ContextAccessor::bind_to(extension::LOGICAL_CONTEXT_STORE, 99).unwrap_err();
        assert!(matches!(
            err,
            AccessorBindingError::AbiMismatch {
                expected: 99,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_accessor_is_send_sync_copy() {
        fn assert_traits<T: Send + Sync + Copy>() {}
        assert_traits::<ContextAccessor>();
    }
}
