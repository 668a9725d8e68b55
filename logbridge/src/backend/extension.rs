//! Internal extension table.
//!
//! The backend publishes selected internals here so adapters can bind to
//! them once at startup instead of going through the per-call public API.
//! Every entry carries an ABI version; binders must check it.

use crate::backend::context::{self, ContextTags};

/// Name of the logical context store extension.
pub const LOGICAL_CONTEXT_STORE: &str = "logical-context-store";

/// ABI version of the logical context store extension.
pub const LOGICAL_CONTEXT_STORE_ABI: u32 = 1;

/// Returns the tag map of the caller's current logical call context.
pub type ContextStoreFn = fn() -> ContextTags;

/// One published internal.
#[derive(Debug, Clone, Copy)]
pub struct Extension {
    pub name: &'static str,
    pub abi: u32,
    pub store: ContextStoreFn,
}

static EXTENSIONS: &[Extension] = &[Extension {
    name: LOGICAL_CONTEXT_STORE,
    abi: LOGICAL_CONTEXT_STORE_ABI,
    store: context::current,
}];

/// Look up an extension by name.
pub fn lookup(name: &str) -> Option<&'static Extension> {
    EXTENSIONS.iter().find(|ext| ext.name == name)
}
