//! Logical call context tag store.
//!
//! Tags written here attach to every record emitted later on the same
//! logical call path. The store lives in a Tokio task-local, so it follows
//! a request across `.await` points and onto whichever worker thread polls
//! it next. Plain threads outside any logical scope fall back to a
//! per-thread store. Tokio tasks outside any scope share no store at all:
//! their tags are discarded, so spawn them with [`spawn`] or wrap them in
//! [`scope`].
//!
//! A new scope starts with a copy of the caller's tags; writes inside it
//! never reach the parent or sibling scopes.
//!
//! ```
//! use logbridge::backend::context;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! context::scope(async {
//!     context::set("request_id", "abc");
//!     tokio::task::yield_now().await;
//!     assert_eq!(context::get("request_id").unwrap().to_string(), "abc");
//! })
//! .await;
//! assert!(context::get("request_id").is_none());
//! # });
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tokio::task::futures::TaskLocalFuture;
use tokio::task::JoinHandle;

tokio::task_local! {
    static TASK_TAGS: ContextTags;
}

static WARNED_UNSCOPED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static THREAD_TAGS: ContextTags = ContextTags::default();
}

/// A tag value.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Str(v) => f.write_str(v),
            ContextValue::Int(v) => write!(f, "{v}"),
            ContextValue::UInt(v) => write!(f, "{v}"),
            ContextValue::Float(v) => write!(f, "{v}"),
            ContextValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(v: &str) -> Self {
        ContextValue::Str(v.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(v: String) -> Self {
        ContextValue::Str(v)
    }
}

impl From<i64> for ContextValue {
    fn from(v: i64) -> Self {
        ContextValue::Int(v)
    }
}

impl From<i32> for ContextValue {
    fn from(v: i32) -> Self {
        ContextValue::Int(v.into())
    }
}

impl From<u64> for ContextValue {
    fn from(v: u64) -> Self {
        ContextValue::UInt(v)
    }
}

impl From<u32> for ContextValue {
    fn from(v: u32) -> Self {
        ContextValue::UInt(v.into())
    }
}

impl From<f64> for ContextValue {
    fn from(v: f64) -> Self {
        ContextValue::Float(v)
    }
}

impl From<bool> for ContextValue {
    fn from(v: bool) -> Self {
        ContextValue::Bool(v)
    }
}

/// Shared, mutable key/value map of one logical call context.
///
/// Cloning is cheap and yields a handle to the same map.
#[derive(Debug, Clone, Default)]
pub struct ContextTags {
    inner: Arc<RwLock<BTreeMap<String, ContextValue>>>,
}

impl ContextTags {
    /// Set `key` to `value`, returning the previous value.
    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> Option<ContextValue> {
        self.inner.write().insert(key.into(), value.into())
    }

    /// Value of `key`, if set.
    pub fn get(&self, key: &str) -> Option<ContextValue> {
        self.inner.read().get(key).cloned()
    }

    /// Remove `key`, returning its value.
    pub fn remove(&self, key: &str) -> Option<ContextValue> {
        self.inner.write().remove(key)
    }

    /// Whether `key` is set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.read().contains_key(key)
    }

    /// Remove every tag.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether no tag is set.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Copy of the current tags.
    pub fn snapshot(&self) -> BTreeMap<String, ContextValue> {
        self.inner.read().clone()
    }

    /// Whether both handles refer to the same map.
    pub fn same_map(&self, other: &ContextTags) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Independent map holding a copy of these tags.
    pub fn fork(&self) -> ContextTags {
        ContextTags {
            inner: Arc::new(RwLock::new(self.snapshot())),
        }
    }

    /// `key=value` rendering, sorted by key, borrowed for the lifetime of
    /// the returned value.
    pub(crate) fn display(&self) -> TagsDisplay<'_> {
        TagsDisplay(self.inner.read())
    }
}

/// Renders tags as space separated `key=value` pairs.
pub(crate) struct TagsDisplay<'a>(RwLockReadGuard<'a, BTreeMap<String, ContextValue>>);

impl fmt::Display for TagsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// Tags of the caller's current logical call context.
///
/// This is the function the backend publishes through its extension table;
/// see [`crate::backend::extension`].
///
/// Outside any scope, plain threads use their per-thread map; code on a
/// Tokio runtime gets a fresh, detached map on every call.
pub(crate) fn current() -> ContextTags {
    if let Ok(tags) = TASK_TAGS.try_with(ContextTags::clone) {
        return tags;
    }
    if tokio::runtime::Handle::try_current().is_ok() {
        return detached();
    }
    THREAD_TAGS.with(ContextTags::clone)
}

fn detached() -> ContextTags {
    if !WARNED_UNSCOPED.swap(true, Ordering::Relaxed) {
        tracing::warn!(
            "Logging context used by a Tokio task outside context::scope, tags are discarded; \
             spawn with context::spawn or wrap the future in context::scope"
        );
    }
    ContextTags::default()
}

/// Run `future` in a new logical context seeded with the caller's tags.
pub fn scope<F: Future>(future: F) -> TaskLocalFuture<ContextTags, F> {
    TASK_TAGS.scope(current().fork(), future)
}

/// Run `f` in a new logical context seeded with the caller's tags.
pub fn sync_scope<R>(f: impl FnOnce() -> R) -> R {
    TASK_TAGS.sync_scope(current().fork(), f)
}

/// Spawn `future` on the Tokio runtime in its own logical context.
///
/// The spawned task starts with a copy of the caller's tags.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(scope(future))
}

/// Set a tag on the current logical context.
pub fn set(key: impl Into<String>, value: impl Into<ContextValue>) -> Option<ContextValue> {
    current().set(key, value)
}

/// Read a tag from the current logical context.
pub fn get(key: &str) -> Option<ContextValue> {
    current().get(key)
}

/// Remove a tag from the current logical context.
pub fn remove(key: &str) -> Option<ContextValue> {
    current().remove(key)
}

/// Remove every tag from the current logical context.
pub fn clear() {
    current().clear();
}

/// Copy of the current logical context's tags.
pub fn snapshot() -> BTreeMap<String, ContextValue> {
    current().snapshot()
}
