//! Request-scoped ambient values
//!
//! A `RequestContext` is created by the caller for one logical operation and
//! passed explicitly into every save of that operation. It replaces
//! process-wide mutable state: two requests holding different contexts can
//! never see each other's values.
//!
//! # Examples
//!
//! ```rust
//! use contentspace_core::services::RequestContext;
//!
//! let mut ctx = RequestContext::new();
//! {
//!     let scoped = ctx.scoped("LanguageKey", "12");
//!     assert_eq!(scoped.get("LanguageKey"), Some("12"));
//! }
//! assert_eq!(ctx.get("LanguageKey"), None);
//! ```

use std::collections::HashMap;
use std::ops::Deref;

/// String-keyed values scoped to one caller-defined operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    values: HashMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context pre-populated with one value (builder style)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Set `key` for as long as the returned guard lives.
    ///
    /// The guard dereferences to the context so it can be handed to saves
    /// directly; dropping it removes the key again.
    pub fn scoped(&mut self, key: impl Into<String>, value: impl Into<String>) -> ScopedValue<'_> {
        let key = key.into();
        self.set(key.clone(), value);
        ScopedValue { ctx: self, key }
    }
}

/// Guard returned by [`RequestContext::scoped`]
#[derive(Debug)]
pub struct ScopedValue<'a> {
    ctx: &'a mut RequestContext,
    key: String,
}

impl Deref for ScopedValue<'_> {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        &*self.ctx
    }
}

impl Drop for ScopedValue<'_> {
    fn drop(&mut self) {
        self.ctx.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut ctx = RequestContext::new();
        assert!(!ctx.contains("k"));

        ctx.set("k", "v");
        assert_eq!(ctx.get("k"), Some("v"));
        assert_eq!(ctx.remove("k"), Some("v".to_string()));
        assert_eq!(ctx.get("k"), None);
    }

    #[test]
    fn test_scoped_value_removed_on_drop() {
        let mut ctx = RequestContext::new().with("other", "kept");
        {
            let scoped = ctx.scoped("k", "v");
            assert_eq!(scoped.get("k"), Some("v"));
        }
        assert!(!ctx.contains("k"));
        assert_eq!(ctx.get("other"), Some("kept"));
    }

    #[test]
    fn test_contexts_are_independent() {
        let first = RequestContext::new().with("k", "1");
        let second = RequestContext::new();
        assert_eq!(first.get("k"), Some("1"));
        assert_eq!(second.get("k"), None);
    }

    #[test]
    fn test_clear() {
        let mut ctx = RequestContext::new().with("a", "1").with("b", "2");
        ctx.clear();
        assert_eq!(ctx, RequestContext::new());
    }
}
