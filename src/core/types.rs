use super::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Attribute bag of a record: attribute name to value.
pub type Attributes = BTreeMap<String, Value>;

/// Default name of the attribute holding a record's natural id.
pub const DEFAULT_ID_ATTRIBUTE: &str = "id";

/// Temporary identity of a record, assigned at construction and never changed.
///
/// Records that have not yet been given a natural id are still reachable
/// through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TempId(Uuid);

impl TempId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TempId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0.simple())
    }
}

static NEXT_COLLECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Handle naming one collection instance; held by records as their owner
/// back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(u64);

impl CollectionId {
    pub(crate) fn next() -> Self {
        Self(NEXT_COLLECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collection#{}", self.0)
    }
}

/// Builds an [`Attributes`] map from `name => value` pairs.
///
/// ```
/// use onyxdb::{attrs, Value};
///
/// let a = attrs! { "id" => 1, "name" => "alice" };
/// assert_eq!(a.get("name"), Some(&Value::from("alice")));
/// ```
#[macro_export]
macro_rules! attrs {
    () => { $crate::Attributes::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut attributes = $crate::Attributes::new();
        $(
            attributes.insert(::std::string::String::from($name), $crate::Value::from($value));
        )+
        attributes
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_ids_are_unique() {
        let a = TempId::new();
        let b = TempId::new();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with('c'));
    }

    #[test]
    fn test_collection_ids_are_unique() {
        assert_ne!(CollectionId::next(), CollectionId::next());
    }

    #[test]
    fn test_attrs_macro() {
        let a = crate::attrs! { "id" => 3, "rank" => 1.5, "done" => false };
        assert_eq!(a.len(), 3);
        assert_eq!(a["id"], Value::Integer(3));
        assert_eq!(a["done"], Value::Boolean(false));
        assert!(crate::attrs!().is_empty());
    }
}
