//! Record capability contract
//!
//! A collection never looks inside a record beyond what [`Record`] exposes:
//! its temporary identity, its attributes (and through them the natural id),
//! attribute merging with change reporting, and the owner back-reference.
//! New records are made through a [`RecordFactory`], which is where
//! validation happens.

mod model;

pub use model::{Model, ModelFactory};

use crate::core::{Attributes, CollectionId, TempId, ValidationError, Value};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Shared handle to a record. Collections and callers hold the same record
/// through clones of this handle; identity is pointer identity.
pub type RecordRef<R> = Rc<RefCell<R>>;

/// Wraps a record into a shareable handle.
pub fn record_ref<R>(record: R) -> RecordRef<R> {
    Rc::new(RefCell::new(record))
}

pub trait Record {
    /// Process-unique identity assigned at construction.
    fn temp_id(&self) -> TempId;

    fn attributes(&self) -> &Attributes;

    fn get(&self, name: &str) -> Option<&Value> {
        self.attributes().get(name)
    }

    /// Current natural id, or `None` while the id attribute is absent or null.
    fn natural_id(&self, id_attribute: &str) -> Option<Value> {
        self.get(id_attribute).filter(|v| !v.is_null()).cloned()
    }

    /// Merges `attrs` into the record and reports which attributes changed
    /// as a result of this call.
    fn apply(&mut self, attrs: &Attributes) -> Changes;

    fn owner(&self) -> Option<CollectionId>;

    /// Sets or clears the owner back-reference. Collections only ever pass
    /// their own id or `None`.
    fn set_owner(&mut self, owner: Option<CollectionId>);

    fn to_json(&self) -> serde_json::Value {
        crate::json::attributes_to_json(self.attributes())
    }
}

/// Names of the attributes changed by one [`Record::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes(BTreeSet<String>);

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.0.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for Changes {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// What a factory knows about the collection it is building for.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub collection: CollectionId,
    pub id_attribute: &'a str,
}

/// Coerces a plain attribute bag into a record.
///
/// A factory may refuse by returning a [`ValidationError`]; the collection
/// skips that input and carries on with the rest of the batch.
pub trait RecordFactory<R> {
    fn build(&self, attrs: Attributes, ctx: &BuildContext<'_>) -> Result<R, ValidationError>;
}

impl<R, F> RecordFactory<R> for F
where
    F: Fn(Attributes, &BuildContext<'_>) -> Result<R, ValidationError>,
{
    fn build(&self, attrs: Attributes, ctx: &BuildContext<'_>) -> Result<R, ValidationError> {
        self(attrs, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs;

    #[test]
    fn test_natural_id_ignores_null() {
        let model = Model::new(attrs! { "id" => Value::Null, "name" => "x" });
        assert_eq!(model.natural_id("id"), None);

        let model = Model::new(attrs! { "id" => 5 });
        assert_eq!(model.natural_id("id"), Some(Value::Integer(5)));
        assert_eq!(model.natural_id("_id"), None);
    }

    #[test]
    fn test_closure_factory() {
        fn factory(attrs: Attributes, _ctx: &BuildContext<'_>) -> Result<Model, ValidationError> {
            if attrs.contains_key("name") {
                Ok(Model::new(attrs))
            } else {
                Err(ValidationError::on("name", "required"))
            }
        }
        let ctx = BuildContext {
            collection: CollectionId::next(),
            id_attribute: "id",
        };
        assert!(factory.build(attrs! { "name" => "a" }, &ctx).is_ok());
        assert!(factory.build(attrs! { "id" => 1 }, &ctx).is_err());
    }

    #[test]
    fn test_changes_set() {
        let changes: Changes = ["b".to_string(), "a".to_string()].into_iter().collect();
        assert!(changes.contains("a"));
        assert!(!changes.contains("c"));
        assert_eq!(changes.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
