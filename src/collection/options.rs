use super::Comparator;
use crate::core::{DEFAULT_ID_ATTRIBUTE, Result};
use crate::record::{Model, ModelFactory, Record, RecordFactory};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Flags controlling one reconciliation pass.
///
/// `add`, `remove` and `merge` default to `true`, `sort` defaults to `true`
/// and `at` to none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOptions {
    /// Insert inputs that match no existing record.
    pub add: bool,
    /// Drop existing records that no input matched.
    pub remove: bool,
    /// Apply attributes of matched inputs onto the existing record.
    pub merge: bool,
    /// Explicit insertion position for new records; negative counts from the
    /// end. Setting it disables comparator sorting for this pass.
    pub at: Option<isize>,
    pub sort: bool,
}

impl Default for SetOptions {
    fn default() -> Self {
        Self {
            add: true,
            remove: true,
            merge: true,
            at: None,
            sort: true,
        }
    }
}

impl SetOptions {
    /// Purely additive flags: nothing removed, nothing merged.
    pub fn add_only() -> Self {
        Self::default().remove(false).merge(false)
    }

    pub fn add(mut self, add: bool) -> Self {
        self.add = add;
        self
    }

    pub fn remove(mut self, remove: bool) -> Self {
        self.remove = remove;
        self
    }

    pub fn merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    pub fn at(mut self, at: isize) -> Self {
        self.at = Some(at);
        self
    }

    pub fn sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }
}

/// Construction-time configuration of a collection.
pub struct CollectionOptions<R> {
    pub(crate) comparator: Option<Comparator<R>>,
    pub(crate) id_attribute: String,
    pub(crate) factory: Rc<dyn RecordFactory<R>>,
}

impl<R: Record> CollectionOptions<R> {
    /// Options building records through `factory`, with no comparator and the
    /// default id attribute.
    pub fn new(factory: impl RecordFactory<R> + 'static) -> Self {
        Self {
            comparator: None,
            id_attribute: DEFAULT_ID_ATTRIBUTE.to_string(),
            factory: Rc::new(factory),
        }
    }

    pub fn comparator(mut self, comparator: Comparator<R>) -> Self {
        self.comparator = Some(comparator);
        self
    }

    pub fn id_attribute(mut self, name: impl Into<String>) -> Self {
        self.id_attribute = name.into();
        self
    }

    pub fn factory(mut self, factory: impl RecordFactory<R> + 'static) -> Self {
        self.factory = Rc::new(factory);
        self
    }

    /// Overlays a declarative config onto these options.
    pub fn with_config(mut self, config: &CollectionConfig) -> Self {
        self.id_attribute = config.id_attribute.clone();
        if let Some(attr) = &config.comparator {
            self.comparator = Some(Comparator::attribute(attr.clone()));
        }
        self
    }
}

impl Default for CollectionOptions<Model> {
    fn default() -> Self {
        Self::new(ModelFactory::default())
    }
}

impl<R> Clone for CollectionOptions<R> {
    fn clone(&self) -> Self {
        Self {
            comparator: self.comparator.clone(),
            id_attribute: self.id_attribute.clone(),
            factory: Rc::clone(&self.factory),
        }
    }
}

impl<R> fmt::Debug for CollectionOptions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionOptions")
            .field("comparator", &self.comparator)
            .field("id_attribute", &self.id_attribute)
            .finish_non_exhaustive()
    }
}

/// Declarative subset of [`CollectionOptions`], loadable from JSON.
///
/// ```
/// use onyxdb::CollectionConfig;
///
/// let config = CollectionConfig::from_json_str(r#"{"id_attribute": "_id", "comparator": "rank"}"#)?;
/// assert_eq!(config.id_attribute, "_id");
/// # Ok::<(), onyxdb::CollectionError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(default = "default_id_attribute")]
    pub id_attribute: String,
    /// Attribute to keep the collection sorted by.
    #[serde(default)]
    pub comparator: Option<String>,
}

fn default_id_attribute() -> String {
    DEFAULT_ID_ATTRIBUTE.to_string()
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            id_attribute: default_id_attribute(),
            comparator: None,
        }
    }
}

impl CollectionConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Options for a [`Model`] collection built from this config.
    pub fn options(&self) -> CollectionOptions<Model> {
        CollectionOptions::default().with_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_options_defaults() {
        let options = SetOptions::default();
        assert!(options.add && options.remove && options.merge && options.sort);
        assert_eq!(options.at, None);

        let add = SetOptions::add_only().at(2);
        assert!(add.add);
        assert!(!add.remove);
        assert!(!add.merge);
        assert_eq!(add.at, Some(2));
    }

    #[test]
    fn test_config_defaults_when_fields_missing() {
        let config = CollectionConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CollectionConfig::default());
        assert_eq!(config.id_attribute, "id");
    }

    #[test]
    fn test_config_into_options() {
        let config = CollectionConfig {
            id_attribute: "key".into(),
            comparator: Some("rank".into()),
        };
        let options = config.options();
        assert_eq!(options.id_attribute, "key");
        assert_eq!(
            options.comparator.as_ref().and_then(|c| c.sort_attribute()),
            Some("rank")
        );
    }

    #[test]
    fn test_options_builder() {
        let factory = ModelFactory::new().defaults(crate::attrs! { "kind" => "note" });
        let options = CollectionOptions::default().id_attribute("key").factory(factory);
        assert_eq!(options.id_attribute, "key");
        assert!(options.comparator.is_none());

        let ctx = crate::record::BuildContext {
            collection: crate::core::CollectionId::next(),
            id_attribute: "key",
        };
        let model = options.factory.build(crate::attrs! { "key" => 1 }, &ctx).unwrap();
        assert_eq!(model.get("kind"), Some(&crate::core::Value::from("note")));
    }

    #[test]
    fn test_config_rejects_malformed_json() {
        assert!(CollectionConfig::from_json_str("{\"id_attribute\": 3}").is_err());
    }
}
