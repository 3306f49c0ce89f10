use super::{BuildContext, Changes, Record, RecordFactory};
use crate::core::{Attributes, CollectionId, TempId, ValidationError, Value};
use std::fmt;
use std::rc::Rc;

/// General-purpose record: a bag of attributes with change tracking.
#[derive(Debug)]
pub struct Model {
    temp_id: TempId,
    attributes: Attributes,
    changed: Changes,
    owner: Option<CollectionId>,
}

impl Model {
    pub fn new(attributes: Attributes) -> Self {
        Self {
            temp_id: TempId::new(),
            attributes,
            changed: Changes::new(),
            owner: None,
        }
    }

    /// Sets one attribute, returning `true` if its value changed.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        let mut attrs = Attributes::new();
        attrs.insert(name.into(), value.into());
        !self.apply(&attrs).is_empty()
    }

    /// Attributes changed by the most recent apply.
    pub fn changed(&self) -> &Changes {
        &self.changed
    }

    pub fn has_changed(&self, name: &str) -> bool {
        self.changed.contains(name)
    }
}

impl Clone for Model {
    /// A clone is a distinct record: fresh temporary identity, no owner.
    fn clone(&self) -> Self {
        Self::new(self.attributes.clone())
    }
}

impl Record for Model {
    fn temp_id(&self) -> TempId {
        self.temp_id
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn apply(&mut self, attrs: &Attributes) -> Changes {
        let mut changes = Changes::new();
        for (name, value) in attrs {
            if self.attributes.get(name) != Some(value) {
                self.attributes.insert(name.clone(), value.clone());
                changes.insert(name.clone());
            }
        }
        self.changed = changes.clone();
        changes
    }

    fn owner(&self) -> Option<CollectionId> {
        self.owner
    }

    fn set_owner(&mut self, owner: Option<CollectionId>) {
        self.owner = owner;
    }
}

type Validator = Rc<dyn Fn(&Attributes) -> Result<(), ValidationError>>;

/// Default factory for [`Model`]: fills in defaults, then validates.
#[derive(Clone, Default)]
pub struct ModelFactory {
    defaults: Attributes,
    validator: Option<Validator>,
}

impl ModelFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes applied underneath every built model's own attributes.
    pub fn defaults(mut self, defaults: Attributes) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Attributes) -> Result<(), ValidationError> + 'static,
    {
        self.validator = Some(Rc::new(validator));
        self
    }
}

impl fmt::Debug for ModelFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelFactory")
            .field("defaults", &self.defaults)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl RecordFactory<Model> for ModelFactory {
    fn build(&self, attrs: Attributes, _ctx: &BuildContext<'_>) -> Result<Model, ValidationError> {
        let mut attributes = self.defaults.clone();
        attributes.extend(attrs);
        if let Some(validate) = &self.validator {
            validate(&attributes)?;
        }
        Ok(Model::new(attributes))
    }
}
