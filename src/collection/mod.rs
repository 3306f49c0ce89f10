//! Ordered, uniquely indexed record collection
//!
//! A [`Collection`] keeps its records in a canonical order (`sequence`) and
//! indexes them by natural id and by temporary id. Every mutation goes
//! through reconciliation (`set`); `add`, `remove` and `reset` are
//! constrained forms of it.
//!
//! # Architecture
//!
//! - `options.rs` - `SetOptions`, `CollectionOptions`, `CollectionConfig`
//! - `comparator.rs` - sort order
//! - `index.rs` - the two identity maps
//! - `input.rs` - reconciliation inputs and lookup keys
//! - `outcome.rs` - per-input outcomes returned to the caller
//! - `reconcile.rs` - `set`, `add`, `remove`, `reset`
//!
//! Collections are single-threaded. Callers must not re-enter a mutating
//! operation on the same collection from inside a record's `apply`; the
//! record is mutably borrowed at that point.

mod comparator;
mod index;
mod input;
mod options;
mod outcome;
mod reconcile;

pub use comparator::Comparator;
pub use input::{Input, Lookup};
pub use options::{CollectionConfig, CollectionOptions, SetOptions};
pub use outcome::{Changeset, Outcome, Reconciled, ResetOutcome};

use crate::core::{Attributes, CollectionError, CollectionId, Result, Value};
use crate::json::JsonInputs;
use crate::query;
use crate::record::{Model, Record, RecordFactory, RecordRef};
use index::RecordIndex;
use std::fmt;
use std::rc::Rc;

pub struct Collection<R: Record = Model> {
    id: CollectionId,
    sequence: Vec<RecordRef<R>>,
    index: RecordIndex<R>,
    comparator: Option<Comparator<R>>,
    id_attribute: String,
    factory: Rc<dyn RecordFactory<R>>,
}

impl Collection<Model> {
    /// Empty collection of [`Model`]s with default options.
    pub fn new() -> Self {
        Self::with_options(CollectionOptions::default())
    }
}

impl Default for Collection<Model> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Collection<R> {
    pub fn with_options(options: CollectionOptions<R>) -> Self {
        Self {
            id: CollectionId::next(),
            sequence: Vec::new(),
            index: RecordIndex::new(),
            comparator: options.comparator,
            id_attribute: options.id_attribute,
            factory: options.factory,
        }
    }

    /// Collection seeded with `inputs`, reconciled silently as by `reset`.
    pub fn from_inputs<I>(inputs: I, options: CollectionOptions<R>) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Input<R>>,
    {
        let mut collection = Self::with_options(options);
        collection.reset(inputs);
        collection
    }

    pub fn id(&self) -> CollectionId {
        self.id
    }

    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    pub fn comparator(&self) -> Option<&Comparator<R>> {
        self.comparator.as_ref()
    }

    /// Replaces the comparator and re-sorts under the new one. `None` keeps
    /// the current order.
    pub fn set_comparator(&mut self, comparator: Option<Comparator<R>>) {
        self.comparator = comparator;
        if let Some(comparator) = &self.comparator {
            comparator.sort(&mut self.sequence);
        }
    }

    pub fn options(&self) -> CollectionOptions<R> {
        CollectionOptions {
            comparator: self.comparator.clone(),
            id_attribute: self.id_attribute.clone(),
            factory: Rc::clone(&self.factory),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecordRef<R>> {
        self.sequence.iter()
    }

    /// The records in collection order.
    pub fn records(&self) -> &[RecordRef<R>] {
        &self.sequence
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Finds a member record by record, natural id, temporary id, or an
    /// attribute bag carrying the id attribute. Never fails; unknown keys
    /// give `None`.
    pub fn get(&self, target: impl Into<Lookup<R>>) -> Option<RecordRef<R>> {
        self.resolve(&target.into()).cloned()
    }

    pub fn contains(&self, target: impl Into<Lookup<R>>) -> bool {
        self.resolve(&target.into()).is_some()
    }

    fn resolve(&self, target: &Lookup<R>) -> Option<&RecordRef<R>> {
        match target {
            Lookup::Id(id) => self.index.by_id(id),
            Lookup::TempId(temp_id) => self.index.by_temp_id(temp_id),
            Lookup::Attributes(attrs) => self.resolve_attributes(attrs),
            Lookup::Record(record) => self.resolve_record(record),
        }
    }

    fn resolve_input(&self, input: &Input<R>) -> Option<&RecordRef<R>> {
        match input {
            Input::Attributes(attrs) => self.resolve_attributes(attrs),
            Input::Record(record) => self.resolve_record(record),
        }
    }

    fn resolve_attributes(&self, attrs: &Attributes) -> Option<&RecordRef<R>> {
        attrs
            .get(&self.id_attribute)
            .filter(|id| !id.is_null())
            .and_then(|id| self.index.by_id(id))
    }

    fn resolve_record(&self, record: &RecordRef<R>) -> Option<&RecordRef<R>> {
        let (natural_id, temp_id) = {
            let r = record.borrow();
            (r.natural_id(&self.id_attribute), r.temp_id())
        };
        natural_id
            .and_then(|id| self.index.by_id(&id))
            .or_else(|| self.index.by_temp_id(&temp_id))
    }

    // ========================================================================
    // Positional access
    // ========================================================================

    /// Record at `index`; negative indices count from the end.
    pub fn at(&self, index: isize) -> Option<RecordRef<R>> {
        let index = if index < 0 {
            index + self.sequence.len() as isize
        } else {
            index
        };
        usize::try_from(index).ok().and_then(|i| self.sequence.get(i)).cloned()
    }

    pub fn first(&self) -> Option<RecordRef<R>> {
        self.sequence.first().cloned()
    }

    pub fn last(&self) -> Option<RecordRef<R>> {
        self.sequence.last().cloned()
    }

    /// Position of `record` in collection order, by identity.
    pub fn index_of(&self, record: &RecordRef<R>) -> Option<usize> {
        self.sequence.iter().position(|r| Rc::ptr_eq(r, record))
    }

    /// Records in `start..end` with slice semantics: negative bounds count
    /// from the end, out-of-range bounds clamp, `end` defaults to the length.
    pub fn slice(&self, start: isize, end: Option<isize>) -> Vec<RecordRef<R>> {
        let len = self.sequence.len();
        let start = clamp_bound(start, len);
        let end = end.map_or(len, |end| clamp_bound(end, len));
        if start >= end {
            return Vec::new();
        }
        self.sequence[start..end].to_vec()
    }

    /// Adds `input` at the end of the collection, as `add_one` with `at`
    /// set to the current length.
    pub fn push(&mut self, input: impl Into<Input<R>>, options: SetOptions) -> Outcome<R> {
        let at = self.sequence.len() as isize;
        self.add_one(input, options.at(at))
    }

    /// Removes and returns the last record.
    pub fn pop(&mut self) -> Option<RecordRef<R>> {
        let record = self.at(-1)?;
        self.remove_one(&record)
    }

    /// Adds `input` at the start of the collection.
    pub fn unshift(&mut self, input: impl Into<Input<R>>, options: SetOptions) -> Outcome<R> {
        self.add_one(input, options.at(0))
    }

    /// Removes and returns the first record.
    pub fn shift(&mut self) -> Option<RecordRef<R>> {
        let record = self.at(0)?;
        self.remove_one(&record)
    }

    // ========================================================================
    // Sorting
    // ========================================================================

    /// Re-sorts the collection with its comparator.
    pub fn sort(&mut self) -> Result<()> {
        let comparator = self
            .comparator
            .as_ref()
            .ok_or(CollectionError::MissingComparator)?;
        comparator.sort(&mut self.sequence);
        Ok(())
    }

    // ========================================================================
    // Queries and export
    // ========================================================================

    /// Records whose attributes equal every pair in `attrs`.
    pub fn where_attrs(&self, attrs: &Attributes) -> Vec<RecordRef<R>> {
        query::where_attrs(self.iter(), attrs)
    }

    pub fn find_where(&self, attrs: &Attributes) -> Option<RecordRef<R>> {
        query::find_where(self.iter(), attrs)
    }

    /// One attribute from every record; missing attributes give NULL.
    pub fn pluck(&self, name: &str) -> Vec<Value> {
        query::pluck(self.iter(), name)
    }

    /// Attribute bags of all records, in order, as a JSON array.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.sequence.iter().map(|r| r.borrow().to_json()).collect())
    }

    /// `set` from JSON text: one object or an array of objects. The result
    /// keeps the shape of the input.
    pub fn set_json(&mut self, text: &str, options: SetOptions) -> Result<Reconciled<R>> {
        Ok(match JsonInputs::parse(text)? {
            JsonInputs::One(attrs) => Reconciled::One(self.set_one(attrs, options)),
            JsonInputs::Many(list) => Reconciled::Many(self.set(list, options)),
        })
    }

    pub fn add_json(&mut self, text: &str, options: SetOptions) -> Result<Reconciled<R>> {
        Ok(match JsonInputs::parse(text)? {
            JsonInputs::One(attrs) => Reconciled::One(self.add_one(attrs, options)),
            JsonInputs::Many(list) => Reconciled::Many(self.add(list, options)),
        })
    }

    pub fn reset_json(&mut self, text: &str) -> Result<ResetOutcome<R>> {
        let inputs = JsonInputs::parse(text)?;
        Ok(self.reset(inputs.into_vec()))
    }

    /// New collection over the same records with the same comparator, id
    /// attribute and factory. Records keep their current owner.
    pub fn fork(&self) -> Self {
        Self::from_inputs(self.sequence.iter(), self.options())
    }

    /// Checks that order and both indexes agree.
    pub fn verify_integrity(&self) -> Result<()> {
        if self.index.len() != self.sequence.len() {
            return Err(CollectionError::Integrity(format!(
                "{} records in sequence but {} temporary ids indexed",
                self.sequence.len(),
                self.index.len()
            )));
        }

        let mut with_id = 0;
        for (position, record) in self.sequence.iter().enumerate() {
            let r = record.borrow();
            let temp_id = r.temp_id();
            match self.index.by_temp_id(&temp_id) {
                Some(filed) if Rc::ptr_eq(filed, record) => {}
                _ => {
                    return Err(CollectionError::Integrity(format!(
                        "record {} at position {} is not reachable by temporary id",
                        temp_id, position
                    )));
                }
            }
            let natural_id = r.natural_id(&self.id_attribute);
            if let Some(filed) = self.index.indexed_id(&temp_id)
                && natural_id.as_ref() != Some(filed)
            {
                return Err(CollectionError::Integrity(format!(
                    "record {} is filed under id {} but now carries {:?}",
                    temp_id, filed, natural_id
                )));
            }
            if let Some(id) = natural_id {
                with_id += 1;
                match self.index.by_id(&id) {
                    Some(filed) if Rc::ptr_eq(filed, record) => {}
                    _ => {
                        return Err(CollectionError::Integrity(format!(
                            "record {} is not reachable by its id {}",
                            temp_id, id
                        )));
                    }
                }
            }
        }

        if self.index.id_count() != with_id {
            return Err(CollectionError::Integrity(format!(
                "{} natural ids indexed for {} records carrying one",
                self.index.id_count(),
                with_id
            )));
        }
        Ok(())
    }
}

fn clamp_bound(bound: isize, len: usize) -> usize {
    if bound < 0 {
        len.saturating_sub(bound.unsigned_abs())
    } else {
        (bound as usize).min(len)
    }
}

impl<'a, R: Record> IntoIterator for &'a Collection<R> {
    type Item = &'a RecordRef<R>;
    type IntoIter = std::slice::Iter<'a, RecordRef<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sequence.iter()
    }
}

impl<R: Record> fmt::Debug for Collection<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("id", &self.id)
            .field("len", &self.sequence.len())
            .field("comparator", &self.comparator)
            .field("id_attribute", &self.id_attribute)
            .finish()
    }
}
