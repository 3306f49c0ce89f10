use super::{Changeset, Collection, Input, Lookup, Outcome, ResetOutcome, SetOptions};
use crate::core::{TempId, ValidationError};
use crate::record::{BuildContext, Changes, Record, RecordRef, record_ref};
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{Level, event};

/// How one reconciliation input matched the collection.
enum Resolved<R> {
    /// A member record, plus the input to merge from.
    Existing(RecordRef<R>, Input<R>),
    /// A record to insert.
    New(RecordRef<R>),
}

impl<R: Record> Collection<R> {
    /// Reconciles the collection against `inputs`.
    ///
    /// Each input is matched against existing records (natural id first,
    /// then identity). Matches are kept and, with `merge`, updated in place;
    /// unmatched inputs are built and inserted when `add` is on; with
    /// `remove`, records no input matched are dropped. New records go at
    /// `at` when given, otherwise the collection takes the input order (or
    /// appends, without `remove`) and is re-sorted if it has a comparator.
    pub fn set<I>(&mut self, inputs: I, options: SetOptions) -> Changeset<R>
    where
        I: IntoIterator,
        I::Item: Into<Input<R>>,
    {
        let SetOptions {
            add,
            remove,
            merge,
            at,
            sort,
        } = options;

        let at = at.map(|at| self.resolve_at(at));
        let sortable = self.comparator.is_some() && at.is_none() && sort;
        let sort_attr = self
            .comparator
            .as_ref()
            .and_then(|c| c.sort_attribute())
            .map(str::to_owned);

        let mut outcomes = Vec::new();
        let mut to_add: Vec<RecordRef<R>> = Vec::new();
        let mut kept: HashSet<TempId> = HashSet::new();
        let mut seen: HashSet<TempId> = HashSet::new();
        let mut order: Option<Vec<RecordRef<R>>> = (add && remove && at.is_none()).then(Vec::new);
        let mut order_changed = false;
        let mut needs_sort = false;

        for input in inputs {
            let input: Input<R> = input.into();

            let resolved = match self.resolve_input(&input).cloned() {
                Some(existing) => Resolved::Existing(existing, input),
                None if add => match self.prepare(input) {
                    // the factory may produce an id another member already holds
                    Ok(record) => match self.holder_of(&record) {
                        Some(holder) => Resolved::Existing(holder, Input::Record(record)),
                        None => Resolved::New(record),
                    },
                    Err(err) => {
                        event!(Level::WARN, collection = %self.id, error = %err, "skipping invalid record");
                        outcomes.push(Outcome::Skipped(err));
                        continue;
                    }
                },
                None => {
                    outcomes.push(Outcome::Ignored);
                    continue;
                }
            };

            let record = match resolved {
                Resolved::Existing(existing, input) => {
                    let temp_id = existing.borrow().temp_id();
                    if remove {
                        kept.insert(temp_id);
                    }

                    let mut changes = Changes::new();
                    if merge && !input.is_record(&existing) {
                        changes = self.merge_into(&existing, input);
                        let resort = match &sort_attr {
                            Some(attr) => changes.contains(attr),
                            None => !changes.is_empty(),
                        };
                        if sortable && resort {
                            needs_sort = true;
                        }
                    }
                    // the record may have gained or changed its id since it was filed
                    self.refile(&existing, temp_id);

                    outcomes.push(Outcome::Existing {
                        record: Rc::clone(&existing),
                        changes,
                    });
                    existing
                }
                Resolved::New(record) => {
                    self.claim(&record);
                    self.add_reference(&record);
                    to_add.push(Rc::clone(&record));
                    outcomes.push(Outcome::Added(Rc::clone(&record)));
                    record
                }
            };

            let temp_id = record.borrow().temp_id();
            if let Some(order) = order.as_mut()
                && seen.insert(temp_id)
            {
                let position = order.len();
                order_changed = order_changed
                    || self
                        .sequence
                        .get(position)
                        .is_none_or(|current| !Rc::ptr_eq(current, &record));
                order.push(record);
            }
        }

        let mut removed = Vec::new();
        if remove {
            let stale: Vec<RecordRef<R>> = self
                .sequence
                .iter()
                .filter(|r| !kept.contains(&r.borrow().temp_id()))
                .cloned()
                .collect();
            for record in stale {
                self.detach(&record);
                removed.push(record);
            }
        }

        if !to_add.is_empty() || order_changed {
            if sortable {
                needs_sort = true;
            }
            match (at, order) {
                (Some(at), _) => {
                    let at = at.min(self.sequence.len());
                    self.sequence.splice(at..at, to_add.iter().cloned());
                }
                (None, Some(order)) => self.sequence = order,
                (None, None) => self.sequence.extend(to_add.iter().cloned()),
            }
        }

        if needs_sort && let Some(comparator) = &self.comparator {
            comparator.sort(&mut self.sequence);
        }

        event!(
            Level::DEBUG,
            collection = %self.id,
            inputs = outcomes.len(),
            added = to_add.len(),
            removed = removed.len(),
            sorted = needs_sort,
            len = self.sequence.len(),
            "set reconciled"
        );

        Changeset {
            outcomes,
            removed,
            sorted: needs_sort,
        }
    }

    /// `set` for a single input.
    pub fn set_one(&mut self, input: impl Into<Input<R>>, options: SetOptions) -> Outcome<R> {
        let input: Input<R> = input.into();
        self.set([input], options).into_single()
    }

    /// Purely additive `set`: never removes, never merges attributes into
    /// records already present. Only `at` and `sort` are taken from `options`.
    pub fn add<I>(&mut self, inputs: I, options: SetOptions) -> Changeset<R>
    where
        I: IntoIterator,
        I::Item: Into<Input<R>>,
    {
        let options = SetOptions {
            at: options.at,
            sort: options.sort,
            ..SetOptions::add_only()
        };
        self.set(inputs, options)
    }

    pub fn add_one(&mut self, input: impl Into<Input<R>>, options: SetOptions) -> Outcome<R> {
        let input: Input<R> = input.into();
        self.add([input], options).into_single()
    }

    /// Removes each target that resolves to a member record; unknown targets
    /// are ignored. Returns the removed records in target order.
    pub fn remove<I>(&mut self, targets: I) -> Vec<RecordRef<R>>
    where
        I: IntoIterator,
        I::Item: Into<Lookup<R>>,
    {
        let mut removed = Vec::new();
        for target in targets {
            if let Some(record) = self.resolve(&target.into()).cloned() {
                self.detach(&record);
                removed.push(record);
            }
        }
        removed
    }

    pub fn remove_one(&mut self, target: impl Into<Lookup<R>>) -> Option<RecordRef<R>> {
        let target: Lookup<R> = target.into();
        self.remove([target]).pop()
    }

    /// Replaces the whole contents with `inputs`, returning the new records
    /// and the ones replaced.
    pub fn reset<I>(&mut self, inputs: I) -> ResetOutcome<R>
    where
        I: IntoIterator,
        I::Item: Into<Input<R>>,
    {
        for record in &self.sequence {
            self.remove_reference(record);
        }
        let previous = std::mem::take(&mut self.sequence);
        self.index.clear();

        let changeset = self.add(inputs, SetOptions::default());
        event!(
            Level::DEBUG,
            collection = %self.id,
            previous = previous.len(),
            len = self.sequence.len(),
            "collection reset"
        );
        ResetOutcome {
            changeset,
            previous,
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Explicit insert position against the current length; negative
    /// positions count from the end.
    fn resolve_at(&self, at: isize) -> usize {
        let len = self.sequence.len();
        if at < 0 {
            len.saturating_sub(at.unsigned_abs())
        } else {
            at as usize
        }
    }

    fn merge_into(&self, existing: &RecordRef<R>, input: Input<R>) -> Changes {
        let attrs = match input {
            Input::Attributes(attrs) => attrs,
            Input::Record(other) => other.borrow().attributes().clone(),
        };
        existing.borrow_mut().apply(&attrs)
    }

    /// Turns an input into a record, building one through the factory for
    /// plain attributes.
    fn prepare(&self, input: Input<R>) -> Result<RecordRef<R>, ValidationError> {
        match input {
            Input::Record(record) => Ok(record),
            Input::Attributes(attrs) => {
                let ctx = BuildContext {
                    collection: self.id,
                    id_attribute: &self.id_attribute,
                };
                Ok(record_ref(self.factory.build(attrs, &ctx)?))
            }
        }
    }

    /// Member record already filed under `record`'s natural id.
    fn holder_of(&self, record: &RecordRef<R>) -> Option<RecordRef<R>> {
        let natural_id = record.borrow().natural_id(&self.id_attribute)?;
        self.index
            .by_id(&natural_id)
            .filter(|holder| !Rc::ptr_eq(holder, record))
            .cloned()
    }

    /// Takes ownership of `record` unless another collection holds it.
    fn claim(&self, record: &RecordRef<R>) {
        let unowned = record.borrow().owner().is_none();
        if unowned {
            record.borrow_mut().set_owner(Some(self.id));
        }
    }

    fn add_reference(&mut self, record: &RecordRef<R>) {
        let (temp_id, natural_id) = {
            let r = record.borrow();
            (r.temp_id(), r.natural_id(&self.id_attribute))
        };
        if let Err(conflict) = self.index.insert(record, temp_id, natural_id) {
            event!(
                Level::WARN,
                collection = %self.id,
                id = %conflict.0,
                "id already taken; record indexed by temporary id only"
            );
        }
    }

    fn refile(&mut self, record: &RecordRef<R>, temp_id: TempId) {
        let natural_id = record.borrow().natural_id(&self.id_attribute);
        if let Err(conflict) = self.index.sync_id(record, temp_id, natural_id) {
            event!(
                Level::WARN,
                collection = %self.id,
                id = %conflict.0,
                "id already taken; record indexed by temporary id only"
            );
        }
    }

    /// Unfiles a member record, takes it out of the sequence and drops this
    /// collection's claim on it.
    fn detach(&mut self, record: &RecordRef<R>) {
        let temp_id = record.borrow().temp_id();
        self.index.remove(&temp_id);
        if let Some(position) = self.index_of(record) {
            self.sequence.remove(position);
        }
        self.remove_reference(record);
        event!(Level::TRACE, collection = %self.id, record = %temp_id, "record removed");
    }

    fn remove_reference(&self, record: &RecordRef<R>) {
        let owned = record.borrow().owner() == Some(self.id);
        if owned {
            record.borrow_mut().set_owner(None);
        }
    }
}
