use crate::core::{TempId, Value};
use crate::record::RecordRef;
use std::collections::HashMap;
use std::rc::Rc;

/// Identity lookup for a collection's records.
///
/// Natural ids and temporary ids live in separate maps so the two key spaces
/// can never collide. `indexed_ids` remembers which natural id each record was
/// filed under, so a record whose id changed can still be unfiled correctly.
pub(crate) struct RecordIndex<R> {
    by_id: HashMap<Value, RecordRef<R>>,
    by_temp_id: HashMap<TempId, RecordRef<R>>,
    indexed_ids: HashMap<TempId, Value>,
}

/// Natural id already filed under another record.
#[derive(Debug)]
pub(crate) struct IdConflict(pub Value);

impl<R> RecordIndex<R> {
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            by_temp_id: HashMap::new(),
            indexed_ids: HashMap::new(),
        }
    }

    pub fn by_id(&self, id: &Value) -> Option<&RecordRef<R>> {
        self.by_id.get(id)
    }

    pub fn by_temp_id(&self, temp_id: &TempId) -> Option<&RecordRef<R>> {
        self.by_temp_id.get(temp_id)
    }

    pub fn indexed_id(&self, temp_id: &TempId) -> Option<&Value> {
        self.indexed_ids.get(temp_id)
    }

    /// Number of records filed (one temporary id each).
    pub fn len(&self) -> usize {
        self.by_temp_id.len()
    }

    pub fn id_count(&self) -> usize {
        self.by_id.len()
    }

    /// Files `record` under its temporary id and, when present, its natural id.
    ///
    /// The record is always reachable by temporary id afterwards; an
    /// `IdConflict` means the natural id was left pointing at its current
    /// holder.
    pub fn insert(
        &mut self,
        record: &RecordRef<R>,
        temp_id: TempId,
        natural_id: Option<Value>,
    ) -> Result<(), IdConflict> {
        self.by_temp_id.insert(temp_id, Rc::clone(record));
        match natural_id {
            Some(id) => self.file_id(record, temp_id, id),
            None => Ok(()),
        }
    }

    /// Moves the natural-id entry of a filed record to `natural_id`.
    pub fn sync_id(
        &mut self,
        record: &RecordRef<R>,
        temp_id: TempId,
        natural_id: Option<Value>,
    ) -> Result<(), IdConflict> {
        if self.indexed_ids.get(&temp_id) == natural_id.as_ref() {
            return Ok(());
        }
        self.unfile_id(&temp_id);
        match natural_id {
            Some(id) => self.file_id(record, temp_id, id),
            None => Ok(()),
        }
    }

    /// Removes every entry of the record filed under `temp_id`.
    pub fn remove(&mut self, temp_id: &TempId) -> Option<RecordRef<R>> {
        self.unfile_id(temp_id);
        self.by_temp_id.remove(temp_id)
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_temp_id.clear();
        self.indexed_ids.clear();
    }

    fn file_id(&mut self, record: &RecordRef<R>, temp_id: TempId, id: Value) -> Result<(), IdConflict> {
        if let Some(holder) = self.by_id.get(&id)
            && !Rc::ptr_eq(holder, record)
        {
            return Err(IdConflict(id));
        }
        self.by_id.insert(id.clone(), Rc::clone(record));
        self.indexed_ids.insert(temp_id, id);
        Ok(())
    }

    fn unfile_id(&mut self, temp_id: &TempId) {
        if let Some(old) = self.indexed_ids.remove(temp_id) {
            self.by_id.remove(&old);
        }
    }
}
