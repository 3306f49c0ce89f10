//! Higher-order helpers over ordered records
//!
//! Everything here takes any iterator of `&RecordRef<R>`, so the same
//! functions serve a [`Collection`](crate::Collection), a slice of it, or a
//! `Changeset`'s records. Key functions receive the borrowed record;
//! [`attribute`] builds one that reads a single attribute.

use crate::core::{Attributes, Value};
use crate::record::{Record, RecordRef};
use std::collections::HashMap;
use std::rc::Rc;

/// Key function reading attribute `name`, NULL when absent.
pub fn attribute<R: Record>(name: &str) -> impl Fn(&R) -> Value + '_ {
    move |record: &R| record.get(name).cloned().unwrap_or(Value::Null)
}

/// `true` if `record` holds every attribute of `attrs` with an equal value.
pub fn matches<R: Record>(record: &R, attrs: &Attributes) -> bool {
    attrs
        .iter()
        .all(|(name, value)| record.get(name) == Some(value))
}

pub fn pluck<'a, R, I>(records: I, name: &str) -> Vec<Value>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a RecordRef<R>>,
{
    let key = attribute::<R>(name);
    records.into_iter().map(|r| key(&r.borrow())).collect()
}

pub fn where_attrs<'a, R, I>(records: I, attrs: &Attributes) -> Vec<RecordRef<R>>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a RecordRef<R>>,
{
    records
        .into_iter()
        .filter(|r| matches(&*r.borrow(), attrs))
        .cloned()
        .collect()
}

pub fn find_where<'a, R, I>(records: I, attrs: &Attributes) -> Option<RecordRef<R>>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a RecordRef<R>>,
{
    records
        .into_iter()
        .find(|r| matches(&*r.borrow(), attrs))
        .cloned()
}

/// Stable ascending sort by `key`, using [`Value::sort_cmp`]. Keys are
/// computed once per record.
pub fn sort_by<'a, R, I, F>(records: I, key: F) -> Vec<RecordRef<R>>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a RecordRef<R>>,
    F: Fn(&R) -> Value,
{
    let mut keyed: Vec<(Value, RecordRef<R>)> = records
        .into_iter()
        .map(|r| (key(&r.borrow()), Rc::clone(r)))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.sort_cmp(b));
    keyed.into_iter().map(|(_, r)| r).collect()
}

/// Groups records by key, keeping collection order inside each group.
pub fn group_by<'a, R, I, F>(records: I, key: F) -> HashMap<Value, Vec<RecordRef<R>>>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a RecordRef<R>>,
    F: Fn(&R) -> Value,
{
    let mut groups: HashMap<Value, Vec<RecordRef<R>>> = HashMap::new();
    for r in records {
        let k = key(&r.borrow());
        groups.entry(k).or_default().push(Rc::clone(r));
    }
    groups
}

pub fn count_by<'a, R, I, F>(records: I, key: F) -> HashMap<Value, usize>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a RecordRef<R>>,
    F: Fn(&R) -> Value,
{
    let mut counts = HashMap::new();
    for r in records {
        *counts.entry(key(&r.borrow())).or_insert(0) += 1;
    }
    counts
}

/// Maps each key to the last record producing it.
pub fn index_by<'a, R, I, F>(records: I, key: F) -> HashMap<Value, RecordRef<R>>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a RecordRef<R>>,
    F: Fn(&R) -> Value,
{
    records
        .into_iter()
        .map(|r| (key(&r.borrow()), Rc::clone(r)))
        .collect()
}

/// Splits records into those matching `predicate` and the rest.
pub fn partition<'a, R, I, F>(records: I, predicate: F) -> (Vec<RecordRef<R>>, Vec<RecordRef<R>>)
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a RecordRef<R>>,
    F: Fn(&R) -> bool,
{
    records
        .into_iter()
        .map(Rc::clone)
        .partition(|r| predicate(&r.borrow()))
}
