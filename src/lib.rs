// ============================================================================
// OnyxDB Library
// ============================================================================

//! In-memory, ordered, uniquely indexed record collections.
//!
//! A [`Collection`] holds records in order, indexes them by natural id and by
//! temporary id, and keeps them sorted when given a [`Comparator`]. Its core
//! operation is reconciliation: [`Collection::set`] takes a new list of
//! records or attribute bags and merges duplicates, inserts new entries and
//! drops records missing from the list.
//!
//! # Examples
//!
//! ```
//! use onyxdb::{attrs, Collection, CollectionOptions, Comparator, Record, SetOptions, Value};
//!
//! let mut todos = Collection::with_options(
//!     CollectionOptions::default().comparator(Comparator::attribute("rank")),
//! );
//!
//! todos.set([
//!     attrs! { "id" => 1, "title" => "write", "rank" => 2 },
//!     attrs! { "id" => 2, "title" => "test", "rank" => 1 },
//! ], SetOptions::default());
//! assert_eq!(todos.pluck("id"), vec![Value::from(2), Value::from(1)]);
//!
//! // merge, re-sort and drop what is missing in one pass
//! todos.set([attrs! { "id" => 1, "rank" => 0 }], SetOptions::default());
//! assert_eq!(todos.len(), 1);
//! assert_eq!(todos.get(1).unwrap().borrow().get("title"), Some(&Value::from("write")));
//! ```

pub mod collection;
pub mod core;
pub mod json;
pub mod query;
pub mod record;

// Re-export main types for convenience
pub use collection::{
    Changeset, Collection, CollectionConfig, CollectionOptions, Comparator, Input, Lookup, Outcome,
    Reconciled, ResetOutcome, SetOptions,
};
pub use self::core::{
    Attributes, CollectionError, CollectionId, DEFAULT_ID_ATTRIBUTE, Result, TempId, ValidationError,
    Value,
};
pub use record::{
    BuildContext, Changes, Model, ModelFactory, Record, RecordFactory, RecordRef, record_ref,
};
