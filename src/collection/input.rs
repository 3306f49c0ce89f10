use crate::core::{Attributes, TempId, Value};
use crate::record::RecordRef;
use std::rc::Rc;

/// One input to reconciliation: an existing record or a plain attribute bag
/// to be turned into one.
pub enum Input<R> {
    Record(RecordRef<R>),
    Attributes(Attributes),
}

impl<R> Input<R> {
    /// `true` when this input is literally `record`.
    pub(crate) fn is_record(&self, record: &RecordRef<R>) -> bool {
        matches!(self, Self::Record(r) if Rc::ptr_eq(r, record))
    }
}

impl<R> Clone for Input<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Record(r) => Self::Record(Rc::clone(r)),
            Self::Attributes(a) => Self::Attributes(a.clone()),
        }
    }
}

impl<R> From<RecordRef<R>> for Input<R> {
    fn from(record: RecordRef<R>) -> Self {
        Self::Record(record)
    }
}

impl<R> From<&RecordRef<R>> for Input<R> {
    fn from(record: &RecordRef<R>) -> Self {
        Self::Record(Rc::clone(record))
    }
}

impl<R> From<Attributes> for Input<R> {
    fn from(attrs: Attributes) -> Self {
        Self::Attributes(attrs)
    }
}

/// Anything a record can be looked up by.
pub enum Lookup<R> {
    Record(RecordRef<R>),
    Id(Value),
    TempId(TempId),
    /// Attribute bag carrying the id attribute.
    Attributes(Attributes),
}

impl<R> From<RecordRef<R>> for Lookup<R> {
    fn from(record: RecordRef<R>) -> Self {
        Self::Record(record)
    }
}

impl<R> From<&RecordRef<R>> for Lookup<R> {
    fn from(record: &RecordRef<R>) -> Self {
        Self::Record(Rc::clone(record))
    }
}

impl<R> From<Value> for Lookup<R> {
    fn from(id: Value) -> Self {
        Self::Id(id)
    }
}

impl<R> From<i64> for Lookup<R> {
    fn from(id: i64) -> Self {
        Self::Id(Value::Integer(id))
    }
}

impl<R> From<i32> for Lookup<R> {
    fn from(id: i32) -> Self {
        Self::Id(Value::Integer(id as i64))
    }
}

impl<R> From<&str> for Lookup<R> {
    fn from(id: &str) -> Self {
        Self::Id(Value::from(id))
    }
}

impl<R> From<String> for Lookup<R> {
    fn from(id: String) -> Self {
        Self::Id(Value::Text(id))
    }
}

impl<R> From<TempId> for Lookup<R> {
    fn from(temp_id: TempId) -> Self {
        Self::TempId(temp_id)
    }
}

impl<R> From<Attributes> for Lookup<R> {
    fn from(attrs: Attributes) -> Self {
        Self::Attributes(attrs)
    }
}

impl<R> From<Input<R>> for Lookup<R> {
    fn from(input: Input<R>) -> Self {
        match input {
            Input::Record(r) => Self::Record(r),
            Input::Attributes(a) => Self::Attributes(a),
        }
    }
}
