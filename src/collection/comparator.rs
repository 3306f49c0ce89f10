use crate::core::Value;
use crate::query;
use crate::record::{Record, RecordRef};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

type KeyFn<R> = Rc<dyn Fn(&R) -> Value>;
type OrderFn<R> = Rc<dyn Fn(&R, &R) -> Ordering>;

/// Sort order of a collection.
pub enum Comparator<R> {
    /// Ascending by one attribute; missing attributes sort as NULL (last).
    Attribute(String),
    /// Ascending by an extracted key.
    Key(KeyFn<R>),
    /// Two-record ordering function.
    Order(OrderFn<R>),
}

impl<R: Record> Comparator<R> {
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::Attribute(name.into())
    }

    pub fn key<F>(key: F) -> Self
    where
        F: Fn(&R) -> Value + 'static,
    {
        Self::Key(Rc::new(key))
    }

    pub fn order<F>(order: F) -> Self
    where
        F: Fn(&R, &R) -> Ordering + 'static,
    {
        Self::Order(Rc::new(order))
    }

    /// Attribute whose change forces a re-sort, when the order depends on a
    /// single known attribute.
    pub fn sort_attribute(&self) -> Option<&str> {
        match self {
            Self::Attribute(name) => Some(name),
            _ => None,
        }
    }

    /// Stable sort of `records`.
    pub(crate) fn sort(&self, records: &mut Vec<RecordRef<R>>) {
        match self {
            Self::Attribute(name) => {
                *records = query::sort_by(records.iter(), |r: &R| {
                    r.get(name).cloned().unwrap_or(Value::Null)
                });
            }
            Self::Key(key) => {
                *records = query::sort_by(records.iter(), |r: &R| key(r));
            }
            Self::Order(order) => {
                records.sort_by(|a, b| order(&a.borrow(), &b.borrow()));
            }
        }
    }
}

impl<R> Clone for Comparator<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Attribute(name) => Self::Attribute(name.clone()),
            Self::Key(key) => Self::Key(Rc::clone(key)),
            Self::Order(order) => Self::Order(Rc::clone(order)),
        }
    }
}

impl<R> fmt::Debug for Comparator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(name) => f.debug_tuple("Attribute").field(name).finish(),
            Self::Key(_) => f.write_str("Key(..)"),
            Self::Order(_) => f.write_str("Order(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs;
    use crate::record::{Model, record_ref};

    fn ranks(records: &[RecordRef<Model>]) -> Vec<i64> {
        records
            .iter()
            .map(|r| r.borrow().get("rank").and_then(Value::as_i64).unwrap_or(-1))
            .collect()
    }

    fn sample() -> Vec<RecordRef<Model>> {
        [3, 1, 2]
            .into_iter()
            .map(|rank| record_ref(Model::new(attrs! { "rank" => rank })))
            .collect()
    }

    #[test]
    fn test_attribute_comparator() {
        let mut records = sample();
        records.push(record_ref(Model::new(attrs! {})));
        Comparator::attribute("rank").sort(&mut records);
        assert_eq!(ranks(&records), vec![1, 2, 3, -1]);
    }

    #[test]
    fn test_key_comparator() {
        let mut records = sample();
        let descending = Comparator::key(|m: &Model| {
            Value::Integer(-m.get("rank").and_then(Value::as_i64).unwrap_or(0))
        });
        descending.sort(&mut records);
        assert_eq!(ranks(&records), vec![3, 2, 1]);
    }

    #[test]
    fn test_order_comparator_is_stable() {
        let records: Vec<_> = [("a", 1), ("b", 0), ("c", 1), ("d", 0)]
            .into_iter()
            .map(|(name, rank)| record_ref(Model::new(attrs! { "name" => name, "rank" => rank })))
            .collect();
        let mut sorted = records.clone();
        Comparator::order(|a: &Model, b: &Model| {
            a.get("rank").unwrap().sort_cmp(b.get("rank").unwrap())
        })
        .sort(&mut sorted);

        let names: Vec<String> = sorted
            .iter()
            .map(|r| r.borrow().get("name").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_sort_attribute() {
        assert_eq!(Comparator::<Model>::attribute("rank").sort_attribute(), Some("rank"));
        assert_eq!(
            Comparator::<Model>::key(|_| Value::Null).sort_attribute(),
            None
        );
    }
}
