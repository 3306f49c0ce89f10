use crate::core::ValidationError;
use crate::record::{Changes, RecordRef};
use std::fmt;
use std::rc::Rc;

/// What reconciliation did with one input.
pub enum Outcome<R> {
    /// A new record was inserted.
    Added(RecordRef<R>),
    /// The input matched a record already present; `changes` lists the
    /// attributes a merge changed (empty when nothing was merged).
    Existing {
        record: RecordRef<R>,
        changes: Changes,
    },
    /// The factory refused the attributes.
    Skipped(ValidationError),
    /// No match and adding was disabled.
    Ignored,
}

impl<R> Outcome<R> {
    /// The resolved record, post-merge.
    pub fn record(&self) -> Option<&RecordRef<R>> {
        match self {
            Self::Added(record) | Self::Existing { record, .. } => Some(record),
            Self::Skipped(_) | Self::Ignored => None,
        }
    }

    pub fn into_record(self) -> Option<RecordRef<R>> {
        match self {
            Self::Added(record) | Self::Existing { record, .. } => Some(record),
            Self::Skipped(_) | Self::Ignored => None,
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

impl<R> fmt::Debug for Outcome<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added(_) => f.write_str("Added"),
            Self::Existing { changes, .. } => f.debug_struct("Existing").field("changes", changes).finish(),
            Self::Skipped(err) => f.debug_tuple("Skipped").field(err).finish(),
            Self::Ignored => f.write_str("Ignored"),
        }
    }
}

/// Result of one `set`/`add` call.
pub struct Changeset<R> {
    /// One outcome per input, in input order.
    pub outcomes: Vec<Outcome<R>>,
    /// Records removed because no input matched them.
    pub removed: Vec<RecordRef<R>>,
    /// Whether the comparator re-sorted the collection.
    pub sorted: bool,
}

impl<R> Changeset<R> {
    /// Resolved records in input order; skipped and ignored inputs are left out.
    pub fn records(&self) -> Vec<RecordRef<R>> {
        self.outcomes.iter().filter_map(Outcome::record).map(Rc::clone).collect()
    }

    pub fn added(&self) -> impl Iterator<Item = &RecordRef<R>> {
        self.outcomes.iter().filter_map(|o| match o {
            Outcome::Added(record) => Some(record),
            _ => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ValidationError> {
        self.outcomes.iter().filter_map(|o| match o {
            Outcome::Skipped(err) => Some(err),
            _ => None,
        })
    }

    /// Unwraps the outcome of a single-input call.
    pub fn into_single(self) -> Outcome<R> {
        self.outcomes.into_iter().next().unwrap_or(Outcome::Ignored)
    }
}

impl<R> fmt::Debug for Changeset<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Changeset")
            .field("outcomes", &self.outcomes)
            .field("removed", &self.removed.len())
            .field("sorted", &self.sorted)
            .finish()
    }
}

/// Result of a call whose input was either one item or a list, in the same
/// shape as the input.
pub enum Reconciled<R> {
    One(Outcome<R>),
    Many(Changeset<R>),
}

impl<R> Reconciled<R> {
    /// Resolved records; skipped and ignored inputs are left out.
    pub fn records(&self) -> Vec<RecordRef<R>> {
        match self {
            Self::One(outcome) => outcome.record().into_iter().map(Rc::clone).collect(),
            Self::Many(changeset) => changeset.records(),
        }
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Self::One(_))
    }
}

impl<R> fmt::Debug for Reconciled<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(outcome) => f.debug_tuple("One").field(outcome).finish(),
            Self::Many(changeset) => f.debug_tuple("Many").field(changeset).finish(),
        }
    }
}

/// Result of `reset`: the new contents plus the records that were replaced.
pub struct ResetOutcome<R> {
    pub changeset: Changeset<R>,
    pub previous: Vec<RecordRef<R>>,
}

impl<R> ResetOutcome<R> {
    pub fn records(&self) -> Vec<RecordRef<R>> {
        self.changeset.records()
    }
}

impl<R> fmt::Debug for ResetOutcome<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetOutcome")
            .field("changeset", &self.changeset)
            .field("previous", &self.previous.len())
            .finish()
    }
}
