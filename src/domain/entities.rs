//! Domain entities: keys, node identities and recorded decisions

use std::cmp::Ordering;
use std::fmt;

use generational_arena::Index;

use crate::domain::{DomainError, DomainResult};

/// A finite numeric tree key.
///
/// Keys compare numerically, so `-0.0` and `0.0` are the same key.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Key(f64);

impl Key {
    /// Create a key, rejecting NaN and infinities.
    pub fn new(value: f64) -> DomainResult<Self> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidKey(value.to_string()))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Three-way comparison, total because both sides are finite.
    pub fn compare(self, other: Key) -> Ordering {
        if self.0 < other.0 {
            Ordering::Less
        } else if self.0 > other.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

impl TryFrom<f64> for Key {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self(f64::from(value))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of a tree node, independent of its key.
///
/// Wraps the arena index the node was allocated in. Nodes are never removed
/// one by one, so slots are handed out in creation order. Clearing the tree
/// starts a new generation, which keeps labels unique across resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

impl NodeId {
    /// Creation-order slot of this node.
    pub fn slot(self) -> usize {
        self.0.into_raw_parts().0
    }

    /// Arena generation the node was created in.
    pub fn generation(self) -> u64 {
        self.0.into_raw_parts().1
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n-{}.{}", self.generation(), self.slot())
    }
}

/// Outcome of comparing a probe key against one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Left,
    Right,
    Found,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Left => write!(f, "LEFT"),
            Decision::Right => write!(f, "RIGHT"),
            Decision::Found => write!(f, "FOUND"),
        }
    }
}

/// One recorded comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionStep {
    /// Node the probe was compared against
    pub node: NodeId,
    /// Key held by that node at the time of the comparison
    pub key: Key,
    pub decision: Decision,
}

/// Ordered trace of the comparisons made by one insert or search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionPath(Vec<DecisionStep>);

impl DecisionPath {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn push(&mut self, node: NodeId, key: Key, decision: Decision) {
        self.0.push(DecisionStep {
            node,
            key,
            decision,
        });
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn steps(&self) -> &[DecisionStep] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DecisionStep> {
        self.0.iter()
    }

    pub fn last(&self) -> Option<&DecisionStep> {
        self.0.last()
    }

    /// Decisions only, in path order.
    pub fn decisions(&self) -> Vec<Decision> {
        self.0.iter().map(|s| s.decision).collect()
    }

    /// Whether the path terminates on a matching node.
    pub fn ends_with_found(&self) -> bool {
        matches!(self.last(), Some(step) if step.decision == Decision::Found)
    }
}

impl<'a> IntoIterator for &'a DecisionPath {
    type Item = &'a DecisionStep;
    type IntoIter = std::slice::Iter<'a, DecisionStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Result of an insert attempt.
///
/// An inserted key with an empty path became the root: no comparisons were
/// needed. A rejected key (not finite) has neither flag set and an empty path.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOutcome {
    pub inserted: bool,
    pub duplicate: bool,
    pub path: DecisionPath,
    pub new_node: Option<NodeId>,
}

impl InsertOutcome {
    pub(crate) fn attached(path: DecisionPath, node: NodeId) -> Self {
        Self {
            inserted: true,
            duplicate: false,
            path,
            new_node: Some(node),
        }
    }

    pub(crate) fn duplicate(path: DecisionPath) -> Self {
        Self {
            inserted: false,
            duplicate: true,
            path,
            new_node: None,
        }
    }

    pub(crate) fn rejected() -> Self {
        Self {
            inserted: false,
            duplicate: false,
            path: DecisionPath::new(),
            new_node: None,
        }
    }

    pub fn became_root(&self) -> bool {
        self.inserted && self.path.is_empty()
    }

    pub fn is_rejected(&self) -> bool {
        !self.inserted && !self.duplicate
    }
}

/// Why a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// The key was matched; the path ends with a `Found` step.
    Found,
    /// Descent ran off a leaf; the path ends at the last visited node.
    Exhausted,
    /// No comparisons possible, the tree has no nodes.
    EmptyTree,
    /// The probe was not a finite number.
    InvalidKey,
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub found: bool,
    pub status: SearchStatus,
    pub path: DecisionPath,
}

impl SearchOutcome {
    pub(crate) fn new(status: SearchStatus, path: DecisionPath) -> Self {
        Self {
            found: status == SearchStatus::Found,
            status,
            path,
        }
    }

    /// Last node the search compared against, matched or not.
    pub fn last_visited(&self) -> Option<&DecisionStep> {
        self.path.last()
    }
}
