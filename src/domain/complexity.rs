//! Complexity estimator: an advisory balanced/skewed classification
//!
//! This is a heuristic comparing the actual height against the height of a
//! perfectly balanced tree with the same node count. It is not a proof of
//! any asymptotic bound and should be presented as a hint only.

use std::fmt;

/// Qualitative verdict for the last traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing to judge: empty tree, no steps taken or no nodes
    Undetermined,
    /// Height within one level of the balanced reference
    NearBalanced { steps: usize, reference: usize },
    /// Height more than one level above the balanced reference
    Skewed { steps: usize, reference: usize },
}

impl Verdict {
    pub fn is_skewed(&self) -> bool {
        matches!(self, Verdict::Skewed { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Undetermined => write!(f, "-"),
            Verdict::NearBalanced { steps, .. } => write!(
                f,
                "Likely near balanced: search ≈ O(log n), actual steps: {}",
                steps
            ),
            Verdict::Skewed { steps, .. } => write!(
                f,
                "Tree is getting skewed: search can drift toward O(n), actual steps: {}",
                steps
            ),
        }
    }
}

/// Height of a perfectly balanced tree holding `node_count` nodes:
/// `ceil(log2(node_count + 1))`.
pub fn balanced_height(node_count: usize) -> usize {
    // ceil(log2(n + 1)) == floor(log2(n)) + 1 for n >= 1
    node_count.checked_ilog2().map_or(0, |l| l as usize + 1)
}

/// Classify a traversal of `steps` comparisons on a tree of `height` levels.
pub fn estimate(height: usize, steps: usize, node_count: usize) -> Verdict {
    if height == 0 || steps == 0 || node_count == 0 {
        return Verdict::Undetermined;
    }
    let reference = balanced_height(node_count);
    if height <= reference + 1 {
        Verdict::NearBalanced { steps, reference }
    } else {
        Verdict::Skewed { steps, reference }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_small_counts_when_computing_reference_then_ceil_log2() {
        assert_eq!(balanced_height(0), 0);
        assert_eq!(balanced_height(1), 1);
        assert_eq!(balanced_height(3), 2);
        assert_eq!(balanced_height(5), 3);
        assert_eq!(balanced_height(7), 3);
        assert_eq!(balanced_height(8), 4);
    }

    #[test]
    fn given_verdicts_when_displayed_then_learner_wording() {
        assert_eq!(Verdict::Undetermined.to_string(), "-");
        assert!(estimate(3, 2, 7).to_string().starts_with("Likely near balanced"));
        assert!(estimate(5, 5, 5).to_string().ends_with("actual steps: 5"));
    }
}
