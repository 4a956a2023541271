//! Layout engine: in-order x ranks, depth-based y, canvas extent and fit scale
//!
//! Positions are recomputed from scratch for every structural change. The
//! in-order rank drives x, so keys read strictly increasing left to right.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::{BstArena, DomainError, NodeId};

/// Geometry constants for the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Canvas width used when the tree is narrow
    pub min_width: f64,
    /// Horizontal allowance per node; widens the canvas for dense trees
    pub node_spacing: f64,
    /// Canvas height used when the tree is shallow
    pub min_height: f64,
    /// y of the root level, also used as bottom margin
    pub y_base: f64,
    /// Vertical distance between levels
    pub y_step: f64,
    /// Radius the render boundary draws nodes with
    pub node_radius: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_width: 1200.0,
            node_spacing: 56.0,
            min_height: 520.0,
            y_base: 70.0,
            y_step: 84.0,
            node_radius: 20.0,
        }
    }
}

/// Placement of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPosition {
    pub node: NodeId,
    pub x: f64,
    pub y: f64,
    /// Edges from the root, root = 0
    pub depth: usize,
    /// 0-based position in the in-order sequence
    pub rank: usize,
}

/// Available drawing area reported by the viewport boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

impl FromStr for Viewport {
    type Err = DomainError;

    /// Parses `WIDTHxHEIGHT`, e.g. `800x600`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidViewport(s.to_string());
        let (w, h) = s
            .trim()
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(invalid)?;
        let width: f64 = w.trim().parse().map_err(|_| invalid())?;
        let height: f64 = h.trim().parse().map_err(|_| invalid())?;
        Ok(Self::new(width, height))
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Complete layout of a tree snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    positions: HashMap<NodeId, LayoutPosition>,
    /// Node ids left to right
    order: Vec<NodeId>,
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Deepest level, None for an empty tree
    pub max_depth: Option<usize>,
}

impl Layout {
    /// Lay out `tree` from scratch.
    #[instrument(level = "debug", skip_all)]
    pub fn compute(tree: &BstArena, config: &LayoutConfig) -> Self {
        let nodes: Vec<(usize, NodeId)> = tree.in_order().map(|(d, n)| (d, n.id)).collect();
        let count = nodes.len();
        let slots = (count + 1) as f64;

        let canvas_width = config.min_width.max(slots * config.node_spacing);
        let x_step = canvas_width / slots;

        let mut positions = HashMap::with_capacity(count);
        let mut order = Vec::with_capacity(count);
        let mut max_depth = None;
        for (rank, (depth, id)) in nodes.into_iter().enumerate() {
            positions.insert(
                id,
                LayoutPosition {
                    node: id,
                    x: x_step * (rank + 1) as f64,
                    y: config.y_base + depth as f64 * config.y_step,
                    depth,
                    rank,
                },
            );
            order.push(id);
            max_depth = max_depth.max(Some(depth));
        }

        let canvas_height = match max_depth {
            Some(depth) => config
                .min_height
                .max(2.0 * config.y_base + depth as f64 * config.y_step),
            None => config.min_height,
        };

        debug!(
            "layout: {} nodes, canvas {}x{}",
            count, canvas_width, canvas_height
        );
        Self {
            positions,
            order,
            canvas_width,
            canvas_height,
            max_depth,
        }
    }

    pub fn position(&self, id: NodeId) -> Option<&LayoutPosition> {
        self.positions.get(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Positions in increasing x.
    pub fn iter(&self) -> impl Iterator<Item = &LayoutPosition> {
        self.order.iter().filter_map(|id| self.positions.get(id))
    }

    /// Largest scale ≤ 1 at which the whole canvas fits into `viewport`.
    ///
    /// Never magnifies. A degenerate viewport gives 1.0, since no meaningful
    /// shrink factor exists for it.
    pub fn fit_scale(&self, viewport: Viewport) -> f64 {
        if viewport.is_degenerate() || self.canvas_width <= 0.0 || self.canvas_height <= 0.0 {
            return 1.0;
        }
        let sx = viewport.width / self.canvas_width;
        let sy = viewport.height / self.canvas_height;
        sx.min(sy).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Key;

    #[test]
    fn given_viewport_string_when_parsing_then_width_and_height() {
        let v: Viewport = "800x600".parse().unwrap();
        assert_eq!(v, Viewport::new(800.0, 600.0));
        assert!("800".parse::<Viewport>().is_err());
        assert!("axb".parse::<Viewport>().is_err());
    }

    #[test]
    fn given_empty_tree_when_computing_then_minimum_canvas() {
        let layout = Layout::compute(&BstArena::new(), &LayoutConfig::default());
        assert!(layout.is_empty());
        assert_eq!(layout.canvas_width, 1200.0);
        assert_eq!(layout.canvas_height, 520.0);
        assert_eq!(layout.max_depth, None);
    }

    #[test]
    fn given_single_node_when_computing_then_centered_at_base() {
        let tree = BstArena::from_keys([Key::from(5)]);
        let layout = Layout::compute(&tree, &LayoutConfig::default());
        let pos = layout.position(tree.root().unwrap()).unwrap();
        assert_eq!(pos.x, 600.0);
        assert_eq!(pos.y, 70.0);
        assert_eq!(pos.depth, 0);
    }
}
