//! Render boundary: drawable snapshot of the tree plus termtree conversion

use termtree::Tree;

use crate::domain::{BstArena, BstNode, Key, Layout, NodeId};

/// One drawable node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub depth: usize,
    pub key: Key,
}

/// Everything a renderer needs for one redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Nodes left to right
    pub nodes: Vec<SceneNode>,
    /// (parent, child) pairs
    pub edges: Vec<(NodeId, NodeId)>,
    pub width: f64,
    pub height: f64,
}

impl Scene {
    /// Combine a tree with its layout. Nodes missing from the layout (stale
    /// layout) are left out rather than drawn at a guessed spot.
    pub fn build(tree: &BstArena, layout: &Layout) -> Self {
        let nodes = tree
            .in_order()
            .filter_map(|(_, node)| {
                layout.position(node.id).map(|pos| SceneNode {
                    id: node.id,
                    x: pos.x,
                    y: pos.y,
                    depth: pos.depth,
                    key: node.key,
                })
            })
            .collect();
        let edges = tree
            .edges()
            .into_iter()
            .filter(|(p, c)| layout.position(*p).is_some() && layout.position(*c).is_some())
            .collect();
        Self {
            nodes,
            edges,
            width: layout.canvas_width,
            height: layout.canvas_height,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Conversion into a `termtree` for textual display.
pub trait ToTermTree {
    fn to_tree_string(&self) -> Tree<String> {
        self.to_tree_string_with(&|node| node.key.to_string())
    }

    fn to_tree_string_with(&self, label: &dyn Fn(&BstNode) -> String) -> Tree<String>;
}

impl ToTermTree for BstArena {
    fn to_tree_string_with(&self, label: &dyn Fn(&BstNode) -> String) -> Tree<String> {
        fn build(
            tree: &BstArena,
            id: NodeId,
            side: &str,
            label: &dyn Fn(&BstNode) -> String,
        ) -> Tree<String> {
            let Some(node) = tree.get(id) else {
                return Tree::new(format!("{}?", side));
            };
            let mut subtree = Tree::new(format!("{}{}", side, label(node)));
            // Left child listed first; a lone right child still shows its side
            if let Some(left) = node.left {
                subtree.push(build(tree, left, "L: ", label));
            }
            if let Some(right) = node.right {
                subtree.push(build(tree, right, "R: ", label));
            }
            subtree
        }

        match self.root() {
            Some(root) => build(self, root, "", label),
            None => Tree::new("(empty tree)".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LayoutConfig;

    #[test]
    fn given_tree_when_building_scene_then_nodes_sorted_by_x() {
        let tree = BstArena::from_keys([50, 30, 70].map(Key::from));
        let layout = Layout::compute(&tree, &LayoutConfig::default());
        let scene = Scene::build(&tree, &layout);
        let keys: Vec<f64> = scene.nodes.iter().map(|n| n.key.value()).collect();
        assert_eq!(keys, vec![30.0, 50.0, 70.0]);
        assert_eq!(scene.edges.len(), 2);
        assert!(scene.nodes.windows(2).all(|w| w[0].x < w[1].x));
    }

    #[test]
    fn given_tree_when_converting_to_termtree_then_sides_labelled() {
        let tree = BstArena::from_keys([2, 1, 3].map(Key::from));
        let rendered = tree.to_tree_string().to_string();
        assert!(rendered.starts_with("2\n"));
        assert!(rendered.contains("L: 1"));
        assert!(rendered.contains("R: 3"));
    }

    #[test]
    fn given_empty_tree_when_converting_to_termtree_then_placeholder() {
        let rendered = BstArena::new().to_tree_string().to_string();
        assert!(rendered.contains("(empty tree)"));
    }
}
