//! Arena-backed binary search tree with instrumented insert and search

use std::cmp::Ordering;

use generational_arena::Arena;
use tracing::{debug, instrument, trace};

use crate::domain::{
    Decision, DecisionPath, InsertOutcome, Key, NodeId, SearchOutcome, SearchStatus,
};

/// Tree node in the arena-backed binary search tree.
#[derive(Debug)]
pub struct BstNode {
    /// Stable identity, the arena slot this node lives in
    pub id: NodeId,
    pub key: Key,
    /// Subtree with keys strictly less than `key`
    pub left: Option<NodeId>,
    /// Subtree with keys strictly greater than `key`
    pub right: Option<NodeId>,
}

/// Arena-based binary search tree.
///
/// Every node is reachable from exactly one parent slot (or the root slot);
/// child links are arena indices, there are no back-pointers. Nodes are only
/// ever added, and existing nodes change only by gaining a child link.
#[derive(Debug, Default)]
pub struct BstArena {
    /// Arena storage for all tree nodes
    arena: Arena<BstNode>,
    /// Root node, None for empty trees
    root: Option<NodeId>,
}

impl BstArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Build a tree by inserting `keys` in order; duplicates are skipped.
    pub fn from_keys(keys: impl IntoIterator<Item = Key>) -> Self {
        let mut tree = Self::new();
        for key in keys {
            tree.insert_key(key);
        }
        tree
    }

    /// Discard every node.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn get(&self, id: NodeId) -> Option<&BstNode> {
        self.arena.get(id.0)
    }

    pub fn key_of(&self, id: NodeId) -> Option<Key> {
        self.get(id).map(|n| n.key)
    }

    /// Child links of a node that belongs to this tree.
    pub fn children(&self, id: NodeId) -> (Option<NodeId>, Option<NodeId>) {
        self.get(id).map_or((None, None), |n| (n.left, n.right))
    }

    // Ids handed to this helper come from this arena, which never removes nodes.
    fn node(&self, id: NodeId) -> &BstNode {
        &self.arena[id.0]
    }

    fn allocate(&mut self, key: Key) -> NodeId {
        let idx = self.arena.insert_with(|idx| BstNode {
            id: NodeId(idx),
            key,
            left: None,
            right: None,
        });
        NodeId(idx)
    }

    /// Insert a raw numeric value; non-finite values are rejected without effect.
    pub fn insert(&mut self, value: f64) -> InsertOutcome {
        match Key::new(value) {
            Ok(key) => self.insert_key(key),
            Err(e) => {
                debug!("insert rejected: {}", e);
                InsertOutcome::rejected()
            }
        }
    }

    /// Insert `key`, recording every comparison made on the way down.
    ///
    /// A duplicate stops at the matching node with a `Found` step and leaves
    /// the tree untouched. Inserting into an empty tree makes the key the root
    /// with an empty path.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_key(&mut self, key: Key) -> InsertOutcome {
        let mut path = DecisionPath::new();
        let Some(mut current) = self.root else {
            let id = self.allocate(key);
            self.root = Some(id);
            debug!("insert {}: became root {}", key, id);
            return InsertOutcome::attached(path, id);
        };

        loop {
            let node = self.node(current);
            let (node_key, left, right) = (node.key, node.left, node.right);
            match key.compare(node_key) {
                Ordering::Equal => {
                    path.push(current, node_key, Decision::Found);
                    debug!("insert {}: duplicate of {}", key, current);
                    return InsertOutcome::duplicate(path);
                }
                Ordering::Less => {
                    path.push(current, node_key, Decision::Left);
                    match left {
                        Some(child) => current = child,
                        None => {
                            let id = self.allocate(key);
                            self.arena[current.0].left = Some(id);
                            debug!("insert {}: left child of {}", key, node_key);
                            return InsertOutcome::attached(path, id);
                        }
                    }
                }
                Ordering::Greater => {
                    path.push(current, node_key, Decision::Right);
                    match right {
                        Some(child) => current = child,
                        None => {
                            let id = self.allocate(key);
                            self.arena[current.0].right = Some(id);
                            debug!("insert {}: right child of {}", key, node_key);
                            return InsertOutcome::attached(path, id);
                        }
                    }
                }
            }
        }
    }

    /// Search a raw numeric value; non-finite values report `InvalidKey`.
    pub fn search(&self, value: f64) -> SearchOutcome {
        match Key::new(value) {
            Ok(key) => self.search_key(key),
            Err(_) => SearchOutcome::new(SearchStatus::InvalidKey, DecisionPath::new()),
        }
    }

    /// Descend from the root towards `key`, recording each decision.
    #[instrument(level = "trace", skip(self))]
    pub fn search_key(&self, key: Key) -> SearchOutcome {
        let mut path = DecisionPath::new();
        if self.root.is_none() {
            return SearchOutcome::new(SearchStatus::EmptyTree, path);
        }

        let mut cursor = self.root;
        while let Some(current) = cursor {
            let node = self.node(current);
            match key.compare(node.key) {
                Ordering::Equal => {
                    path.push(current, node.key, Decision::Found);
                    trace!("search {}: found at {}", key, current);
                    return SearchOutcome::new(SearchStatus::Found, path);
                }
                Ordering::Less => {
                    path.push(current, node.key, Decision::Left);
                    cursor = node.left;
                }
                Ordering::Greater => {
                    path.push(current, node.key, Decision::Right);
                    cursor = node.right;
                }
            }
        }
        trace!("search {}: exhausted after {} steps", key, path.len());
        SearchOutcome::new(SearchStatus::Exhausted, path)
    }

    /// Number of levels: 0 for an empty tree, 1 for a lone root.
    #[instrument(level = "debug", skip(self))]
    pub fn height(&self) -> usize {
        self.height_of(self.root)
    }

    fn height_of(&self, id: Option<NodeId>) -> usize {
        match id {
            Some(id) => {
                let node = self.node(id);
                1 + self.height_of(node.left).max(self.height_of(node.right))
            }
            None => 0,
        }
    }

    /// Total number of nodes reachable from the root.
    #[instrument(level = "debug", skip(self))]
    pub fn count(&self) -> usize {
        self.count_of(self.root)
    }

    fn count_of(&self, id: Option<NodeId>) -> usize {
        match id {
            Some(id) => {
                let node = self.node(id);
                1 + self.count_of(node.left) + self.count_of(node.right)
            }
            None => 0,
        }
    }

    /// In-order (left, self, right) traversal with edge depth from the root.
    pub fn in_order(&self) -> InOrderIterator<'_> {
        InOrderIterator::new(self)
    }

    /// Pre-order (self, left, right) traversal with edge depth from the root.
    pub fn pre_order(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self)
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> Vec<Key> {
        self.in_order().map(|(_, node)| node.key).collect()
    }

    /// Parent-child pairs, parents before their children.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.pre_order()
            .flat_map(|(_, node)| {
                [node.left, node.right]
                    .into_iter()
                    .flatten()
                    .map(move |child| (node.id, child))
            })
            .collect()
    }
}

pub struct InOrderIterator<'a> {
    tree: &'a BstArena,
    stack: Vec<(NodeId, usize)>,
    cursor: Option<(NodeId, usize)>,
}

impl<'a> InOrderIterator<'a> {
    fn new(tree: &'a BstArena) -> Self {
        Self {
            tree,
            stack: Vec::new(),
            cursor: tree.root().map(|r| (r, 0)),
        }
    }
}

impl<'a> Iterator for InOrderIterator<'a> {
    type Item = (usize, &'a BstNode);

    fn next(&mut self) -> Option<Self::Item> {
        // Walk down the left spine, then emit and continue with the right subtree
        while let Some((id, depth)) = self.cursor.take() {
            self.stack.push((id, depth));
            self.cursor = self.tree.node(id).left.map(|l| (l, depth + 1));
        }
        let (id, depth) = self.stack.pop()?;
        let node = self.tree.node(id);
        self.cursor = node.right.map(|r| (r, depth + 1));
        Some((depth, node))
    }
}

pub struct PreOrderIterator<'a> {
    tree: &'a BstArena,
    stack: Vec<(NodeId, usize)>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(tree: &'a BstArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push((root, 0));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (usize, &'a BstNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        let node = self.tree.node(id);
        // Push right first so the left subtree is visited first
        if let Some(right) = node.right {
            self.stack.push((right, depth + 1));
        }
        if let Some(left) = node.left {
            self.stack.push((left, depth + 1));
        }
        Some((depth, node))
    }
}
