//! Balanced Index Tree - arena-backed AVL tree keyed by `i64`
//!
//! Nodes live in a `Vec` and reference each other by [`NodeId`]. Children are
//! owned links, the parent link is a back-reference used only while
//! rebalancing, and every node caches its `Role` (root, left or right child)
//! and its subtree height.
//!
//! Rotations only reassign indices, so re-linking every touched node after a
//! rotation is a handful of field writes.
//!
//! # Performance
//! - Get / insert: O(log n), iterative descent
//! - Rebalance: at most one single or double rotation per insert
//! - Range scan: O(log n + k) where k = keys in range

use crate::index::{IndexError, IndexResult};
use std::cmp::Ordering;

/// Values that can be folded together when a key window is read as one
pub trait Aggregate: Clone {
    /// Merge `other` into `self`
    fn merge(&mut self, other: &Self);
}

/// Handle to a node slot in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Which side of its parent a node hangs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Root,
    LeftChild,
    RightChild,
}

#[derive(Debug, Clone)]
struct Node<V> {
    key: i64,
    value: V,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
    role: Role,
    /// Leaf = 0
    height: i64,
}

/// Self-balancing binary search tree with unique `i64` keys
///
/// Nodes are created on first insert of a key and never removed.
#[derive(Debug, Clone)]
pub struct AvlTree<V> {
    nodes: Vec<Node<V>>,
    root: Option<NodeId>,
}

impl<V> Default for AvlTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> AvlTree<V> {
    /// Create an empty tree
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Number of keys in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the whole tree: -1 when empty, 0 for a single node
    pub fn height(&self) -> i64 {
        self.height_of(self.root)
    }

    /// Balance of the root: `height(right) - height(left)`, 0 when empty
    pub fn balance(&self) -> i64 {
        self.root.map_or(0, |id| self.balance_of(id))
    }

    /// Read-only view of the root node
    pub fn root(&self) -> Option<NodeRef<'_, V>> {
        self.root.map(|id| NodeRef { tree: self, id })
    }

    /// Read-only view of the node holding `key`
    pub fn find_node(&self, key: i64) -> Option<NodeRef<'_, V>> {
        self.find(key).map(|id| NodeRef { tree: self, id })
    }

    pub fn get(&self, key: i64) -> Option<&V> {
        self.find(key).map(|id| &self.slot(id).value)
    }

    pub fn get_mut(&mut self, key: i64) -> Option<&mut V> {
        let id = self.find(key)?;
        Some(&mut self.slot_mut(id).value)
    }

    pub fn contains_key(&self, key: i64) -> bool {
        self.find(key).is_some()
    }

    /// Replace the value stored under an existing key
    ///
    /// The topology does not change, so no rebalancing happens.
    pub fn update(&mut self, key: i64, value: V) -> IndexResult<()> {
        let slot = self.get_mut(key).ok_or(IndexError::KeyNotFound(key))?;
        *slot = value;
        Ok(())
    }

    /// Insert a new key, then restore the AVL balance on the way back up
    ///
    /// Fails with [`IndexError::KeyExists`] if the key is already present;
    /// the tree is left untouched in that case.
    pub fn insert(&mut self, key: i64, value: V) -> IndexResult<()> {
        let mut parent = None;
        let mut role = Role::Root;
        let mut cursor = self.root;

        while let Some(id) = cursor {
            let node = self.slot(id);
            parent = Some(id);
            match key.cmp(&node.key) {
                Ordering::Less => {
                    role = Role::LeftChild;
                    cursor = node.left;
                }
                Ordering::Greater => {
                    role = Role::RightChild;
                    cursor = node.right;
                }
                Ordering::Equal => return Err(IndexError::KeyExists(key)),
            }
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            key,
            value,
            left: None,
            right: None,
            parent,
            role,
            height: 0,
        });
        self.link(parent, role, id);
        self.rebalance_from(id);

        Ok(())
    }

    /// In-order iterator over every `(key, value)` pair
    pub fn iter(&self) -> Range<'_, V> {
        self.range(i64::MIN, i64::MAX)
    }

    /// In-order iterator over the keys in `[lo, hi]`
    pub fn range(&self, lo: i64, hi: i64) -> Range<'_, V> {
        let mut range = Range {
            tree: self,
            stack: Vec::new(),
            lo,
            hi,
        };
        range.descend(self.root);
        range
    }

    /// Union of the values of every key in `[lo, hi]`
    ///
    /// Returns `None` when no key falls inside the window.
    pub fn between(&self, lo: i64, hi: i64) -> Option<V>
    where
        V: Aggregate,
    {
        let mut entries = self.range(lo, hi);
        let (_, first) = entries.next()?;
        let mut union = first.clone();
        for (_, value) in entries {
            union.merge(value);
        }
        Some(union)
    }

    fn find(&self, key: i64) -> Option<NodeId> {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = self.slot(id);
            cursor = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    fn slot(&self, id: NodeId) -> &Node<V> {
        &self.nodes[id.0]
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut Node<V> {
        &mut self.nodes[id.0]
    }

    fn height_of(&self, id: Option<NodeId>) -> i64 {
        id.map_or(-1, |id| self.slot(id).height)
    }

    fn balance_of(&self, id: NodeId) -> i64 {
        let node = self.slot(id);
        self.height_of(node.right) - self.height_of(node.left)
    }

    /// Recompute a cached height from its children, returning whether it changed
    fn refresh_height(&mut self, id: NodeId) -> bool {
        let node = self.slot(id);
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        let changed = node.height != height;
        self.slot_mut(id).height = height;
        changed
    }

    /// Hang `child` under `parent` on the side given by `role`
    fn link(&mut self, parent: Option<NodeId>, role: Role, child: NodeId) {
        match (role, parent) {
            (Role::Root, _) => self.root = Some(child),
            (Role::LeftChild, Some(parent)) => self.slot_mut(parent).left = Some(child),
            (Role::RightChild, Some(parent)) => self.slot_mut(parent).right = Some(child),
            (_, None) => unreachable!("child role without a parent node"),
        }
    }

    /// Walk from a freshly linked node toward the root
    ///
    /// At the first ancestor whose balance leaves `[-1, 1]`, the rotation is
    /// picked from the role and balance of its child on the insertion path.
    /// One rotation brings the subtree back to its pre-insert height, so the
    /// walk ends there.
    fn rebalance_from(&mut self, inserted: NodeId) {
        let mut child = inserted;

        while let Some(parent) = self.slot(child).parent {
            let grew = self.refresh_height(parent);
            let balance = self.balance_of(parent);

            if (-1..=1).contains(&balance) {
                if !grew {
                    break;
                }
                child = parent;
                continue;
            }

            let child_balance = self.balance_of(child);
            let role = self.slot(child).role;
            match role {
                // right-right
                Role::RightChild if child_balance >= 0 => {
                    self.rotate_left(parent);
                }
                // right-left
                Role::RightChild => {
                    self.rotate_right(child);
                    self.rotate_left(parent);
                }
                // left-right
                Role::LeftChild if child_balance > 0 => {
                    self.rotate_left(child);
                    self.rotate_right(parent);
                }
                // left-left
                Role::LeftChild => {
                    self.rotate_right(parent);
                }
                Role::Root => unreachable!("a node with a parent cannot be the root"),
            }
            break;
        }
    }

    /// ```text
    ///   x                y
    ///    \             /   \
    ///     y     =>    x     c
    ///    / \           \
    ///   b   c           b
    /// ```
    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.slot(x).right else {
            unreachable!("left rotation requires a right child");
        };
        let inner = self.slot(y).left;
        let (parent, role) = (self.slot(x).parent, self.slot(x).role);

        self.slot_mut(x).right = inner;
        if let Some(inner) = inner {
            let node = self.slot_mut(inner);
            node.parent = Some(x);
            node.role = Role::RightChild;
        }

        let promoted = self.slot_mut(y);
        promoted.parent = parent;
        promoted.role = role;
        promoted.left = Some(x);
        self.link(parent, role, y);

        let demoted = self.slot_mut(x);
        demoted.parent = Some(y);
        demoted.role = Role::LeftChild;

        self.refresh_height(x);
        self.refresh_height(y);
        y
    }

    /// ```text
    ///       x            y
    ///      /           /   \
    ///     y     =>    a     x
    ///    / \               /
    ///   a   b             b
    /// ```
    fn rotate_right(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.slot(x).left else {
            unreachable!("right rotation requires a left child");
        };
        let inner = self.slot(y).right;
        let (parent, role) = (self.slot(x).parent, self.slot(x).role);

        self.slot_mut(x).left = inner;
        if let Some(inner) = inner {
            let node = self.slot_mut(inner);
            node.parent = Some(x);
            node.role = Role::LeftChild;
        }

        let promoted = self.slot_mut(y);
        promoted.parent = parent;
        promoted.role = role;
        promoted.right = Some(x);
        self.link(parent, role, y);

        let demoted = self.slot_mut(x);
        demoted.parent = Some(y);
        demoted.role = Role::RightChild;

        self.refresh_height(x);
        self.refresh_height(y);
        y
    }
}

/// Borrowed view of a single tree node
pub struct NodeRef<'a, V> {
    tree: &'a AvlTree<V>,
    id: NodeId,
}

impl<V> Clone for NodeRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for NodeRef<'_, V> {}

impl<'a, V> NodeRef<'a, V> {
    fn at(self, id: Option<NodeId>) -> Option<NodeRef<'a, V>> {
        id.map(|id| NodeRef {
            tree: self.tree,
            id,
        })
    }

    pub fn key(self) -> i64 {
        self.tree.slot(self.id).key
    }

    pub fn value(self) -> &'a V {
        &self.tree.slot(self.id).value
    }

    pub fn left(self) -> Option<NodeRef<'a, V>> {
        self.at(self.tree.slot(self.id).left)
    }

    pub fn right(self) -> Option<NodeRef<'a, V>> {
        self.at(self.tree.slot(self.id).right)
    }

    pub fn parent(self) -> Option<NodeRef<'a, V>> {
        self.at(self.tree.slot(self.id).parent)
    }

    pub fn role(self) -> Role {
        self.tree.slot(self.id).role
    }

    pub fn height(self) -> i64 {
        self.tree.slot(self.id).height
    }

    pub fn balance(self) -> i64 {
        self.tree.balance_of(self.id)
    }
}

/// In-order iterator over a key window, see [`AvlTree::range`]
pub struct Range<'a, V> {
    tree: &'a AvlTree<V>,
    stack: Vec<NodeId>,
    lo: i64,
    hi: i64,
}

impl<V> Range<'_, V> {
    /// Push the left spine of `cursor`, skipping subtrees below `lo`
    fn descend(&mut self, mut cursor: Option<NodeId>) {
        while let Some(id) = cursor {
            let node = self.tree.slot(id);
            if node.key < self.lo {
                cursor = node.right;
            } else {
                self.stack.push(id);
                cursor = node.left;
            }
        }
    }
}

impl<'a, V> Iterator for Range<'a, V> {
    type Item = (i64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.slot(id);
        if node.key > self.hi {
            self.stack.clear();
            return None;
        }
        self.descend(node.right);
        Some((node.key, &node.value))
    }
}
