use std::iter::FusedIterator;

use super::arena::{Arena, Handle};
use super::{Color, Node};

// Explicit-stack in-order walk shared by every iterator below. Yields node handles along with
// their distance from the root.
struct Walk<'a, T> {
    nodes: &'a Arena<Node<T>>,
    stack: Vec<(Handle, usize)>,
    // Subtree that still has to be descended to its leftmost node.
    pending: Option<(Handle, usize)>,
}

impl<'a, T> Walk<'a, T> {
    fn new(nodes: &'a Arena<Node<T>>, root: Option<Handle>) -> Self {
        Self {
            nodes,
            stack: Vec::new(),
            pending: root.map(|r| (r, 0)),
        }
    }

    fn next(&mut self) -> Option<(Handle, usize, &'a Node<T>)> {
        let nodes = self.nodes;

        while let Some((h, depth)) = self.pending.take() {
            self.stack.push((h, depth));
            self.pending = nodes.get(h).left.map(|l| (l, depth + 1));
        }

        let (h, depth) = self.stack.pop()?;
        let node = nodes.get(h);
        self.pending = node.right.map(|r| (r, depth + 1));
        Some((h, depth, node))
    }

    fn is_done(&self) -> bool {
        self.pending.is_none() && self.stack.is_empty()
    }
}

/// One position in a depth-annotated in-order traversal. See [`RedBlackTree::inorder`].
///
/// [`RedBlackTree::inorder`]: super::RedBlackTree::inorder
#[derive(Debug, PartialEq, Eq)]
pub struct Entry<'a, T> {
    key: &'a T,
    color: Color,
    depth: usize,
}

impl<T> Clone for Entry<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Entry<'_, T> {}

impl<'a, T> Entry<'a, T> {
    /// The stored key.
    #[must_use]
    pub const fn key(&self) -> &'a T {
        self.key
    }

    /// The colour of the node holding the key.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Distance from the root. The root is at depth 0.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Returns `(key, color, depth)`.
    #[must_use]
    pub const fn into_tuple(self) -> (&'a T, Color, usize) {
        (self.key, self.color, self.depth)
    }
}

/// Lazy in-order traversal yielding an [`Entry`] per key.
pub struct Inorder<'a, T> {
    walk: Walk<'a, T>,
}

impl<'a, T> Inorder<'a, T> {
    pub(super) fn new(nodes: &'a Arena<Node<T>>, root: Option<Handle>) -> Self {
        Self { walk: Walk::new(nodes, root) }
    }
}

impl<'a, T> Iterator for Inorder<'a, T> {
    type Item = Entry<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let (_, depth, node) = self.walk.next()?;
        Some(Entry { key: &node.key, color: node.color, depth })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.walk.is_done() { (0, Some(0)) } else { (1, None) }
    }
}

impl<T> FusedIterator for Inorder<'_, T> {}

/// Ascending iterator over the keys of a tree.
pub struct Iter<'a, T> {
    walk: Walk<'a, T>,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(nodes: &'a Arena<Node<T>>, root: Option<Handle>) -> Self {
        Self { walk: Walk::new(nodes, root) }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next().map(|(_, _, node)| &node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.walk.is_done() { (0, Some(0)) } else { (1, None) }
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

/// Consuming ascending iterator over the keys of a tree.
pub struct IntoIter<T> {
    nodes: Arena<Node<T>>,
    order: std::vec::IntoIter<Handle>,
}

impl<T> IntoIter<T> {
    pub(super) fn new(nodes: Arena<Node<T>>, root: Option<Handle>) -> Self {
        let mut walk = Walk::new(&nodes, root);
        let mut order = Vec::with_capacity(nodes.len());
        while let Some((h, _, _)) = walk.next() {
            order.push(h);
        }

        Self { nodes, order: order.into_iter() }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.order.next().map(|h| self.nodes.take(h).key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<T> FusedIterator for IntoIter<T> {}
