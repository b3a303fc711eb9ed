use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{self, Debug};

use log::{debug, trace};

use self::arena::{Arena, Handle};
use crate::Key;
pub use self::inorder::{Entry, Inorder, IntoIter, Iter};

mod arena;
mod inorder;

/// The colour of a node. Absent children are always treated as [`Color::Black`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Color {
    /// A red node. A red node never has a red parent.
    Red,
    /// A black node. Every path from a node to its absent descendants passes through the same
    /// number of black nodes.
    Black,
}

impl Color {
    /// Returns `true` for [`Color::Red`].
    #[must_use]
    pub const fn is_red(self) -> bool {
        matches!(self, Self::Red)
    }

    /// Single letter form, `'R'` or `'B'`.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Black => 'B',
        }
    }
}

#[derive(Clone)]
struct Node<T> {
    key: T,
    color: Color,
    parent: Option<Handle>,
    left: Option<Handle>,
    right: Option<Handle>,
}

impl<T> Node<T> {
    const fn new(key: T, parent: Option<Handle>) -> Self {
        Self {
            key,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        }
    }
}

/// An ordered set of unique keys kept balanced as a red-black tree.
///
/// Nodes live in an arena owned by the tree and refer to each other through compact handles, so
/// parent links never participate in ownership. Absent children are implicitly black.
///
/// ```
/// use redblack::{Color, RedBlackTree};
///
/// let mut tree = RedBlackTree::new();
/// for k in [5, 2, 7] {
///     assert!(tree.insert(k));
/// }
/// assert!(!tree.insert(5));
///
/// let shape: Vec<_> = tree.inorder().map(|e| e.into_tuple()).collect();
/// assert_eq!(shape, [(&2, Color::Red, 1), (&5, Color::Black, 0), (&7, Color::Red, 1)]);
///
/// assert_eq!(tree.remove(&5), Some(5));
/// assert_eq!(tree.remove(&5), None);
/// ```
#[derive(Clone)]
pub struct RedBlackTree<T> {
    nodes: Arena<Node<T>>,
    root: Option<Handle>,
}

impl<T> Default for RedBlackTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for RedBlackTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

// Accessors that don't depend on ordering.
impl<T> RedBlackTree<T> {
    /// Creates an empty tree. Does not allocate.
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Arena::new(), root: None }
    }

    /// Returns `true` if the tree holds no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.root = None;
        self.nodes.clear();
    }

    /// Returns the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.root.map(|r| &self.node(self.minimum(r)).key)
    }

    /// Returns the largest key.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        let mut n = self.root?;
        while let Some(r) = self.node(n).right {
            n = r;
        }
        Some(&self.node(n).key)
    }

    /// Number of nodes on the longest path from the root down to a leaf. An empty tree has height
    /// 0. For `n` keys this never exceeds `2 * log2(n + 1)`.
    #[must_use]
    pub fn height(&self) -> usize {
        self.inorder().map(|e| e.depth() + 1).max().unwrap_or(0)
    }

    /// Returns a depth-annotated in-order traversal of the tree.
    ///
    /// Each [`Entry`] carries the key, its colour, and its distance from the root (the root is at
    /// depth 0). The traversal is lazy and read-only; call this again to restart it.
    pub fn inorder(&self) -> Inorder<'_, T> {
        Inorder::new(&self.nodes, self.root)
    }

    /// Returns the keys in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.nodes, self.root)
    }

    #[inline]
    fn node(&self, h: Handle) -> &Node<T> {
        self.nodes.get(h)
    }

    #[inline]
    fn node_mut(&mut self, h: Handle) -> &mut Node<T> {
        self.nodes.get_mut(h)
    }

    #[inline]
    fn color_of(&self, n: Option<Handle>) -> Color {
        n.map_or(Color::Black, |h| self.node(h).color)
    }

    #[inline]
    fn is_red(&self, n: Option<Handle>) -> bool {
        self.color_of(n).is_red()
    }

    #[inline]
    fn set_color(&mut self, h: Handle, color: Color) {
        self.node_mut(h).color = color;
    }

    fn minimum(&self, mut n: Handle) -> Handle {
        while let Some(l) = self.node(n).left {
            n = l;
        }
        n
    }

    // Points whatever referred to `old` (its parent's child slot, or the root) at `new`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let pn = self.node_mut(p);
                if pn.left == Some(old) {
                    pn.left = new;
                } else {
                    pn.right = new;
                }
            }
        }
    }

    // Puts the subtree rooted at `v` where `u` was. `u` keeps its own links.
    fn transplant(&mut self, u: Handle, v: Option<Handle>) {
        let up = self.node(u).parent;
        self.replace_child(up, u, v);
        if let Some(v) = v {
            self.node_mut(v).parent = up;
        }
    }

    fn rotate_left(&mut self, pivot: Handle) {
        // Right child becomes the new parent
        let r = self.node(pivot).right.expect("Tried to make None child into parent");
        trace!("rotate_left at {pivot:?}");

        let inner = self.node(r).left;
        self.node_mut(pivot).right = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(pivot);
        }

        let up = self.node(pivot).parent;
        self.node_mut(r).parent = up;
        self.replace_child(up, pivot, Some(r));

        self.node_mut(r).left = Some(pivot);
        self.node_mut(pivot).parent = Some(r);
    }

    fn rotate_right(&mut self, pivot: Handle) {
        // Left child becomes the new parent
        let l = self.node(pivot).left.expect("Tried to make None child into parent");
        trace!("rotate_right at {pivot:?}");

        let inner = self.node(l).right;
        self.node_mut(pivot).left = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(pivot);
        }

        let up = self.node(pivot).parent;
        self.node_mut(l).parent = up;
        self.replace_child(up, pivot, Some(l));

        self.node_mut(l).right = Some(pivot);
        self.node_mut(pivot).parent = Some(l);
    }

    // c - current
    // p - parent
    // g - grandparent
    // u - uncle
    fn fix_after_insert(&mut self, mut c: Handle) {
        while let Some(mut p) = self.node(c).parent {
            if !self.node(c).color.is_red() || !self.node(p).color.is_red() {
                break;
            }

            // A red node is never the root, so p has a parent.
            let g = self.node(p).parent.expect("Red parent cannot be the root");
            let p_is_left = self.node(g).left == Some(p);
            let u = if p_is_left { self.node(g).right } else { self.node(g).left };

            if let Some(u) = u.filter(|&u| self.node(u).color.is_red()) {
                trace!("insert fixup: red uncle, recolouring {g:?}");
                self.set_color(p, Color::Black);
                self.set_color(u, Color::Black);
                self.set_color(g, Color::Red);
                c = g;
                continue;
            }

            if p_is_left {
                if self.node(p).right == Some(c) {
                    trace!("insert fixup: left-right zig-zag at {p:?}");
                    self.rotate_left(p);
                    (c, p) = (p, c);
                }

                trace!("insert fixup: left-left line at {g:?}");
                self.rotate_right(g);
            } else {
                if self.node(p).left == Some(c) {
                    trace!("insert fixup: right-left zig-zag at {p:?}");
                    self.rotate_right(p);
                    (c, p) = (p, c);
                }

                trace!("insert fixup: right-right line at {g:?}");
                self.rotate_left(g);
            }

            let (pc, gc) = (self.node(p).color, self.node(g).color);
            self.set_color(p, gc);
            self.set_color(g, pc);
            c = p;
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    // `x` carries an extra black. When `x` is an absent child its parent can't be read from it,
    // so the parent is tracked alongside.
    //
    // x - doubly black position
    // p - parent of x
    // s - sibling of x
    fn fix_after_delete(&mut self, mut x: Option<Handle>, mut parent: Option<Handle>) {
        while x != self.root && !self.is_red(x) {
            let Some(p) = parent else {
                break;
            };

            if self.node(p).left == x {
                let mut s = self.node(p).right.expect("Doubly black node must have sibling");

                if self.node(s).color.is_red() {
                    trace!("delete fixup: red sibling {s:?}, rotating left at {p:?}");
                    self.set_color(s, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_left(p);
                    s = self.node(p).right.expect("Doubly black node must have sibling");
                }

                let (near, far) = (self.node(s).left, self.node(s).right);
                if !self.is_red(near) && !self.is_red(far) {
                    trace!("delete fixup: black sibling {s:?} with black children");
                    self.set_color(s, Color::Red);
                    x = Some(p);
                    parent = self.node(p).parent;
                    continue;
                }

                if !self.is_red(far) {
                    trace!("delete fixup: inner red child under {s:?}");
                    let near = near.expect("Red child cannot be absent");
                    self.set_color(near, Color::Black);
                    self.set_color(s, Color::Red);
                    self.rotate_right(s);
                    s = self.node(p).right.expect("Doubly black node must have sibling");
                }

                trace!("delete fixup: outer red child under {s:?}, rotating left at {p:?}");
                let pc = self.node(p).color;
                self.set_color(s, pc);
                self.set_color(p, Color::Black);
                if let Some(far) = self.node(s).right {
                    self.set_color(far, Color::Black);
                }
                self.rotate_left(p);
            } else {
                let mut s = self.node(p).left.expect("Doubly black node must have sibling");

                if self.node(s).color.is_red() {
                    trace!("delete fixup: red sibling {s:?}, rotating right at {p:?}");
                    self.set_color(s, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_right(p);
                    s = self.node(p).left.expect("Doubly black node must have sibling");
                }

                let (near, far) = (self.node(s).right, self.node(s).left);
                if !self.is_red(near) && !self.is_red(far) {
                    trace!("delete fixup: black sibling {s:?} with black children");
                    self.set_color(s, Color::Red);
                    x = Some(p);
                    parent = self.node(p).parent;
                    continue;
                }

                if !self.is_red(far) {
                    trace!("delete fixup: inner red child under {s:?}");
                    let near = near.expect("Red child cannot be absent");
                    self.set_color(near, Color::Black);
                    self.set_color(s, Color::Red);
                    self.rotate_left(s);
                    s = self.node(p).left.expect("Doubly black node must have sibling");
                }

                trace!("delete fixup: outer red child under {s:?}, rotating right at {p:?}");
                let pc = self.node(p).color;
                self.set_color(s, pc);
                self.set_color(p, Color::Black);
                if let Some(far) = self.node(s).left {
                    self.set_color(far, Color::Black);
                }
                self.rotate_right(p);
            }

            x = self.root;
            parent = None;
        }

        if let Some(x) = x {
            self.set_color(x, Color::Black);
        }
    }
}

impl<T: Key> RedBlackTree<T> {
    fn find_node<Q>(&self, key: &Q) -> Option<Handle>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut n = self.root?;

        loop {
            let nb = self.node(n);
            let next = match key.cmp(nb.key.borrow()) {
                Ordering::Equal => return Some(n),
                Ordering::Less => nb.left,
                Ordering::Greater => nb.right,
            };

            n = next?;
        }
    }

    /// Returns `true` if the tree contains `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).is_some()
    }

    /// Returns a reference to the stored key equal to `key`, if any.
    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).map(|n| &self.node(n).key)
    }

    /// Adds `key` to the tree and rebalances.
    ///
    /// Keys are unique. Returns `false`, leaving the tree untouched and dropping `key`, if an
    /// equal key is already present.
    ///
    /// # Panics
    /// Panics if the tree already holds the maximum number of nodes addressable by its handles
    /// (a little over four billion).
    pub fn insert(&mut self, key: T) -> bool {
        let mut parent = None;
        let mut left = false;
        let mut c = self.root;

        while let Some(n) = c {
            parent = Some(n);
            let nb = self.node(n);
            c = match key.cmp(&nb.key) {
                Ordering::Equal => {
                    debug!("insert: rejected duplicate key");
                    return false;
                }
                Ordering::Less => {
                    left = true;
                    nb.left
                }
                Ordering::Greater => {
                    left = false;
                    nb.right
                }
            };
        }

        let node = self.nodes.alloc(Node::new(key, parent));
        match parent {
            None => self.root = Some(node),
            Some(p) if left => self.node_mut(p).left = Some(node),
            Some(p) => self.node_mut(p).right = Some(node),
        }

        self.fix_after_insert(node);
        true
    }

    /// Removes `key` from the tree and rebalances, returning the stored key if it was present.
    ///
    /// Removing an absent key is a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(z) = self.find_node(key) else {
            debug!("remove: key not present");
            return None;
        };

        let zb = self.node(z);
        let (zl, zr, zp, zc) = (zb.left, zb.right, zb.parent, zb.color);

        // x takes the place of whatever node is physically unlinked, x_parent is where it hangs.
        let (x, x_parent, removed) = match (zl, zr) {
            (None, _) => {
                self.transplant(z, zr);
                (zr, zp, zc)
            }
            (Some(_), None) => {
                self.transplant(z, zl);
                (zl, zp, zc)
            }
            (Some(l), Some(r)) => {
                // Relink the in-order successor into z's position.
                let y = self.minimum(r);
                let yb = self.node(y);
                let (x, yc) = (yb.right, yb.color);

                let x_parent = if y == r {
                    y
                } else {
                    let yp = yb.parent;
                    self.transplant(y, x);
                    self.node_mut(y).right = Some(r);
                    self.node_mut(r).parent = Some(y);
                    yp.expect("Successor below z must have a parent")
                };

                self.transplant(z, Some(y));
                self.node_mut(y).left = Some(l);
                self.node_mut(l).parent = Some(y);
                self.set_color(y, zc);

                (x, Some(x_parent), yc)
            }
        };

        let removed_node = self.nodes.take(z);

        if removed == Color::Black {
            self.fix_after_delete(x, x_parent);
        }

        Some(removed_node.key)
    }

    /// Removes `key` if present, discarding it. See [`remove`](Self::remove).
    pub fn delete<Q>(&mut self, key: &Q)
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        drop(self.remove(key));
    }
}

impl<T: Key> FromIterator<T> for RedBlackTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Key> Extend<T> for RedBlackTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for k in iter {
            self.insert(k);
        }
    }
}

impl<'a, T> IntoIterator for &'a RedBlackTree<T> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for RedBlackTree<T> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.nodes, self.root)
    }
}

#[cfg(test)]
impl<T: Ord + fmt::Display> RedBlackTree<T> {
    #[allow(dead_code)]
    pub(crate) fn pprint(&self) -> String {
        self.inorder()
            .map(|e| format!("{}{}: {:?}\n", "  ".repeat(e.depth()), e.key(), e.color()))
            .collect()
    }

    fn print(&self) -> String {
        match self.root {
            Some(r) => self.print_node(r),
            None => String::new(),
        }
    }

    fn print_node(&self, n: Handle) -> String {
        let nb = self.node(n);
        let left = nb.left.map(|l| self.print_node(l)).unwrap_or_default();
        let right = nb.right.map(|r| self.print_node(r)).unwrap_or_default();
        let c = if nb.color.is_red() { "r" } else { "b" };

        format!("({} {c} {left} {right})", nb.key)
    }

    // Checks every invariant and returns the black-height of the tree.
    fn verify(&self) -> usize {
        match self.root {
            None => {
                assert_eq!(self.nodes.len(), 0);
                0
            }
            Some(root) => {
                let rb = self.node(root);
                assert!(rb.parent.is_none());
                assert_eq!(rb.color, Color::Black);

                let mut count = 0;
                let black_height = self.verify_node(root, None, None, &mut count);
                assert_eq!(count, self.nodes.len());
                black_height
            }
        }
    }

    fn verify_node(
        &self,
        n: Handle,
        lower: Option<&T>,
        upper: Option<&T>,
        count: &mut usize,
    ) -> usize {
        let nb = self.node(n);
        *count += 1;

        if let Some(lower) = lower {
            assert!(lower < &nb.key);
        }
        if let Some(upper) = upper {
            assert!(&nb.key < upper);
        }

        let (l_black, l_red) = match nb.left {
            Some(l) => {
                assert_eq!(self.node(l).parent, Some(n));
                (self.verify_node(l, lower, Some(&nb.key), count), self.node(l).color.is_red())
            }
            None => (0, false),
        };

        let (r_black, r_red) = match nb.right {
            Some(r) => {
                assert_eq!(self.node(r).parent, Some(n));
                (self.verify_node(r, Some(&nb.key), upper, count), self.node(r).color.is_red())
            }
            None => (0, false),
        };

        // red nodes cannot have red children
        assert!(!nb.color.is_red() || !(l_red || r_red));
        assert_eq!(l_black, r_black);

        if nb.color.is_red() { l_black } else { l_black + 1 }
    }
}
