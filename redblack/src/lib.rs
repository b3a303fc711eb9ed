#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../../README.md")]

pub use rbtree::{Color, Entry, Inorder, IntoIter, Iter, RedBlackTree};

mod rbtree;

/// The minimum set of traits any key needs to implement for use in a [`RedBlackTree`].
///
/// It is a logic error for a key to be mutated in a way that changes its ordering relative to
/// the other keys while it is stored in a tree.
pub trait Key: Ord {}
impl<T: Ord> Key for T {}
