//! Storage layer for SuperSearch
//!
//! This crate implements the index structures and their on-disk format:
//! - OrderedIndexMap: AVL-balanced ordered map from string keys to values
//! - PostingList: path-ordered set of shared documents with merge set algebra
//! - codec: escaped, length-prefixed line encoding used by index files

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod avl;
pub mod codec;
pub mod posting;

pub use avl::{Iter, LoadStats, OrderedIndexMap};
pub use codec::{CodecError, IndexValue};
pub use posting::{difference_sorted, intersect_sorted, PostingList};
