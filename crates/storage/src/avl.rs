//! Ordered index map backed by an AVL tree
//!
//! `OrderedIndexMap<V>` maps string keys to values and keeps the keys sorted.
//! It is the structure behind the term, organization and person indices.
//!
//! # Invariants
//!
//! - In-order traversal yields strictly ascending keys with no duplicates;
//!   inserting an existing key overwrites its value.
//! - For every node, the heights of its subtrees differ by at most one
//!   (leaf height 1, empty height 0).
//!
//! # Persistence
//!
//! `save_to_file` writes one `<escaped key>;<value>` line per key in key
//! order. `load_from_file` parses into a fresh tree and replaces `self` only
//! after the whole file was read, so a failed open or read leaves the map
//! untouched. Lines that cannot be decoded are skipped and counted.

use crate::codec::{escape, unescape, IndexValue};
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use supersearch_core::{Error, Result};
use tracing::{debug, warn};

type Link<V> = Option<Box<Node<V>>>;

#[derive(Debug, Clone)]
struct Node<V> {
    key: String,
    value: V,
    left: Link<V>,
    right: Link<V>,
    height: i32,
}

impl<V> Node<V> {
    fn leaf(key: &str, value: V) -> Box<Self> {
        Box::new(Node {
            key: key.to_owned(),
            value,
            left: None,
            right: None,
            height: 1,
        })
    }
}

fn height<V>(link: &Link<V>) -> i32 {
    link.as_ref().map_or(0, |n| n.height)
}

fn update_height<V>(node: &mut Node<V>) {
    node.height = 1 + height(&node.left).max(height(&node.right));
}

fn balance_factor<V>(node: &Node<V>) -> i32 {
    height(&node.left) - height(&node.right)
}

fn rotate_right<V>(mut y: Box<Node<V>>) -> Box<Node<V>> {
    let Some(mut x) = y.left.take() else {
        return y;
    };
    y.left = x.right.take();
    update_height(&mut y);
    x.right = Some(y);
    update_height(&mut x);
    x
}

fn rotate_left<V>(mut x: Box<Node<V>>) -> Box<Node<V>> {
    let Some(mut y) = x.right.take() else {
        return x;
    };
    x.right = y.left.take();
    update_height(&mut x);
    y.left = Some(x);
    update_height(&mut y);
    y
}

/// Recursive AVL insertion; returns the new subtree root.
fn insert_node<V>(link: Link<V>, key: &str, value: V, replaced: &mut Option<V>) -> Box<Node<V>> {
    let mut node = match link {
        None => return Node::leaf(key, value),
        Some(node) => node,
    };

    match key.cmp(node.key.as_str()) {
        Ordering::Less => node.left = Some(insert_node(node.left.take(), key, value, replaced)),
        Ordering::Greater => node.right = Some(insert_node(node.right.take(), key, value, replaced)),
        Ordering::Equal => {
            *replaced = Some(std::mem::replace(&mut node.value, value));
            return node;
        }
    }

    update_height(&mut node);
    let balance = balance_factor(&node);

    if balance > 1 {
        // Left-right: rotate the child first, then fall through to left-left
        if let Some(left) = node.left.take() {
            node.left = Some(if key > left.key.as_str() {
                rotate_left(left)
            } else {
                left
            });
        }
        return rotate_right(node);
    }

    if balance < -1 {
        // Right-left: rotate the child first, then fall through to right-right
        if let Some(right) = node.right.take() {
            node.right = Some(if key < right.key.as_str() {
                rotate_right(right)
            } else {
                right
            });
        }
        return rotate_left(node);
    }

    node
}

/// Counts from a `load_from_file` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Lines decoded and inserted
    pub loaded: usize,
    /// Lines skipped because they could not be decoded
    pub skipped: usize,
}

/// Ordered map from string keys to values, balanced as an AVL tree
#[derive(Debug, Clone)]
pub struct OrderedIndexMap<V> {
    root: Link<V>,
    len: usize,
}

impl<V> Default for OrderedIndexMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> OrderedIndexMap<V> {
    /// Create an empty map
    pub fn new() -> Self {
        OrderedIndexMap { root: None, len: 0 }
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the map has no keys
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree (0 when empty)
    pub fn height(&self) -> usize {
        height(&self.root) as usize
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Insert `value` under `key`, overwriting any existing value.
    ///
    /// Returns the previous value if the key was already present.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let mut replaced = None;
        self.root = Some(insert_node(self.root.take(), key, value, &mut replaced));
        if replaced.is_none() {
            self.len += 1;
        }
        replaced
    }

    /// Look up the value for `key`.
    ///
    /// Returns `None` when the key is absent, which is distinct from a key
    /// whose value is empty.
    pub fn find(&self, key: &str) -> Option<&V> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(node.key.as_str()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    /// Mutable lookup; the key order cannot change through it.
    pub fn find_mut(&mut self, key: &str) -> Option<&mut V> {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            match key.cmp(node.key.as_str()) {
                Ordering::Less => current = node.left.as_deref_mut(),
                Ordering::Greater => current = node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
            }
        }
        None
    }

    /// Check if `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// In-order iterator over `(key, value)`
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.root)
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }

    /// Visit every value mutably, in key order.
    pub fn for_each_value_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut V),
    {
        fn walk<V, F: FnMut(&str, &mut V)>(link: &mut Link<V>, f: &mut F) {
            if let Some(node) = link {
                walk(&mut node.left, f);
                f(&node.key, &mut node.value);
                walk(&mut node.right, f);
            }
        }
        walk(&mut self.root, &mut f);
    }
}

impl<V: IndexValue> OrderedIndexMap<V> {
    /// Write every entry as one line, in key order.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut line = String::new();
        let mut written = 0;
        for (key, value) in self.iter() {
            line.clear();
            line.push_str(&escape(key));
            line.push(';');
            value.encode_value(&mut line);
            line.push('\n');
            writer.write_all(line.as_bytes())?;
            written += 1;
        }
        Ok(written)
    }

    /// Parse lines into a new map.
    ///
    /// Undecodable lines, including lines that are not valid UTF-8, are
    /// skipped; only I/O failures are errors.
    pub fn read_from<R: BufRead>(mut reader: R) -> Result<(Self, LoadStats)> {
        let mut map = OrderedIndexMap::new();
        let mut stats = LoadStats::default();
        let mut buf = Vec::new();
        let mut line_no = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;
            let raw = trim_line_end(&buf);

            let line = match std::str::from_utf8(raw) {
                Ok(line) => line,
                Err(e) => {
                    stats.skipped += 1;
                    let err = Error::corruption(line_no, e.to_string());
                    debug!(error = %err, "Skipping index line");
                    continue;
                }
            };
            let Some((raw_key, raw_value)) = line.split_once(';') else {
                if !line.is_empty() {
                    stats.skipped += 1;
                    let err = Error::corruption(line_no, "missing ';' separator");
                    debug!(error = %err, "Skipping index line");
                }
                continue;
            };
            let decoded = unescape(raw_key)
                .and_then(|key| V::decode_value(raw_value).map(|value| (key, value)));
            match decoded {
                Ok((key, value)) => {
                    map.insert(&key, value);
                    stats.loaded += 1;
                }
                Err(e) => {
                    stats.skipped += 1;
                    let err = Error::corruption(line_no, e.to_string());
                    debug!(error = %err, "Skipping index line");
                }
            }
        }

        Ok((map, stats))
    }

    /// Save the map to `path`, one line per key.
    ///
    /// Not atomic: a crash mid-write leaves a truncated file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        let written = self.write_to(&mut writer)?;
        writer.flush()?;
        debug!(path = %path.display(), entries = written, "Saved index file");
        Ok(written)
    }

    /// Replace the contents of this map with the entries stored at `path`.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<LoadStats> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let (map, stats) = Self::read_from(BufReader::new(file))?;
        if stats.skipped > 0 {
            warn!(
                path = %path.display(),
                skipped = stats.skipped,
                "Skipped malformed index lines"
            );
        }
        *self = map;
        Ok(stats)
    }
}

/// Strip a trailing `\n` or `\r\n`.
fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// In-order iterator over an [`OrderedIndexMap`]
pub struct Iter<'a, V> {
    stack: Vec<&'a Node<V>>,
}

impl<'a, V> Iter<'a, V> {
    fn new(root: &'a Link<V>) -> Self {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(root.as_deref());
        iter
    }

    fn push_left(&mut self, mut node: Option<&'a Node<V>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some((node.key.as_str(), &node.value))
    }
}
