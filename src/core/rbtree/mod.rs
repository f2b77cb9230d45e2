// Persistent Red-Black tree
//
// Responsibility: an immutable ordered map keyed by a 64-bit weight;
//                 every update returns a new version and leaves all
//                 earlier versions valid and independently readable

mod delete;
mod node;

use std::sync::Arc;

use self::node::{Color, Link, Node};

/// Sort key of the tree.
pub type Weight = u64;

/// Persistent (copy-on-write) Red-Black tree.
///
/// Cloning is O(1) and yields an independent version handle. Nodes are
/// never mutated after they are reachable from a returned tree, so any
/// number of versions can be read concurrently without locking.
#[derive(Debug)]
pub struct RBTree<V> {
    root: Link<V>,
    len: usize,
}

impl<V> Clone for RBTree<V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<V> Default for RBTree<V> {
    fn default() -> Self {
        Self { root: None, len: 0 }
    }
}

impl<V: Clone> RBTree<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, key: Weight) -> Option<&V> {
        node::get(&self.root, key)
    }

    /// Greatest entry with weight `<= key`.
    pub fn floor(&self, key: Weight) -> Option<(Weight, &V)> {
        node::floor(&self.root, key)
    }

    /// New version with `key` mapped to `value`, and whether `key` was new.
    ///
    /// An existing key only has its payload replaced.
    pub fn insert(&self, key: Weight, value: V) -> (Self, bool) {
        let (root, inserted) = node::insert(&self.root, key, value);
        let tree = Self {
            root: blacken(Some(root)),
            len: self.len + usize::from(inserted),
        };
        (tree, inserted)
    }

    /// New version without `key`, and whether it was present.
    ///
    /// An absent key returns this same version.
    pub fn delete(&self, key: Weight) -> (Self, bool) {
        let (root, removed) = delete::remove(&self.root, key);
        if !removed {
            return (self.clone(), false);
        }
        let tree = Self {
            root: blacken(root),
            len: self.len - 1,
        };
        (tree, true)
    }

    /// New version with `delta` added to every weight `>= from`.
    ///
    /// Only the shifted nodes and their ancestors are copied; shape and
    /// colors are kept, so the result stays balanced.
    ///
    /// # Panics
    ///
    /// If the shift would move a key below a key that is not shifted, or
    /// outside the weight range.
    pub fn shift_from(&self, from: Weight, delta: i64) -> Self {
        if delta == 0 {
            return self.clone();
        }
        if delta < 0 {
            if let Some((first, _)) = self.range_from(from).next() {
                let shifted = shift_weight(first, delta);
                let below = from.checked_sub(1).and_then(|k| self.floor(k));
                if let Some((prev, _)) = below {
                    assert!(
                        shifted > prev,
                        "shift by {} moves key {} onto or below {}",
                        delta,
                        first,
                        prev
                    );
                }
            }
        }

        Self {
            root: shift_subtree(&self.root, from, delta),
            len: self.len,
        }
    }

    /// In-order entries.
    pub fn iter(&self) -> Iter<'_, V> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(&self.root);
        iter
    }

    /// In-order entries with weight `>= key`.
    pub fn range_from(&self, key: Weight) -> Iter<'_, V> {
        let mut stack = Vec::new();
        let mut link = &self.root;
        while let Some(node) = link {
            if node.weight >= key {
                stack.push(node.as_ref());
                link = &node.left;
            } else {
                link = &node.right;
            }
        }
        Iter { stack }
    }

    /// Whether two handles denote the very same version.
    pub fn same_version(a: &Self, b: &Self) -> bool {
        match (&a.root, &b.root) {
            (Some(x), Some(y)) => Arc::ptr_eq(x, y),
            (None, None) => true,
            _ => false,
        }
    }

    /// Check every Red-Black invariant plus key ordering.
    pub fn is_valid(&self) -> bool {
        if let Some(root) = &self.root {
            if root.color != Color::Black {
                return false;
            }
        }
        check_colors(&self.root)
            && black_height(&self.root) != -1
            && is_ordered(&self.root, None, None)
            && self.iter().count() == self.len
    }
}

/// Force the root black; drop a double black empty root.
fn blacken<V: Clone>(root: Link<V>) -> Link<V> {
    let root = root?;
    match root.color {
        Color::Black => Some(root),
        Color::DoubleBlackNil => None,
        Color::Red | Color::DoubleBlack => Some(root.with_color(Color::Black)),
    }
}

fn shift_weight(weight: Weight, delta: i64) -> Weight {
    weight
        .checked_add_signed(delta)
        .unwrap_or_else(|| panic!("weight {} shifted by {} overflows", weight, delta))
}

fn shift_subtree<V: Clone>(link: &Link<V>, from: Weight, delta: i64) -> Link<V> {
    let node = link.as_ref()?;
    if node.weight >= from {
        let left = shift_subtree(&node.left, from, delta);
        let right = shift_all(&node.right, delta);
        Some(Node::new(
            left,
            right,
            shift_weight(node.weight, delta),
            node.value.clone(),
            node.color,
        ))
    } else {
        Some(node.with_right(shift_subtree(&node.right, from, delta)))
    }
}

fn shift_all<V: Clone>(link: &Link<V>, delta: i64) -> Link<V> {
    let node = link.as_ref()?;
    Some(Node::new(
        shift_all(&node.left, delta),
        shift_all(&node.right, delta),
        shift_weight(node.weight, delta),
        node.value.clone(),
        node.color,
    ))
}

fn check_colors<V>(link: &Link<V>) -> bool {
    let Some(node) = link else {
        return true;
    };
    match node.color {
        Color::Red => {
            if node::is_red(&node.left) || node::is_red(&node.right) {
                return false;
            }
        }
        Color::Black => {}
        Color::DoubleBlack | Color::DoubleBlackNil => return false,
    }
    check_colors(&node.left) && check_colors(&node.right)
}

/// Black height of a subtree, or -1 when the two sides disagree anywhere.
fn black_height<V>(link: &Link<V>) -> i32 {
    let Some(node) = link else {
        return 1;
    };

    let left = black_height(&node.left);
    if left == -1 {
        return -1;
    }
    let right = black_height(&node.right);
    if right == -1 || left != right {
        return -1;
    }

    left + i32::from(node.color == Color::Black)
}

fn is_ordered<V>(link: &Link<V>, low: Option<Weight>, high: Option<Weight>) -> bool {
    let Some(node) = link else {
        return true;
    };
    if low.is_some_and(|low| node.weight <= low) || high.is_some_and(|high| node.weight >= high) {
        return false;
    }
    is_ordered(&node.left, low, Some(node.weight)) && is_ordered(&node.right, Some(node.weight), high)
}

/// In-order iterator over `(weight, &value)`.
pub struct Iter<'a, V> {
    stack: Vec<&'a Node<V>>,
}

impl<'a, V> Iter<'a, V> {
    fn push_left(&mut self, mut link: &'a Link<V>) {
        while let Some(node) = link {
            self.stack.push(node.as_ref());
            link = &node.left;
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Weight, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(&node.right);
        Some((node.weight, &node.value))
    }
}

impl<'a, V: Clone> IntoIterator for &'a RBTree<V> {
    type Item = (Weight, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
