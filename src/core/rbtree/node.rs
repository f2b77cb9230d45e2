// Red-Black tree nodes and insertion balancing
//
// Responsibility: immutable, structurally shared nodes; every change
//                 builds new nodes along the path and shares the rest
//
// legend used in the diagrams: X is a black node, [Y] is a red node,
// {Z} is a double black node

use std::sync::Arc;

use crate::core::rbtree::Weight;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
    /// carries one unit of missing black height during a delete
    DoubleBlack,
    /// an empty subtree carrying one unit of missing black height
    DoubleBlackNil,
}

impl Color {
    pub(crate) fn is_double_black(self) -> bool {
        matches!(self, Color::DoubleBlack | Color::DoubleBlackNil)
    }
}

pub(crate) type Link<V> = Option<Arc<Node<V>>>;

#[derive(Debug, Clone)]
pub(crate) struct Node<V> {
    pub(crate) left: Link<V>,
    pub(crate) right: Link<V>,
    pub(crate) weight: Weight,
    pub(crate) value: V,
    pub(crate) color: Color,
}

pub(crate) fn is_red<V>(link: &Link<V>) -> bool {
    link.as_ref().is_some_and(|n| n.color == Color::Red)
}

pub(crate) fn is_double_black<V>(link: &Link<V>) -> bool {
    link.as_ref().is_some_and(|n| n.color.is_double_black())
}

/// `Some(node)` only if the link holds a red node.
fn red<V>(link: &Link<V>) -> Option<&Arc<Node<V>>> {
    link.as_ref().filter(|n| n.color == Color::Red)
}

impl<V: Clone> Node<V> {
    pub(crate) fn new(left: Link<V>, right: Link<V>, weight: Weight, value: V, color: Color) -> Arc<Self> {
        Arc::new(Self {
            left,
            right,
            weight,
            value,
            color,
        })
    }

    pub(crate) fn leaf(weight: Weight, value: V) -> Arc<Self> {
        Self::new(None, None, weight, value, Color::Red)
    }

    pub(crate) fn with_left(&self, left: Link<V>) -> Arc<Self> {
        Self::new(left, self.right.clone(), self.weight, self.value.clone(), self.color)
    }

    pub(crate) fn with_right(&self, right: Link<V>) -> Arc<Self> {
        Self::new(self.left.clone(), right, self.weight, self.value.clone(), self.color)
    }

    pub(crate) fn with_children(&self, left: Link<V>, right: Link<V>) -> Arc<Self> {
        Self::new(left, right, self.weight, self.value.clone(), self.color)
    }

    pub(crate) fn with_children_and_color(&self, left: Link<V>, right: Link<V>, color: Color) -> Arc<Self> {
        Self::new(left, right, self.weight, self.value.clone(), color)
    }

    pub(crate) fn with_color(&self, color: Color) -> Arc<Self> {
        Self::new(self.left.clone(), self.right.clone(), self.weight, self.value.clone(), color)
    }

    pub(crate) fn with_value(&self, value: V) -> Arc<Self> {
        Self::new(self.left.clone(), self.right.clone(), self.weight, value, self.color)
    }
}

pub(crate) fn get<V>(mut link: &Link<V>, key: Weight) -> Option<&V> {
    while let Some(node) = link {
        if key == node.weight {
            return Some(&node.value);
        }
        link = if key < node.weight { &node.left } else { &node.right };
    }
    None
}

/// Greatest entry whose weight is `<= key`.
pub(crate) fn floor<V>(mut link: &Link<V>, key: Weight) -> Option<(Weight, &V)> {
    let mut best = None;
    while let Some(node) = link {
        if node.weight == key {
            return Some((node.weight, &node.value));
        }
        if node.weight < key {
            best = Some((node.weight, &node.value));
            link = &node.right;
        } else {
            link = &node.left;
        }
    }
    best
}

/// Okasaki balancing, plus the two double-black shapes produced by
/// deletion.
///
/// A black node with a red child that itself has a red child (four
/// shapes) becomes a red node over two black children; black height is
/// unchanged. A double black node over an inner red-red pair becomes a
/// single black node, absorbing the extra unit.
pub(crate) fn balance<V: Clone>(node: Arc<Node<V>>) -> Arc<Node<V>> {
    let z = &node;

    match z.color {
        Color::Black => {
            if let Some(y) = red(&z.left) {
                if let Some(x) = red(&y.left) {
                    //         Z                           |
                    //        / \                  [Y]     |
                    //      [Y]  d                 / \     |
                    //      / \       =====>      X   Z    |
                    //    [X]  c                 / \ / \   |
                    //    / \                   a  b c  d  |
                    //   a   b                             |
                    return y.with_children(
                        Some(x.with_color(Color::Black)),
                        Some(z.with_left(y.right.clone())),
                    );
                }
                if let Some(x) = red(&y.right) {
                    //       Z                           |
                    //      / \                  [X]     |
                    //    [Y]  d                 / \     |
                    //    / \       =====>      Y   Z    |
                    //   a  [X]                / \ / \   |
                    //      / \               a  b c  d  |
                    //     b   c                         |
                    return x.with_children(
                        Some(y.with_children_and_color(y.left.clone(), x.left.clone(), Color::Black)),
                        Some(z.with_left(x.right.clone())),
                    );
                }
            }
            if let Some(y) = red(&z.right) {
                if let Some(x) = red(&y.left) {
                    //      Z                             |
                    //     / \                    [X]     |
                    //    a  [Y]                  / \     |
                    //       / \     =====>      Z   Y    |
                    //     [X]  d               / \ / \   |
                    //     / \                 a  b c  d  |
                    //    b   c                           |
                    return x.with_children(
                        Some(z.with_right(x.left.clone())),
                        Some(y.with_children_and_color(x.right.clone(), y.right.clone(), Color::Black)),
                    );
                }
                if let Some(x) = red(&y.right) {
                    //      Z                               |
                    //     / \                      [Y]     |
                    //    a  [Y]                    / \     |
                    //       / \       =====>      Z   X    |
                    //      b  [X]                / \ / \   |
                    //         / \               a  b c  d  |
                    //        c   d                         |
                    return y.with_children(
                        Some(z.with_right(y.left.clone())),
                        Some(x.with_color(Color::Black)),
                    );
                }
            }
            node
        }
        Color::DoubleBlack => {
            if let Some(y) = red(&z.left) {
                if let Some(x) = red(&y.right) {
                    //      {Z}                          |
                    //      / \                   X      |
                    //    [Y]  d                 / \     |
                    //    / \       =====>      Y   Z    |
                    //   a  [X]                / \ / \   |
                    //      / \               a  b c  d  |
                    //     b   c                         |
                    return x.with_children_and_color(
                        Some(y.with_children_and_color(y.left.clone(), x.left.clone(), Color::Black)),
                        Some(z.with_children_and_color(x.right.clone(), z.right.clone(), Color::Black)),
                        Color::Black,
                    );
                }
            }
            if let Some(y) = red(&z.right) {
                if let Some(x) = red(&y.left) {
                    //     {Z}                            |
                    //     / \                     X      |
                    //    a  [Y]                  / \     |
                    //       / \     =====>      Z   Y    |
                    //     [X]  d               / \ / \   |
                    //     / \                 a  b c  d  |
                    //    b   c                           |
                    return x.with_children_and_color(
                        Some(z.with_children_and_color(z.left.clone(), x.left.clone(), Color::Black)),
                        Some(y.with_children_and_color(x.right.clone(), y.right.clone(), Color::Black)),
                        Color::Black,
                    );
                }
            }
            node
        }
        Color::Red | Color::DoubleBlackNil => node,
    }
}

/// Insert or replace; returns the rebuilt subtree and whether the key was new.
pub(crate) fn insert<V: Clone>(link: &Link<V>, key: Weight, value: V) -> (Arc<Node<V>>, bool) {
    let Some(node) = link else {
        return (Node::leaf(key, value), true);
    };

    if key == node.weight {
        return (node.with_value(value), false);
    }

    if key < node.weight {
        let (left, inserted) = insert(&node.left, key, value);
        let node = node.with_left(Some(left));
        (if inserted { balance(node) } else { node }, inserted)
    } else {
        let (right, inserted) = insert(&node.right, key, value);
        let node = node.with_right(Some(right));
        (if inserted { balance(node) } else { node }, inserted)
    }
}
