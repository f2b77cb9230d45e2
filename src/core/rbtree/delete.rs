// Red-Black tree deletion
//
// Responsibility: persistent removal with double-black rebalancing; the
//                 transient colors never leave this module

use std::sync::Arc;

use crate::core::rbtree::node::{balance, is_double_black, is_red, Color, Link, Node};
use crate::core::rbtree::Weight;

/// Remove `key`; returns the rebuilt subtree and whether anything was removed.
///
/// The returned root may be double black; the caller blackens it.
pub(crate) fn remove<V: Clone>(link: &Link<V>, key: Weight) -> (Link<V>, bool) {
    let Some(node) = link else {
        return (None, false);
    };

    if key < node.weight {
        let (left, removed) = remove(&node.left, key);
        if !removed {
            return (link.clone(), false);
        }
        return (Some(rotate(node.with_left(left))), true);
    }

    if key > node.weight {
        let (right, removed) = remove(&node.right, key);
        if !removed {
            return (link.clone(), false);
        }
        return (Some(rotate(node.with_right(right))), true);
    }

    (remove_node(node), true)
}

fn remove_node<V: Clone>(node: &Arc<Node<V>>) -> Link<V> {
    match (&node.left, &node.right) {
        //     [N]                |
        //     / \     ===>  nil  |
        //   nil  nil             |
        (None, None) if node.color == Color::Red => None,

        // a lone black node leaves one unit of black height missing
        (None, None) => Some(node.with_color(Color::DoubleBlackNil)),

        //      P                      |
        //     / \            C        |
        //   [C] nil  ===>   / \       |
        //                 nil nil     |
        (Some(child), None) | (None, Some(child)) => {
            debug_assert!(node.color == Color::Black && child.color == Color::Red);
            Some(child.with_color(Color::Black))
        }

        // two children: pull up the minimum of the right subtree
        (Some(_), Some(right)) => {
            let (weight, value, right) = remove_min(right);
            let replaced = Node::new(node.left.clone(), right, weight, value, node.color);
            Some(rotate(replaced))
        }
    }
}

/// Remove the minimum of a non-empty subtree, returning its entry.
fn remove_min<V: Clone>(node: &Arc<Node<V>>) -> (Weight, V, Link<V>) {
    match (&node.left, &node.right) {
        (None, None) if node.color == Color::Red => (node.weight, node.value.clone(), None),
        (None, None) => (
            node.weight,
            node.value.clone(),
            Some(node.with_color(Color::DoubleBlackNil)),
        ),
        (None, Some(right)) => {
            debug_assert!(is_red(&node.right));
            (node.weight, node.value.clone(), Some(right.with_color(Color::Black)))
        }
        (Some(left), _) => {
            let (weight, value, left) = remove_min(left);
            (weight, value, Some(rotate(node.with_left(left))))
        }
    }
}

/// Turn a double black link back into a single black one.
///
/// The node is recolored in place when the rebalance holds the only
/// reference, and copied otherwise; a published node is never touched.
pub(crate) fn to_single_black<V: Clone>(link: Link<V>) -> Link<V> {
    let mut node = link?;
    match node.color {
        Color::DoubleBlackNil => None,
        Color::DoubleBlack => {
            Arc::make_mut(&mut node).color = Color::Black;
            Some(node)
        }
        color => {
            debug_assert!(false, "to_single_black on {:?} node", color);
            Some(node)
        }
    }
}

/// Deletion-side rebalance: resolve a double black child of `node`.
///
/// Returns an ordinary subtree, or a double black one when the deficit has
/// to move further up.
pub(crate) fn rotate<V: Clone>(node: Arc<Node<V>>) -> Arc<Node<V>> {
    if !is_double_black(&node.left) && !is_double_black(&node.right) {
        return node;
    }

    //      Y      |
    //     / \     |
    //    X   Z    |
    //   / \ / \   |
    //  a  b c  d  |
    let Node {
        left,
        right,
        weight,
        value,
        color,
    } = Arc::unwrap_or_clone(node);

    match (color, left, right) {
        (Color::Red, Some(x), Some(z)) if x.color.is_double_black() => {
            //                           Z    |
            //     [Y]                  / \   |
            //     / \      ====>     [Y]  d  |
            //   {X}  Z               / \     |
            //   / \ / \             X   c    |
            //  a  b c  d           / \       |
            //                     a   b      |
            debug_assert!(z.color == Color::Black);
            let y = Node::new(to_single_black(Some(x)), z.left.clone(), weight, value, Color::Red);
            balance(z.with_left(Some(y)))
        }
        (Color::Red, Some(x), Some(z)) if z.color.is_double_black() => {
            //                         X        |
            //     [Y]                / \       |
            //     / \       ====>   a  [Y]     |
            //    X  {Z}                / \     |
            //   / \ / \               b   Z    |
            //  a  b c  d                 / \   |
            //                           c   d  |
            debug_assert!(x.color == Color::Black);
            let y = Node::new(x.right.clone(), to_single_black(Some(z)), weight, value, Color::Red);
            balance(x.with_right(Some(y)))
        }
        (Color::Black, Some(x), Some(z)) if x.color.is_double_black() && z.color == Color::Black => {
            //                            {Z}   |
            //      Y                     / \   |
            //     / \       ====>      [Y]  d  |
            //   {X}  Z                 / \     |
            //   / \ / \               X   c    |
            //  a  b c  d             / \       |
            //                       a   b      |
            let y = Node::new(to_single_black(Some(x)), z.left.clone(), weight, value, Color::Red);
            balance(z.with_children_and_color(Some(y), z.right.clone(), Color::DoubleBlack))
        }
        (Color::Black, Some(x), Some(z)) if x.color == Color::Black && z.color.is_double_black() => {
            //                        {X}       |
            //      Y                 / \       |
            //     / \        ====>  a  [Y]     |
            //    X  {Z}                / \     |
            //   / \ / \               b   Z    |
            //  a  b c  d                 / \   |
            //                           c   d  |
            let y = Node::new(x.right.clone(), to_single_black(Some(z)), weight, value, Color::Red);
            balance(x.with_children_and_color(x.left.clone(), Some(y), Color::DoubleBlack))
        }
        (Color::Black, Some(x), Some(z))
            if x.color.is_double_black() && z.color == Color::Red =>
        {
            //                             Z    |
            //      Y                     / \   |
            //     / \                   C   d  |
            //   {X} [Z]                / \     |
            //   / \ / \      ====>   [Y]  f    |
            //  a  b C  d             / \       |
            //      / \              X   e      |
            //     e   f            / \         |
            //                     a   b        |
            let Some(c) = z.left.clone() else {
                return Node::new(Some(x), Some(z), weight, value, color);
            };
            let y = Node::new(to_single_black(Some(x)), c.left.clone(), weight, value, Color::Red);
            let c = c.with_children_and_color(Some(y), c.right.clone(), Color::Black);
            z.with_children_and_color(Some(balance(c)), z.right.clone(), Color::Black)
        }
        (Color::Black, Some(x), Some(z))
            if x.color == Color::Red && z.color.is_double_black() =>
        {
            //                          X          |
            //      Y                  / \         |
            //     / \                a   B        |
            //   [X] {Z}                 / \       |
            //   / \ / \      ====>     e  [Y]     |
            //  a  B c  d                  / \     |
            //    / \                     f   Z    |
            //   e   f                       / \   |
            //                              c   d  |
            let Some(b) = x.right.clone() else {
                return Node::new(Some(x), Some(z), weight, value, color);
            };
            let y = Node::new(b.right.clone(), to_single_black(Some(z)), weight, value, Color::Red);
            let b = balance(b.with_children_and_color(b.left.clone(), Some(y), Color::Black));
            x.with_children_and_color(x.left.clone(), Some(b), Color::Black)
        }
        (color, left, right) => Node::new(left, right, weight, value, color),
    }
}
