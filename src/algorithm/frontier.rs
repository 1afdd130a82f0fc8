use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use crate::common::{LowLevelNode, SearchKey};

// f cost, then the deeper node first, then the key itself.
type OrderKey = (usize, Reverse<usize>, SearchKey);

/// Open list of the time-expanded search, indexed by search key.
#[derive(Debug, Default)]
pub(crate) struct Frontier {
    order: BTreeSet<OrderKey>,
    nodes: HashMap<SearchKey, LowLevelNode>,
}

fn order_key(node: &LowLevelNode) -> OrderKey {
    (node.f_cost(), Reverse(node.g_cost), node.key())
}

impl Frontier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts `node`, dropping any entry with the same key.
    pub(crate) fn push(&mut self, node: LowLevelNode) {
        let key = node.key();
        if let Some(old) = self.nodes.remove(&key) {
            self.order.remove(&order_key(&old));
        }
        self.order.insert(order_key(&node));
        self.nodes.insert(key, node);
    }

    pub(crate) fn pop(&mut self) -> Option<LowLevelNode> {
        let (_, _, key) = self.order.pop_first()?;
        self.nodes.remove(&key)
    }

    pub(crate) fn contains(&self, key: &SearchKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Swaps in `node` if the entry with its key has a larger f cost.
    pub(crate) fn replace_if_more_expensive(&mut self, node: LowLevelNode) -> bool {
        match self.nodes.get(&node.key()) {
            Some(old) if old.f_cost() > node.f_cost() => {
                self.push(node);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Point;

    fn node(row: i32, col: i32, h_cost: usize) -> LowLevelNode {
        LowLevelNode::root(Point::new(row, col), h_cost)
    }

    #[test]
    fn test_push_and_pop() {
        let mut frontier = Frontier::new();
        assert!(frontier.is_empty());
        let root = node(1, 0, 7);
        frontier.push(root.clone());
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier.pop(), Some(root));
        assert!(frontier.is_empty());
        assert_eq!(frontier.pop(), None);
    }

    #[test]
    fn test_pop_smallest_f() {
        let mut frontier = Frontier::new();
        let a = node(1, 0, 7);
        let b = node(1, 1, 6);
        let c = node(1, 2, 5);
        frontier.push(a.clone());
        frontier.push(c.clone());
        frontier.push(b.clone());

        assert_eq!(frontier.pop(), Some(c.clone()));
        assert!(!frontier.contains(&c.key()));
        assert!(frontier.contains(&a.key()));
        assert_eq!(frontier.pop(), Some(b));
        assert_eq!(frontier.pop(), Some(a));
    }

    #[test]
    fn test_ties_prefer_deeper_nodes() {
        let mut frontier = Frontier::new();
        let shallow = node(0, 0, 4);
        let deep = node(0, 0, 3).child(Point::new(0, 1), 3);
        assert_eq!(shallow.f_cost(), deep.f_cost());
        frontier.push(shallow);
        frontier.push(deep.clone());
        assert_eq!(frontier.pop(), Some(deep));
    }

    #[test]
    fn test_replace_if_more_expensive() {
        let mut frontier = Frontier::new();
        let expensive = node(1, 0, 7);
        frontier.push(expensive.clone());

        // Same key but cheaper.
        let mut cheaper = expensive.clone();
        cheaper.h_cost = 5;
        assert!(frontier.replace_if_more_expensive(cheaper.clone()));
        assert_eq!(frontier.len(), 1);

        // Not cheaper anymore.
        let mut same = cheaper.clone();
        same.h_cost = 5;
        assert!(!frontier.replace_if_more_expensive(same));

        // Unknown key.
        assert!(!frontier.replace_if_more_expensive(node(1, 1, 0)));
        assert!(!frontier.contains(&node(1, 1, 0).key()));

        assert_eq!(frontier.pop(), Some(cheaper));
        assert!(frontier.is_empty());
    }
}
