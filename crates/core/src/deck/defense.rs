//! Inner AVL level: one tree per band, ordered by `(defense, order)`.
//! All band trees share a single arena so rotations only reassign slot ids.
//! This module does not know about offense; bands are stitched together by `offense.rs`.

use std::cmp::Ordering;
use std::mem;

use slotmap::SlotMap;

use crate::card::Card;
use crate::types::SlotId;

#[derive(Debug)]
pub(crate) struct SlotNode {
    pub(crate) card: Card,
    pub(crate) left: Option<SlotId>,
    pub(crate) right: Option<SlotId>,
    pub(crate) height: u32,
    pub(crate) min_defense: i32,
    pub(crate) max_defense: i32,
    pub(crate) size: usize,
}

impl SlotNode {
    fn leaf(card: Card) -> Self {
        let defense = card.defense;
        Self {
            card,
            left: None,
            right: None,
            height: 1,
            min_defense: defense,
            max_defense: defense,
            size: 1,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct DefenseForest {
    pub(crate) nodes: SlotMap<SlotId, SlotNode>,
}

impl DefenseForest {
    pub(crate) fn height(&self, node: Option<SlotId>) -> u32 {
        node.map_or(0, |id| self.nodes[id].height)
    }

    pub(crate) fn size(&self, node: Option<SlotId>) -> usize {
        node.map_or(0, |id| self.nodes[id].size)
    }

    /// `(min, max)` defense of the tree rooted at `node`, if any.
    pub(crate) fn defense_range(&self, node: Option<SlotId>) -> Option<(i32, i32)> {
        node.map(|id| (self.nodes[id].min_defense, self.nodes[id].max_defense))
    }

    fn update(&mut self, id: SlotId) {
        let node = &self.nodes[id];
        let (left, right) = (node.left, node.right);
        let mut min_defense = node.card.defense;
        let mut max_defense = node.card.defense;
        let mut size = 1;
        for child in [left, right].into_iter().flatten() {
            let child = &self.nodes[child];
            min_defense = min_defense.min(child.min_defense);
            max_defense = max_defense.max(child.max_defense);
            size += child.size;
        }
        let height = 1 + self.height(left).max(self.height(right));

        let node = &mut self.nodes[id];
        node.height = height;
        node.min_defense = min_defense;
        node.max_defense = max_defense;
        node.size = size;
    }

    fn balance_factor(&self, id: SlotId) -> i64 {
        let node = &self.nodes[id];
        i64::from(self.height(node.left)) - i64::from(self.height(node.right))
    }

    fn rotate_right(&mut self, y: SlotId) -> SlotId {
        let Some(x) = self.nodes[y].left else {
            return y;
        };
        self.nodes[y].left = self.nodes[x].right;
        self.nodes[x].right = Some(y);
        self.update(y);
        self.update(x);
        x
    }

    fn rotate_left(&mut self, x: SlotId) -> SlotId {
        let Some(y) = self.nodes[x].right else {
            return x;
        };
        self.nodes[x].right = self.nodes[y].left;
        self.nodes[y].left = Some(x);
        self.update(x);
        self.update(y);
        y
    }

    fn rebalance(&mut self, id: SlotId) -> SlotId {
        let balance = self.balance_factor(id);
        if balance > 1 {
            if let Some(left) = self.nodes[id].left
                && self.balance_factor(left) < 0
            {
                let rotated = self.rotate_left(left);
                self.nodes[id].left = Some(rotated);
            }
            return self.rotate_right(id);
        }
        if balance < -1 {
            if let Some(right) = self.nodes[id].right
                && self.balance_factor(right) > 0
            {
                let rotated = self.rotate_right(right);
                self.nodes[id].right = Some(rotated);
            }
            return self.rotate_left(id);
        }
        id
    }

    /// Inserts `card` below `node` and returns the new subtree root.
    pub(crate) fn insert(&mut self, node: Option<SlotId>, card: Card) -> SlotId {
        let Some(id) = node else {
            return self.nodes.insert(SlotNode::leaf(card));
        };
        if card.rank() < self.nodes[id].card.rank() {
            let child = self.insert(self.nodes[id].left, card);
            self.nodes[id].left = Some(child);
        } else {
            let child = self.insert(self.nodes[id].right, card);
            self.nodes[id].right = Some(child);
        }
        self.update(id);
        self.rebalance(id)
    }

    /// Removes the card ranked `rank` below `node`.
    ///
    /// Returns the new subtree root and the removed card. A node with two
    /// children takes over its in-order successor's card; the successor slot
    /// is then removed from the right subtree.
    pub(crate) fn remove(
        &mut self,
        node: Option<SlotId>,
        rank: (i32, u64),
    ) -> (Option<SlotId>, Option<Card>) {
        let Some(id) = node else {
            return (None, None);
        };
        let removed = match rank.cmp(&self.nodes[id].card.rank()) {
            Ordering::Less => {
                let (child, removed) = self.remove(self.nodes[id].left, rank);
                self.nodes[id].left = child;
                removed
            }
            Ordering::Greater => {
                let (child, removed) = self.remove(self.nodes[id].right, rank);
                self.nodes[id].right = child;
                removed
            }
            Ordering::Equal => {
                let (left, right) = (self.nodes[id].left, self.nodes[id].right);
                let (Some(_), Some(right)) = (left, right) else {
                    let removed = self.nodes.remove(id).map(|node| node.card);
                    return (left.or(right), removed);
                };
                let successor = self.nodes[self.leftmost(right)].card.rank();
                let (child, successor) = self.remove(Some(right), successor);
                self.nodes[id].right = child;
                successor.map(|card| mem::replace(&mut self.nodes[id].card, card))
            }
        };
        self.update(id);
        (Some(self.rebalance(id)), removed)
    }

    pub(crate) fn leftmost(&self, mut id: SlotId) -> SlotId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    /// Smallest `(defense, order)` card of the tree.
    pub(crate) fn first(&self, node: Option<SlotId>) -> Option<&Card> {
        node.map(|id| &self.nodes[self.leftmost(id)].card)
    }

    /// Smallest `(defense, order)` card whose defense is strictly above `floor`.
    pub(crate) fn first_above(&self, node: Option<SlotId>, floor: i32) -> Option<&Card> {
        let mut best = None;
        let mut cursor = node;
        while let Some(id) = cursor {
            let slot = &self.nodes[id];
            if slot.card.defense > floor {
                best = Some(&slot.card);
                cursor = slot.left;
            } else {
                cursor = slot.right;
            }
        }
        best
    }

    pub(crate) fn get(&self, node: Option<SlotId>, rank: (i32, u64)) -> Option<&Card> {
        let mut cursor = node;
        while let Some(id) = cursor {
            let slot = &self.nodes[id];
            cursor = match rank.cmp(&slot.card.rank()) {
                Ordering::Less => slot.left,
                Ordering::Greater => slot.right,
                Ordering::Equal => return Some(&slot.card),
            };
        }
        None
    }

    pub(crate) fn collect_in_order<'a>(&'a self, node: Option<SlotId>, out: &mut Vec<&'a Card>) {
        let Some(id) = node else {
            return;
        };
        let slot = &self.nodes[id];
        self.collect_in_order(slot.left, out);
        out.push(&slot.card);
        self.collect_in_order(slot.right, out);
    }

    /// Counts nodes by walking links, ignoring the cached sizes.
    pub(crate) fn count_reachable(&self, node: Option<SlotId>) -> usize {
        node.map_or(0, |id| {
            let slot = &self.nodes[id];
            1 + self.count_reachable(slot.left) + self.count_reachable(slot.right)
        })
    }
}
