//! Outer AVL level: one node per distinct offense value ("band").
//! Each band owns the root of its defense tree and caches defense/offense
//! ranges for itself and its whole subtree, which the searches prune on.

use std::cmp::Ordering;

use slotmap::SlotMap;
use tracing::debug;

use super::defense::DefenseForest;
use crate::card::Card;
use crate::types::{BandId, CardKey, SlotId};

#[derive(Debug)]
pub(crate) struct BandNode {
    pub(crate) offense: i32,
    pub(crate) band: Option<SlotId>,
    pub(crate) left: Option<BandId>,
    pub(crate) right: Option<BandId>,
    pub(crate) height: u32,
    pub(crate) band_min_defense: i32,
    pub(crate) band_max_defense: i32,
    pub(crate) min_defense: i32,
    pub(crate) max_defense: i32,
    pub(crate) min_offense: i32,
    pub(crate) max_offense: i32,
    pub(crate) size: usize,
}

impl BandNode {
    fn new(offense: i32, band: SlotId) -> Self {
        Self {
            offense,
            band: Some(band),
            left: None,
            right: None,
            height: 1,
            band_min_defense: i32::MAX,
            band_max_defense: i32::MIN,
            min_defense: i32::MAX,
            max_defense: i32::MIN,
            min_offense: offense,
            max_offense: offense,
            size: 0,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct OffenseTree {
    pub(crate) nodes: SlotMap<BandId, BandNode>,
    pub(crate) root: Option<BandId>,
}

impl OffenseTree {
    pub(crate) fn height(&self, node: Option<BandId>) -> u32 {
        node.map_or(0, |id| self.nodes[id].height)
    }

    /// Recomputes the cached summaries of `id` from its band and children.
    fn update(&mut self, id: BandId, slots: &DefenseForest) {
        let node = &self.nodes[id];
        let (left, right) = (node.left, node.right);
        let (band_min_defense, band_max_defense) =
            slots.defense_range(node.band).unwrap_or((i32::MAX, i32::MIN));
        let mut min_defense = band_min_defense;
        let mut max_defense = band_max_defense;
        let mut min_offense = node.offense;
        let mut max_offense = node.offense;
        let mut size = slots.size(node.band);
        for child in [left, right].into_iter().flatten() {
            let child = &self.nodes[child];
            min_defense = min_defense.min(child.min_defense);
            max_defense = max_defense.max(child.max_defense);
            min_offense = min_offense.min(child.min_offense);
            max_offense = max_offense.max(child.max_offense);
            size += child.size;
        }
        let height = 1 + self.height(left).max(self.height(right));

        let node = &mut self.nodes[id];
        node.height = height;
        node.band_min_defense = band_min_defense;
        node.band_max_defense = band_max_defense;
        node.min_defense = min_defense;
        node.max_defense = max_defense;
        node.min_offense = min_offense;
        node.max_offense = max_offense;
        node.size = size;
    }

    fn balance_factor(&self, id: BandId) -> i64 {
        let node = &self.nodes[id];
        i64::from(self.height(node.left)) - i64::from(self.height(node.right))
    }

    fn rotate_right(&mut self, y: BandId, slots: &DefenseForest) -> BandId {
        let Some(x) = self.nodes[y].left else {
            return y;
        };
        self.nodes[y].left = self.nodes[x].right;
        self.nodes[x].right = Some(y);
        self.update(y, slots);
        self.update(x, slots);
        x
    }

    fn rotate_left(&mut self, x: BandId, slots: &DefenseForest) -> BandId {
        let Some(y) = self.nodes[x].right else {
            return x;
        };
        self.nodes[x].right = self.nodes[y].left;
        self.nodes[y].left = Some(x);
        self.update(x, slots);
        self.update(y, slots);
        y
    }

    fn rebalance(&mut self, id: BandId, slots: &DefenseForest) -> BandId {
        let balance = self.balance_factor(id);
        if balance > 1 {
            if let Some(left) = self.nodes[id].left
                && self.balance_factor(left) < 0
            {
                let rotated = self.rotate_left(left, slots);
                self.nodes[id].left = Some(rotated);
            }
            return self.rotate_right(id, slots);
        }
        if balance < -1 {
            if let Some(right) = self.nodes[id].right
                && self.balance_factor(right) > 0
            {
                let rotated = self.rotate_right(right, slots);
                self.nodes[id].right = Some(rotated);
            }
            return self.rotate_left(id, slots);
        }
        id
    }

    pub(crate) fn insert(&mut self, card: Card, slots: &mut DefenseForest) {
        self.root = Some(self.insert_at(self.root, card, slots));
    }

    fn insert_at(&mut self, node: Option<BandId>, card: Card, slots: &mut DefenseForest) -> BandId {
        let Some(id) = node else {
            let offense = card.offense;
            let band = slots.insert(None, card);
            let id = self.nodes.insert(BandNode::new(offense, band));
            self.update(id, slots);
            debug!(offense, "band created");
            return id;
        };
        match card.offense.cmp(&self.nodes[id].offense) {
            Ordering::Less => {
                let child = self.insert_at(self.nodes[id].left, card, slots);
                self.nodes[id].left = Some(child);
            }
            Ordering::Greater => {
                let child = self.insert_at(self.nodes[id].right, card, slots);
                self.nodes[id].right = Some(child);
            }
            Ordering::Equal => {
                let band = slots.insert(self.nodes[id].band, card);
                self.nodes[id].band = Some(band);
            }
        }
        self.update(id, slots);
        self.rebalance(id, slots)
    }

    /// Removes the card at `key`. A band left empty is unlinked; when it has
    /// two children its in-order successor band is promoted wholesale.
    pub(crate) fn remove(&mut self, key: CardKey, slots: &mut DefenseForest) -> Option<Card> {
        let (root, removed) = self.remove_at(self.root, key, slots);
        self.root = root;
        removed
    }

    fn remove_at(
        &mut self,
        node: Option<BandId>,
        key: CardKey,
        slots: &mut DefenseForest,
    ) -> (Option<BandId>, Option<Card>) {
        let Some(id) = node else {
            return (None, None);
        };
        let removed = match key.offense.cmp(&self.nodes[id].offense) {
            Ordering::Less => {
                let (child, removed) = self.remove_at(self.nodes[id].left, key, slots);
                self.nodes[id].left = child;
                removed
            }
            Ordering::Greater => {
                let (child, removed) = self.remove_at(self.nodes[id].right, key, slots);
                self.nodes[id].right = child;
                removed
            }
            Ordering::Equal => {
                let (band, removed) = slots.remove(self.nodes[id].band, key.rank());
                self.nodes[id].band = band;
                if band.is_none() {
                    debug!(offense = key.offense, "band collapsed");
                    if let Some(root) = self.unlink(id, slots) {
                        return (root, removed);
                    }
                }
                removed
            }
        };
        self.update(id, slots);
        (Some(self.rebalance(id, slots)), removed)
    }

    /// Drops the band node `id` from the tree.
    ///
    /// Returns `Some(new_root)` when `id` had at most one child and was freed.
    /// Returns `None` when `id` stays in place holding its successor's band;
    /// the caller still has to refresh and rebalance it.
    fn unlink(&mut self, id: BandId, slots: &DefenseForest) -> Option<Option<BandId>> {
        let (left, right) = (self.nodes[id].left, self.nodes[id].right);
        let (Some(_), Some(right)) = (left, right) else {
            self.nodes.remove(id);
            return Some(left.or(right));
        };
        let successor = &self.nodes[self.leftmost(right)];
        let (offense, band) = (successor.offense, successor.band);
        let rest = self.detach(Some(right), offense, slots);
        let node = &mut self.nodes[id];
        node.offense = offense;
        node.band = band;
        node.right = rest;
        None
    }

    /// Removes the band node keyed `offense` without touching its band tree.
    fn detach(
        &mut self,
        node: Option<BandId>,
        offense: i32,
        slots: &DefenseForest,
    ) -> Option<BandId> {
        let id = node?;
        match offense.cmp(&self.nodes[id].offense) {
            Ordering::Less => {
                let child = self.detach(self.nodes[id].left, offense, slots);
                self.nodes[id].left = child;
            }
            Ordering::Greater => {
                let child = self.detach(self.nodes[id].right, offense, slots);
                self.nodes[id].right = child;
            }
            Ordering::Equal => {
                if let Some(root) = self.unlink(id, slots) {
                    return root;
                }
            }
        }
        self.update(id, slots);
        Some(self.rebalance(id, slots))
    }

    pub(crate) fn leftmost(&self, mut id: BandId) -> BandId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    pub(crate) fn rightmost(&self, mut id: BandId) -> BandId {
        while let Some(right) = self.nodes[id].right {
            id = right;
        }
        id
    }

    pub(crate) fn find(&self, offense: i32) -> Option<BandId> {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            cursor = match offense.cmp(&node.offense) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    pub(crate) fn collect_in_order<'a>(
        &self,
        node: Option<BandId>,
        slots: &'a DefenseForest,
        out: &mut Vec<&'a Card>,
    ) {
        let Some(id) = node else {
            return;
        };
        let band = &self.nodes[id];
        self.collect_in_order(band.left, slots, out);
        slots.collect_in_order(band.band, out);
        self.collect_in_order(band.right, slots, out);
    }

    pub(crate) fn count_reachable(&self, node: Option<BandId>, slots: &DefenseForest) -> usize {
        node.map_or(0, |id| {
            let band = &self.nodes[id];
            self.count_reachable(band.left, slots)
                + slots.count_reachable(band.band)
                + self.count_reachable(band.right, slots)
        })
    }
}
