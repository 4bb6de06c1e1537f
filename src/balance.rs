//! Algebraic balancing.
//!
//! Rebuilds the graph in a fresh manager with the depth of every AND/EXOR
//! supergate minimized: the maximal same-kind cone under each root is viewed
//! as one N-ary gate, its leaves are rebuilt recursively, and the gate is
//! reassembled as a level-sorted tree, preferring pairs the strash table
//! already holds so sharing is not lost to the reshaping.

use crate::edge::Edge;
use crate::error::CheckError;
use crate::manager::Aig;
use crate::obj::{ObjId, ObjKind};

impl Aig {
    /// Returns a functionally equivalent manager with minimized depth,
    /// together with the consistency report of the result. With
    /// `update_level` unset the leaf pairing ignores levels entirely and
    /// only chases sharing.
    pub fn balance(&mut self, update_level: bool) -> (Aig, Option<CheckError>) {
        let mut new = Aig::start(Some(self.obj_id_max()));
        new.catch_exor = self.catch_exor;
        let mut map: Vec<Option<Edge>> = vec![None; self.obj_id_max()];
        map[0] = Some(new.const1());
        for i in 0..self.pis.len() {
            let pi = self.pis[i];
            map[pi as usize] = Some(new.create_pi());
        }
        for i in 0..self.pos.len() {
            let po = self.pos[i];
            let driver = self.obj(po).fanin0().expect("po without driver");
            let real = self.obj_real(driver);
            let built = self.balance_rec(&mut new, &mut map, real.id(), update_level);
            new.create_po(built.not_if(real.is_complement()));
        }
        let report = new.check_report();
        (new, report)
    }

    fn balance_rec(
        &mut self,
        new: &mut Aig,
        map: &mut Vec<Option<Edge>>,
        root: ObjId,
        update_level: bool,
    ) -> Edge {
        if let Some(done) = map[root as usize] {
            return done;
        }
        if self.obj(root).is_buf() {
            let real = self.obj_real(Edge::new(root, false));
            let built = self
                .balance_rec(new, map, real.id(), update_level)
                .not_if(real.is_complement());
            map[root as usize] = Some(built);
            return built;
        }
        debug_assert!(self.obj(root).is_node());
        let kind = self.obj(root).kind();
        // collect the implication supergate; an empty result means a leaf
        // appeared in both polarities and the cone is constant zero
        let old_super = self.balance_cone(root);
        if old_super.is_empty() {
            map[root as usize] = Some(new.const0());
            return new.const0();
        }
        debug_assert!(old_super.len() > 1);
        let mut new_super = Vec::with_capacity(old_super.len());
        for leaf in old_super {
            let built = self
                .balance_rec(new, map, leaf.id(), update_level)
                .not_if(leaf.is_complement());
            new_super.push(built);
        }
        let built = build_super(new, new_super, kind, update_level);
        debug_assert!(map[root as usize].is_none());
        map[root as usize] = Some(built);
        built
    }

    /// Collects the leaves of the maximal same-kind cone under `root`. A
    /// leaf is a fanin that is complemented, of a different kind, or shared.
    /// Returns an empty set when a leaf occurs in both polarities.
    fn balance_cone(&mut self, root: ObjId) -> Vec<Edge> {
        let mut leaves = Vec::new();
        let collapsed = self.balance_cone_rec(root, Edge::new(root, false), &mut leaves);
        debug_assert!(!leaves.is_empty());
        for i in 0..leaves.len() {
            let id = leaves[i].id();
            self.obj_mut(id).mark_b = false;
        }
        if collapsed {
            return Vec::new();
        }
        leaves
    }

    /// Returns true when the supergate collapses to constant zero.
    fn balance_cone_rec(&mut self, root: ObjId, edge: Edge, leaves: &mut Vec<Edge>) -> bool {
        if self.obj(edge.id()).mark_b {
            // seen before: same polarity is a plain duplicate, opposite
            // polarity collapses the AND supergate
            if leaves.contains(&edge) {
                return false;
            }
            debug_assert!(leaves.contains(&edge.not()));
            return true;
        }
        let is_boundary = edge.id() != root
            && (edge.is_complement()
                || !self.obj(edge.id()).is_node()
                || self.obj(edge.id()).kind() != self.obj(root).kind()
                || self.obj(edge.id()).refs() > 1);
        if is_boundary {
            leaves.push(edge);
            self.obj_mut(edge.id()).mark_b = true;
            return false;
        }
        debug_assert!(!edge.is_complement());
        debug_assert!(self.obj(edge.id()).is_node());
        let f0 = self.obj(edge.id()).fanin0().expect("gate fanin");
        let f1 = self.obj(edge.id()).fanin1().expect("gate fanin");
        let left = self.balance_cone_rec(root, f0, leaves);
        let right = self.balance_cone_rec(root, f1, leaves);
        left || right
    }
}

/// Reassembles a supergate as a balanced tree over `leaves` (edges in the
/// new manager), pairing shallow leaves first and preferring pairs the
/// strash table already holds.
fn build_super(new: &mut Aig, mut leaves: Vec<Edge>, kind: ObjKind, update_level: bool) -> Edge {
    debug_assert!(leaves.len() > 1);
    leaves.sort_by(|a, b| new.edge_level(*b).cmp(&new.edge_level(*a)));
    while leaves.len() > 1 {
        let left_bound = if update_level { find_left(new, &leaves) } else { 0 };
        permute(new, &mut leaves, left_bound, kind);
        let a = leaves.pop().expect("two leaves remain");
        let b = leaves.pop().expect("two leaves remain");
        let combined = new.oper(kind, a, b);
        push_ordered(new, &mut leaves, combined);
    }
    leaves[0]
}

/// Index of the leftmost leaf whose level matches the second-to-last one;
/// pairing the last leaf with anything at or right of this index keeps the
/// result depth unchanged.
fn find_left(new: &Aig, leaves: &[Edge]) -> usize {
    if leaves.len() < 3 {
        return 0;
    }
    let pivot = new.edge_level(leaves[leaves.len() - 2]);
    let mut current = leaves.len() - 2;
    while current > 0 && new.edge_level(leaves[current - 1]) == pivot {
        current -= 1;
    }
    current
}

/// Moves into pairing position a leaf that lets the next gate strash to an
/// existing node; constant leaves jump the queue unconditionally.
fn permute(new: &Aig, leaves: &mut [Edge], left_bound: usize, kind: ObjKind) {
    let right_bound = leaves.len() - 2;
    debug_assert!(left_bound <= right_bound);
    if left_bound == right_bound {
        return;
    }
    let last = leaves[right_bound + 1];
    if last.is_const() || leaves[right_bound].is_const() {
        return;
    }
    for i in (left_bound..=right_bound).rev() {
        let candidate = leaves[i];
        if candidate.is_const() || new.strash_probe(kind, last, candidate).is_some() {
            leaves.swap(i, right_bound);
            return;
        }
    }
}

/// Inserts a freshly combined node back into the level-sorted worklist,
/// skipping exact duplicates.
fn push_ordered(new: &Aig, leaves: &mut Vec<Edge>, edge: Edge) {
    if leaves.contains(&edge) {
        return;
    }
    leaves.push(edge);
    let mut i = leaves.len() - 1;
    while i > 0 && new.edge_level(leaves[i]) > new.edge_level(leaves[i - 1]) {
        leaves.swap(i, i - 1);
        i -= 1;
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn chain_balances_to_logarithmic_depth() {
        let mut aig = Aig::start(None);
        let mut chain = aig.ith_var(0);
        for i in 1..8 {
            let v = aig.ith_var(i);
            chain = aig.and(chain, v);
        }
        aig.create_po(chain);
        assert_eq!(aig.levels(), 7);
        let (balanced, report) = aig.balance(true);
        assert!(report.is_none());
        assert_eq!(balanced.levels(), 3);
        assert_eq!(balanced.pi_num(), 8);
        assert_eq!(balanced.po_num(), 1);
    }

    #[test]
    fn balance_is_idempotent() {
        let mut aig = Aig::start(None);
        let a = aig.ith_var(0);
        let b = aig.ith_var(1);
        let c = aig.ith_var(2);
        let d = aig.ith_var(3);
        let ab = aig.and(a, b);
        let abc = aig.and(ab, c);
        let abcd = aig.and(abc, d);
        let other = aig.or(ab, d.not());
        aig.create_po(abcd);
        aig.create_po(other);
        let (once, r1) = aig.balance(true);
        assert!(r1.is_none());
        let (mut twice_src, _) = aig.balance(true);
        let (twice, r2) = twice_src.balance(true);
        assert!(r2.is_none());
        assert_eq!(once.node_num(), twice.node_num());
        assert_eq!(once.levels(), twice.levels());
        assert_eq!(once.pi_num(), twice.pi_num());
        assert_eq!(once.po_num(), twice.po_num());
    }

    #[test]
    fn opposite_polarity_leaves_collapse_to_constant() {
        let mut aig = Aig::start(None);
        let a = aig.ith_var(0);
        let b = aig.ith_var(1);
        let c = aig.ith_var(2);
        // (a & b) & (!a & c): the supergate sees a and !a
        let l = aig.and(a, b);
        let r = aig.and(a.not(), c);
        let top = aig.and(l, r);
        aig.create_po(top);
        let (balanced, report) = aig.balance(true);
        assert!(report.is_none());
        let po = balanced.po(0);
        let driver = balanced.obj(po).fanin0().unwrap();
        assert_eq!(driver, balanced.const0());
        assert_eq!(balanced.node_num(), 0);
    }

    #[test]
    fn constant_driver_is_preserved() {
        let mut aig = Aig::start(None);
        aig.ith_var(0);
        aig.create_po(aig.const1());
        let (balanced, report) = aig.balance(true);
        assert!(report.is_none());
        let driver = balanced.obj(balanced.po(0)).fanin0().unwrap();
        assert_eq!(driver, balanced.const1());
    }
}
