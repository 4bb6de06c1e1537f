//! K-leaf cuts and bit-parallel truth tables.
//!
//! A cut of a node is a set of at most K leaves covering every path from the
//! node to the inputs; for K up to six the truth table of the cone over the
//! cut fits in one 64-bit word, so cut functions are computed with plain
//! word operations. Cut sets live in a bump arena owned by the store and are
//! discarded wholesale.

use crate::consts::{CUT_LEAF_MAX, ELEM_TRUTHS};
use crate::manager::Aig;
use crate::mem::{FlexArena, Span};
use crate::obj::ObjId;

/// Cut enumeration parameters.
#[derive(Debug, Clone, Copy)]
pub struct CutParams {
    /// Cuts kept per node, the trivial cut included.
    pub n_cuts_max: usize,
    /// Leaf bound K; at most [`CUT_LEAF_MAX`].
    pub n_leaf_max: usize,
    /// Drop leaves the cut function does not depend on.
    pub min_support: bool,
}

impl Default for CutParams {
    fn default() -> Self {
        CutParams {
            n_cuts_max: 8,
            n_leaf_max: 4,
            min_support: true,
        }
    }
}

/// One cut: leaf ids sorted ascending, a membership signature for cheap
/// dominance filtering, and the function of the cone over the leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cut {
    sign: u64,
    truth: u64,
    n_leaves: u8,
    leaves: [ObjId; CUT_LEAF_MAX],
}

impl Cut {
    fn trivial(id: ObjId) -> Self {
        let mut leaves = [0; CUT_LEAF_MAX];
        leaves[0] = id;
        Cut {
            sign: signature(id),
            truth: ELEM_TRUTHS[0],
            n_leaves: 1,
            leaves,
        }
    }

    pub fn leaves(&self) -> &[ObjId] {
        &self.leaves[..self.n_leaves as usize]
    }

    pub const fn truth(&self) -> u64 {
        self.truth
    }

    pub const fn sign(&self) -> u64 {
        self.sign
    }

    /// True when every leaf of `self` also appears in `other`.
    fn dominates(&self, other: &Cut) -> bool {
        if self.sign & other.sign != self.sign {
            return false;
        }
        self.leaves().iter().all(|l| other.leaves().contains(l))
    }

    const WORDS: usize = 6;

    fn write(&self, words: &mut [u64]) {
        words[0] = self.sign;
        words[1] = self.truth;
        words[2] = self.n_leaves as u64;
        for i in 0..3 {
            words[3 + i] = self.leaves[2 * i] as u64 | (self.leaves[2 * i + 1] as u64) << 32;
        }
    }

    fn read(words: &[u64]) -> Cut {
        let mut leaves = [0; CUT_LEAF_MAX];
        for i in 0..3 {
            leaves[2 * i] = words[3 + i] as u32;
            leaves[2 * i + 1] = (words[3 + i] >> 32) as u32;
        }
        Cut {
            sign: words[0],
            truth: words[1],
            n_leaves: words[2] as u8,
            leaves,
        }
    }
}

fn signature(id: ObjId) -> u64 {
    1u64 << (id & 63)
}

/// Arena-backed cut sets for every object of one manager.
#[derive(Debug)]
pub struct CutStore {
    arena: FlexArena,
    spans: Vec<Option<Span>>,
    params: CutParams,
}

impl CutStore {
    pub fn params(&self) -> &CutParams {
        &self.params
    }

    /// The cuts stored for an object.
    pub fn cuts(&self, id: ObjId) -> Vec<Cut> {
        let Some(span) = self.spans[id as usize] else {
            return Vec::new();
        };
        let words = self.arena.span(span);
        words
            .chunks_exact(Cut::WORDS)
            .map(Cut::read)
            .collect()
    }

    fn put(&mut self, id: ObjId, cuts: &[Cut]) {
        let span = self.arena.fetch(cuts.len() * Cut::WORDS);
        let words = self.arena.span_mut(span);
        for (cut, chunk) in cuts.iter().zip(words.chunks_exact_mut(Cut::WORDS)) {
            cut.write(chunk);
        }
        self.spans[id as usize] = Some(span);
    }

    pub fn mem_usage(&self) -> usize {
        self.arena.mem_usage()
    }
}

impl Aig {
    /// Enumerates cuts for every object reachable from the outputs and
    /// returns the arena-backed store; each object's cut count lands in its
    /// 8-bit cut field.
    pub fn compute_cuts(&mut self, params: CutParams) -> CutStore {
        assert!(params.n_leaf_max >= 2 && params.n_leaf_max <= CUT_LEAF_MAX);
        assert!(params.n_cuts_max >= 2 && params.n_cuts_max <= u8::MAX as usize);
        let mut store = CutStore {
            arena: FlexArena::new(),
            spans: vec![None; self.obj_id_max()],
            params,
        };
        // leaves of the enumeration: constant, inputs, latches
        for id in self.live_ids() {
            let obj = self.obj(id);
            if obj.is_const1() || obj.is_pi() || obj.is_latch() {
                store.put(id, &[Cut::trivial(id)]);
                self.obj_mut(id).n_cuts = 1;
            }
        }
        let order = self.dfs();
        for id in order {
            if !self.obj(id).is_node() {
                continue;
            }
            let cuts = self.enumerate_node_cuts(id, &store);
            self.obj_mut(id).n_cuts = cuts.len() as u8;
            store.put(id, &cuts);
        }
        tracing::debug!(bytes = store.mem_usage(), "computed cuts");
        store
    }

    fn enumerate_node_cuts(&self, id: ObjId, store: &CutStore) -> Vec<Cut> {
        let obj = self.obj(id);
        let f0 = obj.fanin0().expect("gate fanin");
        let f1 = obj.fanin1().expect("gate fanin");
        let is_exor = obj.is_exor();
        let cuts0 = store.cuts(f0.id());
        let cuts1 = store.cuts(f1.id());
        let params = store.params;
        let mut cuts: Vec<Cut> = vec![Cut::trivial(id)];
        'outer: for c0 in &cuts0 {
            for c1 in &cuts1 {
                if cuts.len() >= params.n_cuts_max {
                    break 'outer;
                }
                let Some(mut merged) = merge_leaves(c0, c1, params.n_leaf_max) else {
                    continue;
                };
                merged.truth = cut_cone_truth(&merged, c0, c1, f0.is_complement(), f1.is_complement(), is_exor);
                if params.min_support {
                    minimize_support(&mut merged);
                }
                if cuts.iter().any(|c| c.dominates(&merged)) {
                    continue;
                }
                cuts.retain(|c| !merged.dominates(c) || c.n_leaves == 1);
                cuts.push(merged);
            }
        }
        cuts
    }

    /// Collects a cut's cone: the leaves first, then the internal nodes in
    /// topological order. Uses the first scratch mark, restored on exit.
    pub fn collect_cut(&mut self, root: ObjId, leaves: &[ObjId]) -> Vec<ObjId> {
        let mut nodes: Vec<ObjId> = leaves.to_vec();
        for &l in leaves {
            self.obj_mut(l).mark_a = true;
        }
        self.collect_cut_rec(root, &mut nodes);
        for &n in &nodes {
            self.obj_mut(n).mark_a = false;
        }
        nodes
    }

    fn collect_cut_rec(&mut self, id: ObjId, nodes: &mut Vec<ObjId>) {
        if self.obj(id).mark_a {
            return;
        }
        self.obj_mut(id).mark_a = true;
        debug_assert!(self.obj(id).is_node(), "cut leaves must cover the cone");
        let f0 = self.obj(id).fanin0().expect("gate fanin").id();
        let f1 = self.obj(id).fanin1().expect("gate fanin").id();
        self.collect_cut_rec(f0, nodes);
        self.collect_cut_rec(f1, nodes);
        nodes.push(id);
    }

    /// Truth table of `root` over `leaves`. `nodes` is the cone from
    /// [`Aig::collect_cut`]; `store` is scratch reused across calls.
    pub fn cut_truth(
        &self,
        root: ObjId,
        leaves: &[ObjId],
        nodes: &[ObjId],
        store: &mut Vec<u64>,
    ) -> u64 {
        assert!(leaves.len() <= CUT_LEAF_MAX, "cut too wide for one word");
        debug_assert_eq!(&nodes[..leaves.len()], leaves);
        store.clear();
        store.resize(nodes.len(), 0);
        let mut position = vec![u32::MAX; self.obj_id_max()];
        for (i, &n) in nodes.iter().enumerate() {
            position[n as usize] = i as u32;
        }
        for (i, _) in leaves.iter().enumerate() {
            store[i] = ELEM_TRUTHS[i];
        }
        for (i, &n) in nodes.iter().enumerate().skip(leaves.len()) {
            let obj = self.obj(n);
            let f0 = obj.fanin0().expect("gate fanin");
            let f1 = obj.fanin1().expect("gate fanin");
            let mut t0 = store[position[f0.id() as usize] as usize];
            let mut t1 = store[position[f1.id() as usize] as usize];
            if f0.is_complement() {
                t0 = !t0;
            }
            if f1.is_complement() {
                t1 = !t1;
            }
            store[i] = if obj.is_exor() { t0 ^ t1 } else { t0 & t1 };
        }
        store[position[root as usize] as usize]
    }
}

/// Union of two sorted leaf sets, or `None` past the leaf bound.
fn merge_leaves(c0: &Cut, c1: &Cut, n_leaf_max: usize) -> Option<Cut> {
    let mut leaves = [0; CUT_LEAF_MAX];
    let (a, b) = (c0.leaves(), c1.leaves());
    let (mut i, mut j, mut n) = (0, 0, 0);
    while i < a.len() || j < b.len() {
        let take_a = j == b.len() || (i < a.len() && a[i] <= b[j]);
        let leaf = if take_a { a[i] } else { b[j] };
        if take_a {
            i += 1;
            if j < b.len() && b[j] == leaf {
                j += 1;
            }
        } else {
            j += 1;
        }
        if n == n_leaf_max {
            return None;
        }
        leaves[n] = leaf;
        n += 1;
    }
    Some(Cut {
        sign: c0.sign | c1.sign,
        truth: 0,
        n_leaves: n as u8,
        leaves,
    })
}

/// Truth of the merged cut from its fanin cuts: each fanin truth is
/// stretched onto the merged leaf set minterm by minterm, then combined.
fn cut_cone_truth(merged: &Cut, c0: &Cut, c1: &Cut, compl0: bool, compl1: bool, is_exor: bool) -> u64 {
    let t0 = stretch(c0, merged);
    let t1 = stretch(c1, merged);
    let (t0, t1) = (if compl0 { !t0 } else { t0 }, if compl1 { !t1 } else { t1 });
    if is_exor {
        t0 ^ t1
    } else {
        t0 & t1
    }
}

/// Re-expresses a sub-cut's truth over the merged leaf set.
fn stretch(sub: &Cut, merged: &Cut) -> u64 {
    let mut var_of = [0usize; CUT_LEAF_MAX];
    for (i, leaf) in sub.leaves().iter().enumerate() {
        var_of[i] = merged
            .leaves()
            .iter()
            .position(|l| l == leaf)
            .expect("sub-cut leaf missing from merged cut");
    }
    let minterms = 1usize << merged.n_leaves;
    let mut out = 0u64;
    for m in 0..minterms {
        let mut sub_m = 0usize;
        for (i, &v) in var_of.iter().enumerate().take(sub.n_leaves as usize) {
            if m >> v & 1 == 1 {
                sub_m |= 1 << i;
            }
        }
        if sub.truth >> sub_m & 1 == 1 {
            out |= 1 << m;
        }
    }
    // replicate the pattern across unused high minterms of the word
    let mut width = minterms;
    while width < 64 {
        out |= out << width;
        width *= 2;
    }
    out
}

/// Drops leaves the function does not depend on, compacting the table.
fn minimize_support(cut: &mut Cut) {
    let mut v = 0;
    while v < cut.n_leaves as usize {
        if truth_has_var(cut.truth, v) {
            v += 1;
            continue;
        }
        // squeeze variable v out of the table
        cut.truth = truth_shrink(cut.truth, v);
        for i in v..cut.n_leaves as usize - 1 {
            cut.leaves[i] = cut.leaves[i + 1];
        }
        cut.n_leaves -= 1;
        cut.leaves[cut.n_leaves as usize] = 0;
    }
    cut.sign = cut.leaves().iter().fold(0, |s, &l| s | signature(l));
}

/// Whether the function depends on variable `v`.
fn truth_has_var(truth: u64, v: usize) -> bool {
    let mask = ELEM_TRUTHS[v];
    let hi = truth & mask;
    let lo = truth & !mask;
    (hi >> (1 << v)) != lo
}

/// Removes a vacuous variable, keeping the cofactor on `v = 0` and
/// restoring the replicated-word convention.
fn truth_shrink(truth: u64, v: usize) -> u64 {
    let mut out = 0u64;
    for m in 0..32u64 {
        // insert a zero at position v to index the source table
        let low = m & ((1 << v) - 1);
        let high = (m >> v) << (v + 1);
        if truth >> (high | low) & 1 == 1 {
            out |= 1 << m;
        }
    }
    out | out << 32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn trivial_and_merged_cuts_are_enumerated() {
        let mut aig = Aig::start(None);
        let a = aig.ith_var(0);
        let b = aig.ith_var(1);
        let c = aig.ith_var(2);
        let ab = aig.and(a, b);
        let abc = aig.and(ab, c);
        aig.create_po(abc);
        let store = aig.compute_cuts(CutParams::default());
        let cuts = store.cuts(abc.id());
        assert!(cuts.iter().any(|cut| cut.leaves() == [abc.id()]));
        // the {a, b, c} cut computes the conjunction
        let wide = cuts
            .iter()
            .find(|cut| cut.leaves() == [a.id(), b.id(), c.id()])
            .expect("three-leaf cut");
        assert_eq!(wide.truth() & 0xFF, 0x80);
        assert_eq!(aig.obj(abc.id()).n_cuts() as usize, cuts.len());
    }

    #[test]
    fn cut_truth_evaluates_cone() {
        let mut aig = Aig::start(None);
        let a = aig.ith_var(0);
        let b = aig.ith_var(1);
        let c = aig.ith_var(2);
        let ab = aig.and(a, b);
        let out = aig.or(ab, c.not());
        aig.create_po(out);
        // the regular node under `out` computes !(a & b) & c
        let root = out.id();
        let leaves = vec![a.id(), b.id(), c.id()];
        let nodes = aig.collect_cut(root, &leaves);
        let mut scratch = Vec::new();
        let truth = aig.cut_truth(root, &leaves, &nodes, &mut scratch);
        let mut expect = 0u64;
        for m in 0..8u64 {
            let (va, vb, vc) = (m & 1 == 1, m >> 1 & 1 == 1, m >> 2 & 1 == 1);
            if !(va && vb) && vc {
                expect |= 1 << m;
            }
        }
        assert_eq!(truth & 0xFF, expect);
        aig.check().unwrap();
    }

    #[test]
    fn vacuous_leaves_are_dropped() {
        let mut cut = Cut {
            sign: signature(3) | signature(5),
            truth: ELEM_TRUTHS[0],
            n_leaves: 2,
            leaves: [3, 5, 0, 0, 0, 0],
        };
        minimize_support(&mut cut);
        assert_eq!(cut.leaves(), [3]);
        assert_eq!(cut.truth, ELEM_TRUTHS[0]);
    }

    #[test]
    fn stretch_is_identity_on_equal_leaf_sets() {
        let cut = Cut {
            sign: signature(1) | signature(2),
            truth: ELEM_TRUTHS[0] & ELEM_TRUTHS[1],
            n_leaves: 2,
            leaves: [1, 2, 0, 0, 0, 0],
        };
        assert_eq!(stretch(&cut, &cut), cut.truth);
    }
}
