//! Canonical operator constructors.
//!
//! Every constructor folds constants and duplicate fanins first, then
//! consults the strash table, so building the same function twice always
//! yields the same edge and no node ever carries a constant or repeated
//! fanin.

use super::{Aig, StrashKey};
use crate::edge::Edge;
use crate::obj::{ObjId, ObjKind};
use crate::seq::Init;

impl Aig {
    /// The `i`-th elementary variable, creating inputs up to `i` on demand.
    pub fn ith_var(&mut self, i: usize) -> Edge {
        while self.pi_num() <= i {
            self.create_pi();
        }
        Edge::new(self.pis[i], false)
    }

    /// Dispatches on a gate kind.
    pub fn oper(&mut self, kind: ObjKind, a: Edge, b: Edge) -> Edge {
        match kind {
            ObjKind::And => self.and(a, b),
            ObjKind::Exor => self.exor(a, b),
            _ => unreachable!("only gates are built through oper"),
        }
    }

    /// Canonical AND of two edges.
    pub fn and(&mut self, a: Edge, b: Edge) -> Edge {
        if a == b {
            return a;
        }
        if a == b.not() {
            return Edge::CONST0;
        }
        if a.is_const() {
            return if a == Edge::CONST1 { b } else { Edge::CONST0 };
        }
        if b.is_const() {
            return if b == Edge::CONST1 { a } else { Edge::CONST0 };
        }
        if self.catch_exor {
            if let Some((f0, f1)) = self.exor_shape(a, b) {
                return self.exor(f0, f1);
            }
        }
        let key = StrashKey::gate(ObjKind::And, a, b);
        if let Some(id) = self.table_lookup(&key) {
            return Edge::new(id, false);
        }
        Edge::new(self.obj_create(key), false)
    }

    /// Canonical EXOR. Without EXOR capture this desugars into the
    /// two-level AND form; with it, the fanins are stored regular and the
    /// operand complements fold into the result's complement.
    pub fn exor(&mut self, a: Edge, b: Edge) -> Edge {
        if !self.catch_exor {
            let na = a.not();
            let nb = b.not();
            let l = self.and(a, nb);
            let r = self.and(na, b);
            return self.or(l, r);
        }
        if a == b {
            return Edge::CONST0;
        }
        if a == b.not() {
            return Edge::CONST1;
        }
        if a.is_const() {
            return b.not_if(a == Edge::CONST1);
        }
        if b.is_const() {
            return a.not_if(b == Edge::CONST1);
        }
        let compl = a.is_complement() ^ b.is_complement();
        let key = StrashKey::gate(ObjKind::Exor, a.regular(), b.regular());
        let id = match self.table_lookup(&key) {
            Some(id) => id,
            None => self.obj_create(key),
        };
        Edge::new(id, compl)
    }

    pub fn or(&mut self, a: Edge, b: Edge) -> Edge {
        self.and(a.not(), b.not()).not()
    }

    /// If-then-else: `c ? t : e`.
    pub fn mux(&mut self, c: Edge, t: Edge, e: Edge) -> Edge {
        let ct = self.and(c, t);
        let ce = self.and(c.not(), e);
        self.or(ct, ce)
    }

    /// Majority of three.
    pub fn maj(&mut self, a: Edge, b: Edge, c: Edge) -> Edge {
        let ab = self.and(a, b);
        let ac = self.and(a, c);
        let bc = self.and(b, c);
        let or1 = self.or(ab, ac);
        self.or(or1, bc)
    }

    /// Latch over `driver` with the given initial value. An initial value of
    /// one is represented as the complement of a latch over the complemented
    /// driver, so hashed latches always carry initial value zero.
    pub fn latch(&mut self, driver: Edge, init: Init) -> Edge {
        let flip = init == Init::One;
        let key = StrashKey::latch(driver.not_if(flip));
        let id = match self.table_lookup(&key) {
            Some(id) => id,
            None => self.obj_create(key),
        };
        Edge::new(id, flip)
    }

    /// Balanced tree over `edges`; depth is logarithmic in the operand
    /// count, disregarding levels and sharing.
    pub fn multi(&mut self, edges: &[Edge], kind: ObjKind) -> Edge {
        assert!(!edges.is_empty(), "empty operand list");
        if edges.len() == 1 {
            return edges[0];
        }
        let mid = edges.len() / 2;
        let lo = self.multi(&edges[..mid], kind);
        let hi = self.multi(&edges[mid..], kind);
        self.oper(kind, lo, hi)
    }

    /// The conjunction of the first `n_vars` elementary variables.
    pub fn create_and(&mut self, n_vars: usize) -> Edge {
        if n_vars == 0 {
            return Edge::CONST1;
        }
        let vars: Vec<Edge> = (0..n_vars).map(|i| self.ith_var(i)).collect();
        self.multi(&vars, ObjKind::And)
    }

    /// The disjunction of the first `n_vars` elementary variables.
    pub fn create_or(&mut self, n_vars: usize) -> Edge {
        if n_vars == 0 {
            return Edge::CONST0;
        }
        let vars: Vec<Edge> = (0..n_vars).map(|i| self.ith_var(i).not()).collect();
        self.multi(&vars, ObjKind::And).not()
    }

    /// The parity of the first `n_vars` elementary variables.
    pub fn create_exor(&mut self, n_vars: usize) -> Edge {
        if n_vars == 0 {
            return Edge::CONST0;
        }
        let vars: Vec<Edge> = (0..n_vars).map(|i| self.ith_var(i)).collect();
        self.multi(&vars, ObjKind::Exor)
    }

    /// Single-output miter over output pairs: the result is one exactly when
    /// some pair disagrees.
    pub fn miter(&mut self, pairs: &[(Edge, Edge)]) -> Edge {
        assert!(!pairs.is_empty(), "miter over no pairs");
        let xnors: Vec<Edge> = pairs
            .iter()
            .map(|&(a, b)| {
                let x = self.exor(a, b);
                x.not()
            })
            .collect();
        self.multi(&xnors, ObjKind::And).not()
    }

    /// Detects the EXOR shape `(a ∧ ¬b) ∨ (¬a ∧ b)` presented as the AND of
    /// two complemented ANDs over the same fanin pair in opposite phases.
    fn exor_shape(&self, a: Edge, b: Edge) -> Option<(Edge, Edge)> {
        if !a.is_complement() || !b.is_complement() {
            return None;
        }
        let p0 = self.obj(a.id());
        let p1 = self.obj(b.id());
        if !p0.is_and() || !p1.is_and() {
            return None;
        }
        if p0.fanin0_id() != p1.fanin0_id() || p0.fanin1_id() != p1.fanin1_id() {
            return None;
        }
        if p0.fanin_c0() == p1.fanin_c0() || p0.fanin_c1() == p1.fanin_c1() {
            return None;
        }
        Some((p0.fanin0.expect("and fanin"), p0.fanin1.expect("and fanin")))
    }

    /// Chases an edge through buffer chains, accumulating inversions.
    pub fn obj_real(&self, e: Edge) -> Edge {
        let obj = self.obj(e.id());
        if !obj.is_buf() {
            return e;
        }
        let inner = obj.fanin0.expect("buffer with no fanin");
        self.obj_real(inner).not_if(e.is_complement())
    }

    /// True when the node roots a MUX (or EXOR/NEXOR) shape: an AND of two
    /// complemented ANDs sharing a grandchild in opposite phases.
    pub fn is_mux_type(&self, id: ObjId) -> bool {
        let node = self.obj(id);
        if !node.is_and() {
            return false;
        }
        if !node.fanin_c0() || !node.fanin_c1() {
            return false;
        }
        let n0 = self.obj(node.fanin0_id());
        let n1 = self.obj(node.fanin1_id());
        if !n0.is_and() || !n1.is_and() {
            return false;
        }
        (n0.fanin0_id() == n1.fanin0_id() && (n0.fanin_c0() ^ n1.fanin_c0()))
            || (n0.fanin0_id() == n1.fanin1_id() && (n0.fanin_c0() ^ n1.fanin_c1()))
            || (n0.fanin1_id() == n1.fanin0_id() && (n0.fanin_c1() ^ n1.fanin_c0()))
            || (n0.fanin1_id() == n1.fanin1_id() && (n0.fanin_c1() ^ n1.fanin_c1()))
    }

    /// Recovers `(control, then, else)` from a MUX-shaped node. The control
    /// is returned in positive phase; the data edges may be complemented.
    /// Panics when the node is not MUX-shaped.
    pub fn recognize_mux(&self, id: ObjId) -> (Edge, Edge, Edge) {
        assert!(self.is_mux_type(id), "node is not a mux");
        let node = self.obj(id);
        let n0 = self.obj(node.fanin0_id());
        let n1 = self.obj(node.fanin1_id());
        let (f00, f01) = (n0.fanin0.expect("and fanin"), n0.fanin1.expect("and fanin"));
        let (f10, f11) = (n1.fanin0.expect("and fanin"), n1.fanin1.expect("and fanin"));
        // the shared grandchild in opposite phases is the control
        if f01.id() == f11.id() && (f01.is_complement() ^ f11.is_complement()) {
            return if f01.is_complement() {
                (f11, f10.not(), f00.not())
            } else {
                (f01, f00.not(), f10.not())
            };
        }
        if f00.id() == f10.id() && (f00.is_complement() ^ f10.is_complement()) {
            return if f00.is_complement() {
                (f10, f11.not(), f01.not())
            } else {
                (f00, f01.not(), f11.not())
            };
        }
        if f00.id() == f11.id() && (f00.is_complement() ^ f11.is_complement()) {
            return if f00.is_complement() {
                (f11, f10.not(), f01.not())
            } else {
                (f00, f01.not(), f10.not())
            };
        }
        if f01.id() == f10.id() && (f01.is_complement() ^ f10.is_complement()) {
            return if f01.is_complement() {
                (f10, f11.not(), f00.not())
            } else {
                (f01, f00.not(), f11.not())
            };
        }
        unreachable!("mux shape without a shared control")
    }

    /// Recovers the EXOR operands from a node: directly from an EXOR gate,
    /// or from the AND-of-complemented-ANDs shape.
    pub fn recognize_exor(&self, id: ObjId) -> Option<(Edge, Edge)> {
        let node = self.obj(id);
        if !node.is_node() {
            return None;
        }
        if node.is_exor() {
            return Some((node.fanin0.expect("exor fanin"), node.fanin1.expect("exor fanin")));
        }
        let (a, b) = (node.fanin0.expect("and fanin"), node.fanin1.expect("and fanin"));
        self.exor_shape(a, b)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn and_constant_folding() {
        let mut aig = Aig::start(None);
        let x = aig.ith_var(0);
        assert_eq!(aig.and(aig.const1(), x), x);
        assert_eq!(aig.and(aig.const0(), x), aig.const0());
        assert_eq!(aig.and(x, x.not()), aig.const0());
        assert_eq!(aig.and(x, x), x);
        assert_eq!(aig.and_num(), 0);
    }

    #[test]
    fn exor_boundaries_with_capture() {
        let mut aig = Aig::with_exor_capture(None);
        let x = aig.ith_var(0);
        let y = aig.ith_var(1);
        assert_eq!(aig.exor(x, x), aig.const0());
        assert_eq!(aig.exor(x, x.not()), aig.const1());
        assert_eq!(aig.exor(aig.const0(), y), y);
        assert_eq!(aig.exor(aig.const1(), y), y.not());
        // complements fold into the output polarity
        let e = aig.exor(x, y);
        assert_eq!(aig.exor(x.not(), y), e.not());
        assert_eq!(aig.exor(x.not(), y.not()), e);
        assert_eq!(aig.exor_num(), 1);
    }

    #[test]
    fn exor_capture_rewrites_and_shape() {
        let mut aig = Aig::with_exor_capture(None);
        let x = aig.ith_var(0);
        let y = aig.ith_var(1);
        let l = aig.and(x, y.not());
        let r = aig.and(x.not(), y);
        let out = aig.and(l.not(), r.not());
        let direct = aig.exor(x, y);
        assert_eq!(out, direct.not());
    }

    #[test]
    fn latch_init_one_is_complement_encoded() {
        let mut aig = Aig::start(None);
        let x = aig.ith_var(0);
        let l0 = aig.latch(x, Init::Zero);
        let l1 = aig.latch(x.not(), Init::One);
        assert_eq!(l0, l1.not());
        assert_eq!(aig.latch_num(), 1);
    }

    #[test]
    fn multi_builds_logarithmic_tree() {
        let mut aig = Aig::start(None);
        let out = aig.create_and(8);
        assert_eq!(aig.edge_level(out), 3);
        assert_eq!(aig.and_num(), 7);
    }

    #[test]
    fn mux_recognition_round_trip() {
        let mut aig = Aig::start(None);
        let c = aig.ith_var(0);
        let t = aig.ith_var(1);
        let e = aig.ith_var(2);
        let m = aig.mux(c, t, e);
        let root = m.id();
        assert!(aig.is_mux_type(root));
        let (rc, rt, re) = aig.recognize_mux(root);
        // recovered up to inverter polarity: a complemented control swaps
        // the data edges
        if rc == c {
            assert_eq!((rt.id(), re.id()), (t.id(), e.id()));
        } else {
            assert_eq!(rc, c.not());
            assert_eq!((rt.id(), re.id()), (e.id(), t.id()));
        }
    }

    #[test]
    fn recognize_exor_on_and_shape() {
        let mut aig = Aig::start(None);
        let x = aig.ith_var(0);
        let y = aig.ith_var(1);
        let e = aig.exor(x, y);
        let (a, b) = aig.recognize_exor(e.id()).expect("exor shape");
        assert_eq!(a.id(), x.id());
        assert_eq!(b.id(), y.id());
    }
}
