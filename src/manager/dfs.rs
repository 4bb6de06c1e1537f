//! Topological orderings, cone measurement and cross-manager copies.

use super::Aig;
use crate::edge::Edge;
use crate::error::AigError;
use crate::obj::{ObjId, ObjKind};

impl Aig {
    /// Internal objects (gates, buffers, latches) reachable from the primary
    /// outputs, fanins before fanouts.
    pub fn dfs(&mut self) -> Vec<ObjId> {
        self.increment_trav_id();
        let mut order = Vec::with_capacity(self.node_num());
        for i in 0..self.pos.len() {
            let po = self.pos[i];
            if let Some(driver) = self.obj(po).fanin0 {
                self.dfs_rec(driver.id(), &mut order);
            }
        }
        order
    }

    /// The cone of one object, fanins before fanouts.
    pub fn dfs_node(&mut self, root: ObjId) -> Vec<ObjId> {
        self.increment_trav_id();
        let mut order = Vec::new();
        self.dfs_rec(root, &mut order);
        order
    }

    fn dfs_rec(&mut self, id: ObjId, order: &mut Vec<ObjId>) {
        if self.is_trav_id_current(id) {
            return;
        }
        self.set_trav_id_current(id);
        let obj = self.obj(id);
        if obj.is_pi() || obj.is_const1() {
            return;
        }
        let fan0 = obj.fanin0;
        let fan1 = obj.fanin1;
        for f in [fan0, fan1].into_iter().flatten() {
            self.dfs_rec(f.id(), order);
        }
        order.push(id);
    }

    /// Internal objects in reverse topological order, every object before
    /// its fanins. Requires the fanout index.
    pub fn dfs_reverse(&mut self) -> Vec<ObjId> {
        assert!(self.fanout.is_some(), "reverse DFS needs the fanout index");
        self.increment_trav_id();
        let mut order = Vec::with_capacity(self.node_num());
        let starts: Vec<ObjId> = std::iter::once(0).chain(self.pis.clone()).collect();
        for start in starts {
            self.set_trav_id_current(start);
            for fanout in self.fanout_ids(start) {
                self.dfs_reverse_rec(fanout, &mut order);
            }
        }
        order
    }

    fn dfs_reverse_rec(&mut self, id: ObjId, order: &mut Vec<ObjId>) {
        if self.is_trav_id_current(id) {
            return;
        }
        self.set_trav_id_current(id);
        if self.obj(id).is_po() {
            return;
        }
        for fanout in self.fanout_ids(id) {
            self.dfs_reverse_rec(fanout, order);
        }
        order.push(id);
    }

    /// Recomputes the combinational depth from scratch, without trusting the
    /// stored levels.
    pub fn count_levels(&mut self) -> u32 {
        let order = self.dfs();
        let mut level: Vec<u32> = vec![0; self.obj_id_max()];
        for &id in &order {
            let obj = self.obj(id);
            let l = match (obj.fanin0, obj.fanin1) {
                (Some(f0), Some(f1)) => {
                    1 + obj.is_exor() as u32
                        + level[f0.id() as usize].max(level[f1.id() as usize])
                }
                (Some(f0), None) => level[f0.id() as usize],
                _ => 0,
            };
            level[id as usize] = l;
        }
        self.pos
            .iter()
            .filter_map(|&po| self.obj(po).fanin0)
            .map(|f| level[f.id() as usize])
            .max()
            .unwrap_or(0)
    }

    /// Number of gates in the cone of an edge.
    pub fn dag_size(&mut self, root: Edge) -> usize {
        let count = self.cone_count_and_mark(root.id());
        self.cone_unmark(root.id());
        count
    }

    fn cone_count_and_mark(&mut self, id: ObjId) -> usize {
        let obj = self.obj(id);
        if !obj.is_node() || obj.mark_a {
            return 0;
        }
        let fan0 = obj.fanin0.expect("gate fanin").id();
        let fan1 = obj.fanin1.expect("gate fanin").id();
        let count = 1 + self.cone_count_and_mark(fan0) + self.cone_count_and_mark(fan1);
        self.obj_mut(id).mark_a = true;
        count
    }

    pub(crate) fn cone_unmark(&mut self, id: ObjId) {
        let obj = self.obj(id);
        if !obj.is_node() || !obj.mark_a {
            return;
        }
        let fan0 = obj.fanin0.expect("gate fanin").id();
        let fan1 = obj.fanin1.expect("gate fanin").id();
        self.cone_unmark(fan0);
        self.cone_unmark(fan1);
        self.obj_mut(id).mark_a = false;
    }

    /// Copies the cone rooted at `root` from `src` into `dest`, mapping the
    /// first `n_vars` primary inputs of the source onto the destination's
    /// elementary variables.
    pub fn transfer(src: &Aig, dest: &mut Aig, root: Edge, n_vars: usize) -> Edge {
        if src.obj(root.id()).is_const1() {
            return dest.const1().not_if(root.is_complement());
        }
        let mut map: Vec<Option<Edge>> = vec![None; src.obj_id_max()];
        map[0] = Some(dest.const1());
        for (i, &pi) in src.pis.iter().enumerate().take(n_vars) {
            map[pi as usize] = Some(dest.ith_var(i));
        }
        Self::transfer_rec(src, dest, &mut map, root.id());
        map[root.id() as usize]
            .expect("root mapped")
            .not_if(root.is_complement())
    }

    fn transfer_rec(src: &Aig, dest: &mut Aig, map: &mut Vec<Option<Edge>>, id: ObjId) {
        if map[id as usize].is_some() {
            return;
        }
        let obj = src.obj(id);
        debug_assert!(obj.is_node(), "transfer crosses an unmapped terminal");
        let f0 = obj.fanin0.expect("gate fanin");
        let f1 = obj.fanin1.expect("gate fanin");
        Self::transfer_rec(src, dest, map, f0.id());
        Self::transfer_rec(src, dest, map, f1.id());
        let c0 = map[f0.id() as usize].expect("fanin mapped").not_if(f0.is_complement());
        let c1 = map[f1.id() as usize].expect("fanin mapped").not_if(f1.is_complement());
        map[id as usize] = Some(dest.oper(obj.kind, c0, c1));
    }

    /// The cone of `root` with primary input `var` substituted by `func`.
    pub fn compose(&mut self, root: Edge, func: Edge, var: usize) -> Result<Edge, AigError> {
        if var >= self.pi_num() {
            return Err(AigError::UndefinedVar {
                var,
                pis: self.pi_num(),
            });
        }
        let target = self.pis[var];
        let mut map: Vec<Option<Edge>> = vec![None; self.obj_id_max()];
        self.compose_rec(&mut map, root.id(), func, target);
        Ok(map[root.id() as usize]
            .expect("root mapped")
            .not_if(root.is_complement()))
    }

    fn compose_rec(&mut self, map: &mut Vec<Option<Edge>>, id: ObjId, func: Edge, target: ObjId) {
        if map[id as usize].is_some() {
            return;
        }
        let obj = self.obj(id);
        if obj.is_const1() || obj.is_pi() {
            map[id as usize] = Some(if id == target { func } else { Edge::new(id, false) });
            return;
        }
        debug_assert!(obj.is_node(), "compose crosses a non-gate object");
        let kind = obj.kind;
        let f0 = obj.fanin0.expect("gate fanin");
        let f1 = obj.fanin1.expect("gate fanin");
        self.compose_rec(map, f0.id(), func, target);
        self.compose_rec(map, f1.id(), func, target);
        let c0 = map[f0.id() as usize].expect("fanin mapped").not_if(f0.is_complement());
        let c1 = map[f1.id() as usize].expect("fanin mapped").not_if(f1.is_complement());
        map[id as usize] = Some(self.oper(kind, c0, c1));
    }

    /// Removes every buffer by rehashing its fanouts onto the edge the
    /// buffer chain really denotes. Replacement can itself mint a buffer
    /// (latch deduplication), so the sweep repeats until none remain,
    /// bounded by the live object count.
    pub fn remove_buffers(&mut self) {
        let mut rounds = 0;
        while self.buf_num() > 0 {
            rounds += 1;
            assert!(rounds <= self.obj_num(), "buffer sweep failed to converge");
            self.remove_buffers_pass();
        }
    }

    fn remove_buffers_pass(&mut self) {
        for id in self.live_ids() {
            let (kind, fan0, fan1) = match self.try_obj(id) {
                Some(obj) => (obj.kind(), obj.fanin0(), obj.fanin1()),
                None => continue,
            };
            match kind {
                ObjKind::Po => {
                    let f0 = fan0.expect("po driver");
                    if !self.obj(f0.id()).is_buf() {
                        continue;
                    }
                    let real = self.obj_real(f0);
                    self.patch_fanin0(id, real);
                }
                ObjKind::Latch => {
                    let f0 = fan0.expect("latch fanin");
                    if !self.obj(f0.id()).is_buf() {
                        continue;
                    }
                    let real = self.obj_real(f0);
                    let new = self.latch(real, crate::seq::Init::Zero);
                    self.replace(id, new, false, false);
                }
                ObjKind::And | ObjKind::Exor => {
                    let f0 = fan0.expect("gate fanin");
                    let f1 = fan1.expect("gate fanin");
                    if !self.obj(f0.id()).is_buf() && !self.obj(f1.id()).is_buf() {
                        continue;
                    }
                    let r0 = self.obj_real(f0);
                    let r1 = self.obj_real(f1);
                    let new = self.oper(kind, r0, r1);
                    self.replace(id, new, false, false);
                }
                _ => {}
            }
        }
    }
}
