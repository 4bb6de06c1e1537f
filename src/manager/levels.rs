//! Level and phase maintenance, and the optional reverse-level index.
//!
//! Levels are filled in on connect; replacement with level updating enabled
//! re-evaluates the affected transitive fanout cone to fixpoint through the
//! fanout index. The reverse-level index tracks the longest path from each
//! object to any primary output and backs required-time queries of
//! timing-aware rewriters.

use super::Aig;
use crate::obj::{ObjId, ObjKind};

impl Aig {
    /// The level implied by an object's current fanins.
    pub(crate) fn level_new(&self, id: ObjId) -> u32 {
        let obj = self.obj(id);
        match (obj.fanin0, obj.fanin1) {
            (Some(f0), Some(f1)) => {
                1 + (obj.kind == ObjKind::Exor) as u32
                    + self.edge_level(f0).max(self.edge_level(f1))
            }
            (Some(f0), None) => self.edge_level(f0),
            _ => 0,
        }
    }

    /// The phase implied by an object's current fanins.
    pub(crate) fn phase_new(&self, id: ObjId) -> bool {
        let obj = self.obj(id);
        match (obj.fanin0, obj.fanin1) {
            (Some(f0), Some(f1)) => match obj.kind {
                ObjKind::Exor => self.edge_phase(f0) ^ self.edge_phase(f1),
                _ => self.edge_phase(f0) & self.edge_phase(f1),
            },
            (Some(f0), None) => self.edge_phase(f0),
            _ => obj.phase,
        }
    }

    /// Maximum driver level over the primary outputs.
    pub fn levels(&self) -> u32 {
        self.pos
            .iter()
            .filter_map(|&po| self.obj(po).fanin0)
            .map(|f| self.edge_level(f))
            .max()
            .unwrap_or(0)
    }

    /// Re-evaluates stored levels in the transitive fanout of `root` until
    /// they match their fanins again. Requires the fanout index.
    pub fn update_level(&mut self, root: ObjId) {
        assert!(self.fanout.is_some(), "level updates need the fanout index");
        let mut queue: Vec<ObjId> = vec![root];
        while let Some(id) = queue.pop() {
            let fresh = self.level_new(id);
            if self.obj(id).level != fresh {
                self.obj_mut(id).level = fresh;
            } else if id != root {
                continue;
            }
            for fanout in self.fanout_ids(id) {
                queue.push(fanout);
            }
        }
    }

    /// Starts the reverse-level index. `max_level_increase` is slack added
    /// to the current depth when answering required-level queries.
    pub fn start_reverse_levels(&mut self, max_level_increase: u32) {
        debug_assert!(self.level_r.is_none(), "reverse levels already started");
        let mut level_r = vec![0u32; self.obj_id_max()];
        // longest path to any PO, processed fanouts-first
        let order = self.dfs();
        for &id in order.iter().rev() {
            let lr = level_r[id as usize];
            let cost = self.reverse_cost(id);
            let fan0 = self.obj(id).fanin0;
            let fan1 = self.obj(id).fanin1;
            for f in [fan0, fan1].into_iter().flatten() {
                let t = f.id() as usize;
                level_r[t] = level_r[t].max(lr + cost);
            }
        }
        self.level_max = self.levels() + max_level_increase;
        self.level_r = Some(level_r);
    }

    pub fn stop_reverse_levels(&mut self) {
        self.level_r = None;
        self.level_max = 0;
    }

    /// Longest path from the object to any primary output.
    pub fn reverse_level(&self, id: ObjId) -> u32 {
        self.level_r.as_ref().expect("reverse levels not started")[id as usize]
    }

    /// The deepest level this object may move to without pushing any output
    /// past the allowed depth.
    pub fn required_level(&self, id: ObjId) -> u32 {
        let lr = self.reverse_level(id);
        self.level_max.saturating_sub(lr)
    }

    /// Re-evaluates reverse levels in the transitive fanin of `root` until
    /// they match their fanouts again. Requires the fanout index.
    pub fn update_reverse_level(&mut self, root: ObjId) {
        assert!(self.fanout.is_some(), "reverse-level updates need the fanout index");
        assert!(self.level_r.is_some(), "reverse levels not started");
        let mut queue: Vec<ObjId> = vec![root];
        while let Some(id) = queue.pop() {
            let fresh = self.reverse_level_new(id);
            let level_r = self.level_r.as_mut().expect("reverse levels present");
            if level_r[id as usize] != fresh {
                level_r[id as usize] = fresh;
            } else if id != root {
                continue;
            }
            let fan0 = self.obj(id).fanin0;
            let fan1 = self.obj(id).fanin1;
            for f in [fan0, fan1].into_iter().flatten() {
                queue.push(f.id());
            }
        }
    }

    /// Reverse level implied by the object's current fanouts.
    fn reverse_level_new(&self, id: ObjId) -> u32 {
        let level_r = self.level_r.as_ref().expect("reverse levels present");
        self.fanout
            .as_ref()
            .expect("fanout index present")
            .fanouts(id)
            .map(|(f, _)| level_r[f as usize] + self.reverse_cost(f))
            .max()
            .unwrap_or(0)
    }

    /// Depth an object adds on a path through it.
    fn reverse_cost(&self, id: ObjId) -> u32 {
        match self.obj(id).kind {
            ObjKind::And => 1,
            ObjKind::Exor => 2,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn levels_follow_construction() {
        let mut aig = Aig::start(None);
        let a = aig.ith_var(0);
        let b = aig.ith_var(1);
        let c = aig.ith_var(2);
        let ab = aig.and(a, b);
        let abc = aig.and(ab, c);
        aig.create_po(abc);
        assert_eq!(aig.edge_level(ab), 1);
        assert_eq!(aig.edge_level(abc), 2);
        assert_eq!(aig.levels(), 2);
    }

    #[test]
    fn exor_costs_two_levels() {
        let mut aig = Aig::with_exor_capture(None);
        let a = aig.ith_var(0);
        let b = aig.ith_var(1);
        let x = aig.exor(a, b);
        assert_eq!(aig.edge_level(x), 2);
    }

    #[test]
    fn replacement_lowers_fanout_levels_to_fixpoint() {
        let mut aig = Aig::start(None);
        let a = aig.ith_var(0);
        let b = aig.ith_var(1);
        let c = aig.ith_var(2);
        let d = aig.ith_var(3);
        // a deep chain feeding a consumer
        let t1 = aig.and(a, b);
        let t2 = aig.and(t1, c);
        let t3 = aig.and(t2, d);
        let top = aig.and(t3, a);
        aig.create_po(top);
        aig.create_fanout();
        // replace the chain by a flat gate; consumer levels must drop
        let flat = aig.and(a, d);
        aig.replace(t3.id(), flat, false, true);
        assert_eq!(aig.obj(t3.id()).level(), 1);
        assert_eq!(aig.obj(top.id()).level(), 2);
        aig.check().unwrap();
        aig.check_levels().unwrap();
    }

    #[test]
    fn reverse_levels_measure_path_to_output() {
        let mut aig = Aig::start(None);
        let a = aig.ith_var(0);
        let b = aig.ith_var(1);
        let c = aig.ith_var(2);
        let ab = aig.and(a, b);
        let abc = aig.and(ab, c);
        aig.create_po(abc);
        aig.start_reverse_levels(0);
        assert_eq!(aig.reverse_level(abc.id()), 0);
        assert_eq!(aig.reverse_level(ab.id()), 1);
        assert_eq!(aig.reverse_level(a.id()), 2);
        assert_eq!(aig.required_level(ab.id()), 1);
        aig.stop_reverse_levels();
    }
}
