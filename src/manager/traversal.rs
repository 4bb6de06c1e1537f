//! Traversal IDs and scratch-mark hygiene.
//!
//! A pass marks objects as visited by stamping them with the manager's
//! current traversal ID, giving an O(1) "seen this pass" test without
//! allocating a visited set. Two one-bit marks serve short-lived traversals
//! that would otherwise interleave nested IDs; whoever sets them clears them
//! before returning.

use super::Aig;
use crate::consts::TRAV_ID_MAX;
use crate::obj::ObjId;

impl Aig {
    /// Opens a new traversal. At the counter ceiling every object's stamp is
    /// cleared in one sweep instead of letting the counter wrap.
    pub fn increment_trav_id(&mut self) {
        if self.trav_ids >= TRAV_ID_MAX {
            for id in self.live_ids() {
                self.obj_mut(id).trav_id = 0;
            }
            self.trav_ids = 0;
        }
        self.trav_ids += 1;
    }

    pub fn set_trav_id_current(&mut self, id: ObjId) {
        let stamp = self.trav_ids;
        self.obj_mut(id).trav_id = stamp;
    }

    pub fn set_trav_id_previous(&mut self, id: ObjId) {
        let stamp = self.trav_ids - 1;
        self.obj_mut(id).trav_id = stamp;
    }

    pub fn is_trav_id_current(&self, id: ObjId) -> bool {
        self.obj(id).trav_id == self.trav_ids
    }

    pub fn is_trav_id_previous(&self, id: ObjId) -> bool {
        self.obj(id).trav_id == self.trav_ids - 1
    }

    /// Clears both scratch marks on every live object.
    pub fn clean_marks(&mut self) {
        for id in self.live_ids() {
            let obj = self.obj_mut(id);
            obj.mark_a = false;
            obj.mark_b = false;
        }
    }

    /// Recomputes every reference counter from the stored fanins.
    pub fn reset_refs(&mut self) {
        for id in self.live_ids() {
            self.obj_mut(id).refs = 0;
        }
        for id in self.live_ids() {
            let fan0 = self.obj(id).fanin0;
            let fan1 = self.obj(id).fanin1;
            for f in [fan0, fan1].into_iter().flatten() {
                self.obj_mut(f.id()).refs += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::consts::TRAV_ID_MAX;
    use crate::prelude::*;

    #[test]
    fn trav_id_distinguishes_passes() {
        let mut aig = Aig::start(None);
        let x = aig.ith_var(0);
        aig.increment_trav_id();
        assert!(!aig.is_trav_id_current(x.id()));
        aig.set_trav_id_current(x.id());
        assert!(aig.is_trav_id_current(x.id()));
        aig.increment_trav_id();
        assert!(!aig.is_trav_id_current(x.id()));
        assert!(aig.is_trav_id_previous(x.id()));
    }

    #[test]
    fn trav_id_ceiling_clears_stamps() {
        let mut aig = Aig::start(None);
        let x = aig.ith_var(0);
        aig.trav_ids = TRAV_ID_MAX;
        aig.set_trav_id_current(x.id());
        aig.increment_trav_id();
        assert_eq!(aig.obj(x.id()).trav_id(), 0);
        assert!(!aig.is_trav_id_current(x.id()));
    }

    #[test]
    fn reset_refs_matches_incremental_counts() {
        let mut aig = Aig::start(None);
        let x = aig.ith_var(0);
        let y = aig.ith_var(1);
        let g = aig.and(x, y);
        aig.create_po(g);
        aig.create_po(g);
        let before: Vec<u32> = aig.live_ids().iter().map(|&i| aig.obj(i).refs()).collect();
        aig.reset_refs();
        let after: Vec<u32> = aig.live_ids().iter().map(|&i| aig.obj(i).refs()).collect();
        assert_eq!(before, after);
    }
}
