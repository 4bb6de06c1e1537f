//! Maximum fanout-free cone measurement.
//!
//! Rewriting clients size the cone a node exclusively owns by dereferencing
//! its fanins recursively, counting how many gates hit zero references, and
//! then restoring the counts with the mirror recursion.

use super::Aig;
use crate::obj::ObjId;

impl Aig {
    /// Drops the references the cone of `id` holds; returns how many gates
    /// became unreferenced. Must be paired with [`Aig::node_ref_rec`].
    pub fn node_deref_rec(&mut self, id: ObjId) -> usize {
        let obj = self.obj(id);
        if !obj.is_node() {
            return 0;
        }
        let fan0 = obj.fanin0.expect("gate fanin").id();
        let fan1 = obj.fanin1.expect("gate fanin").id();
        let mut counter = 1;
        for t in [fan0, fan1] {
            let refs = &mut self.obj_mut(t).refs;
            debug_assert!(*refs > 0);
            *refs -= 1;
            if self.obj(t).refs == 0 {
                counter += self.node_deref_rec(t);
            }
        }
        counter
    }

    /// Restores the references dropped by [`Aig::node_deref_rec`].
    pub fn node_ref_rec(&mut self, id: ObjId) -> usize {
        let obj = self.obj(id);
        if !obj.is_node() {
            return 0;
        }
        let fan0 = obj.fanin0.expect("gate fanin").id();
        let fan1 = obj.fanin1.expect("gate fanin").id();
        let mut counter = 1;
        for t in [fan0, fan1] {
            if self.obj(t).refs == 0 {
                counter += self.node_ref_rec(t);
            }
            self.obj_mut(t).refs += 1;
        }
        counter
    }

    /// Size of the maximum fanout-free cone of a gate: the gates that die
    /// with it when it is deleted recursively.
    pub fn mffc_size(&mut self, id: ObjId) -> usize {
        debug_assert!(self.obj(id).is_node());
        let size = self.node_deref_rec(id);
        let restored = self.node_ref_rec(id);
        debug_assert_eq!(size, restored);
        size
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn mffc_excludes_shared_cones() {
        let mut aig = Aig::start(None);
        let a = aig.ith_var(0);
        let b = aig.ith_var(1);
        let c = aig.ith_var(2);
        let ab = aig.and(a, b);
        let abc = aig.and(ab, c);
        let other = aig.and(ab, a);
        aig.create_po(abc);
        aig.create_po(other);
        // `ab` is shared, so the MFFC of `abc` is just `abc`
        assert_eq!(aig.mffc_size(abc.id()), 1);
        // reference counts restored
        aig.check().unwrap();
    }

    #[test]
    fn mffc_covers_exclusive_cone() {
        let mut aig = Aig::start(None);
        let a = aig.ith_var(0);
        let b = aig.ith_var(1);
        let c = aig.ith_var(2);
        let ab = aig.and(a, b);
        let abc = aig.and(ab, c);
        aig.create_po(abc);
        assert_eq!(aig.mffc_size(abc.id()), 2);
        aig.check().unwrap();
    }
}
