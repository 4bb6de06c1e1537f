//! Consistency checking.

use super::Aig;
use crate::error::CheckError;

impl Aig {
    /// Verifies the structural invariants: terminal shape, fanin ordering,
    /// strash canonicity, reference counts, scratch marks, and the
    /// object/table bookkeeping. Returns the first violation. Levels and
    /// phases have their own audit in [`Aig::check_levels`].
    pub fn check(&self) -> Result<(), CheckError> {
        for &pi in &self.pis {
            let obj = self.obj(pi);
            if obj.fanin0.is_some() || obj.fanin1.is_some() {
                return Err(CheckError::PiWithFanin(pi));
            }
        }
        for &po in &self.pos {
            let obj = self.obj(po);
            if obj.fanin0.is_none() {
                return Err(CheckError::PoWithoutDriver(po));
            }
            if obj.fanin1.is_some() {
                return Err(CheckError::PoWithSecondFanin(po));
            }
        }
        let mut live = 0u32;
        let mut refs = vec![0u32; self.obj_id_max()];
        for id in self.obj_ids() {
            live += 1;
            let obj = self.obj(id);
            for f in [obj.fanin0, obj.fanin1].into_iter().flatten() {
                refs[f.id() as usize] += 1;
            }
            if obj.mark_a || obj.mark_b {
                return Err(CheckError::DirtyMark(id));
            }
            if obj.is_node() {
                let (f0, f1) = match (obj.fanin0, obj.fanin1) {
                    (Some(f0), Some(f1)) => (f0, f1),
                    _ => return Err(CheckError::NodeWithoutFanin(id)),
                };
                if f0.id() >= f1.id() {
                    return Err(CheckError::UnsortedFanins(id));
                }
            }
            if obj.is_hashable() && self.table_lookup(&self.node_key(id)) != Some(id) {
                return Err(CheckError::NotInTable(id));
            }
        }
        for id in self.obj_ids() {
            let stored = self.obj(id).refs;
            let counted = refs[id as usize];
            if stored != counted {
                return Err(CheckError::WrongRefs { id, stored, counted });
            }
        }
        if live != self.created - self.deleted {
            return Err(CheckError::WrongObjCount {
                live,
                created: self.created,
                deleted: self.deleted,
            });
        }
        let entries = self.table_count_entries() as u32;
        let hashable = self.table_entries() as u32;
        if entries != hashable {
            return Err(CheckError::WrongTableCount { entries, hashable });
        }
        Ok(())
    }

    /// Audits stored levels and phases against the values the fanins imply.
    ///
    /// Levels go stale by design when `replace` runs without level updating,
    /// and are combinational notions to begin with, so this audit is
    /// separate from [`Aig::check`] and only meaningful on latch-free
    /// managers that have not been rewired level-blind.
    pub fn check_levels(&self) -> Result<(), CheckError> {
        assert_eq!(self.latch_num(), 0, "level audit is combinational");
        for id in self.obj_ids() {
            let obj = self.obj(id);
            if obj.fanin0.is_none() {
                continue;
            }
            let computed = self.level_new(id);
            if obj.level != computed {
                return Err(CheckError::WrongLevel {
                    id,
                    stored: obj.level,
                    computed,
                });
            }
            if obj.phase != self.phase_new(id) {
                return Err(CheckError::WrongPhase { id });
            }
        }
        Ok(())
    }
}
