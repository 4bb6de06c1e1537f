//! Sequential strashing.
//!
//! Turns a combinational manager whose trailing PI/PO pairs stand for
//! registers into a sequential one with explicit latch nodes, then chases
//! buffer chains out of existence by rehashing their fanouts until a full
//! pass changes nothing. Nodes unreachable from the primary inputs are
//! never rewritten: their buffer chains may be circular.

use crate::error::{AigError, CheckError};
use crate::manager::Aig;
use crate::obj::{ObjId, ObjKind};

/// Initial value of a converted latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Init {
    Zero,
    One,
    /// Unknown initial state; hashed like a zero-initialized latch.
    DontCare,
}

impl Aig {
    /// Converts the last `n_latches` PI/PO pairs into latches and rehashes
    /// until no buffer remains on any path from the inputs. `inits` supplies
    /// one initial value per latch; an empty slice means all-zero.
    ///
    /// Returns the consistency report of the rewritten manager, `None` when
    /// it checks clean. The refinement loop is bounded by the live object
    /// count; running into the bound is itself reported.
    pub fn seq_strash(
        &mut self,
        n_latches: usize,
        inits: &[Init],
    ) -> Result<Option<CheckError>, AigError> {
        if !inits.is_empty() && inits.len() != n_latches {
            return Err(AigError::InitVectorLength {
                given: inits.len(),
                latches: n_latches,
            });
        }
        assert!(self.buf_num() == 0, "sequential strashing expects a buffer-free input");
        assert!(n_latches <= self.pi_num() && n_latches <= self.po_num());
        self.seq_convert(n_latches, inits);

        let bound = self.obj_num() + 1;
        let mut changed = true;
        let mut iterations = 0usize;
        while changed {
            iterations += 1;
            if iterations > bound {
                tracing::warn!(iterations, "sequential strashing exceeded its bound");
                return Ok(Some(CheckError::SeqStrashDiverged { iterations }));
            }
            let unreach = self.seq_unreachable();
            if iterations == 1 && !unreach.is_empty() {
                tracing::debug!(count = unreach.len(), "objects unreachable from inputs");
            }
            let order = self.dfs();
            if iterations == 1 {
                self.seq_remove_unmarked();
            }
            changed = self.seq_rehash_one(&order, &unreach);
            tracing::trace!(iteration = iterations, changed, "sequential strash pass");
        }

        // final sweep: everything the outputs no longer reach goes away
        self.dfs();
        self.seq_remove_unmarked();
        Ok(self.check_report())
    }

    /// Creates one latch per trailing PI/PO pair: the latch adopts the PO's
    /// driver, the PO slot is recycled, and the PI is re-typed into a buffer
    /// fed by the latch so its fanouts stay wired.
    fn seq_convert(&mut self, n_latches: usize, inits: &[Init]) {
        let po_base = self.pos.len() - n_latches;
        let pi_base = self.pis.len() - n_latches;
        for i in 0..n_latches {
            let li = self.pos[po_base + i];
            let lo = self.pis[pi_base + i];
            let init = inits.get(i).copied().unwrap_or(Init::Zero);
            let driver = self.obj(li).fanin0().expect("po without driver");
            let latch = self.latch(driver, init);
            // retire the PO object without touching its driver's cone
            self.disconnect(li);
            self.n_objs[ObjKind::Po as usize] -= 1;
            self.recycle_obj(li);
            // the PI becomes a buffer over the latch
            self.obj_mut(lo).kind = ObjKind::Buf;
            self.connect(lo, Some(latch), None);
            self.bufs.push(lo);
            self.n_objs[ObjKind::Pi as usize] -= 1;
            self.n_objs[ObjKind::Buf as usize] += 1;
        }
        let pi_keep = self.pis.len() - n_latches;
        let po_keep = self.pos.len() - n_latches;
        self.pis.truncate(pi_keep);
        self.pos.truncate(po_keep);
    }

    /// Objects on no path from the primary inputs or the constant, found
    /// with a two-stamp scheme (current = reachable, previous = unknown)
    /// and refined until stable.
    fn seq_unreachable(&mut self) -> Vec<ObjId> {
        self.increment_trav_id();
        self.increment_trav_id();
        self.set_trav_id_previous(0);
        for i in 0..self.pis.len() {
            let pi = self.pis[i];
            self.set_trav_id_current(pi);
        }
        let mut candidates = Vec::new();
        for i in 0..self.pos.len() {
            let po = self.pos[i];
            if let Some(driver) = self.obj(po).fanin0() {
                self.seq_unreach_rec(driver.id(), &mut candidates);
            }
        }
        // a candidate becomes reachable once any fanin is; repeat until a
        // pass no longer promotes anything
        loop {
            let before = candidates.len();
            let mut kept = Vec::with_capacity(before);
            for &id in &candidates {
                debug_assert!(self.is_trav_id_previous(id));
                let reachable = {
                    let obj = self.obj(id);
                    let fan0 = obj.fanin0();
                    let fan1 = obj.fanin1();
                    [fan0, fan1]
                        .into_iter()
                        .flatten()
                        .any(|f| self.is_trav_id_current(f.id()))
                };
                if reachable {
                    self.set_trav_id_current(id);
                } else {
                    kept.push(id);
                }
            }
            let stable = kept.len() == before;
            candidates = kept;
            if stable {
                break;
            }
        }
        candidates
    }

    fn seq_unreach_rec(&mut self, id: ObjId, candidates: &mut Vec<ObjId>) {
        if self.is_trav_id_previous(id) || self.is_trav_id_current(id) {
            return;
        }
        // assume unknown until a fanin proves reachability
        self.set_trav_id_previous(id);
        let obj = self.obj(id);
        let fan0 = obj.fanin0();
        let fan1 = obj.fanin1();
        for f in [fan0, fan1].into_iter().flatten() {
            self.seq_unreach_rec(f.id(), candidates);
        }
        let known_reachable = [fan0, fan1]
            .into_iter()
            .flatten()
            .any(|f| self.is_trav_id_current(f.id()));
        if known_reachable {
            self.set_trav_id_current(id);
        } else {
            candidates.push(id);
        }
    }

    /// Disconnects and deletes every non-terminal object the last traversal
    /// did not stamp; returns how many went away.
    fn seq_remove_unmarked(&mut self) -> usize {
        let mut doomed = Vec::new();
        for id in self.live_ids() {
            let obj = self.obj(id);
            if obj.is_terminal() || self.is_trav_id_current(id) {
                continue;
            }
            doomed.push(id);
        }
        for &id in &doomed {
            self.disconnect(id);
        }
        for &id in &doomed {
            self.delete(id);
        }
        if !doomed.is_empty() {
            tracing::debug!(count = doomed.len(), "removed objects unreachable from outputs");
        }
        doomed.len()
    }

    /// One buffer-forwarding pass over `order` (outputs included via the PO
    /// array), skipping the unreachable set. Returns whether anything
    /// changed.
    fn seq_rehash_one(&mut self, order: &[ObjId], unreach: &[ObjId]) -> bool {
        self.increment_trav_id();
        for &id in unreach {
            if self.try_obj(id).is_some() {
                self.set_trav_id_current(id);
            }
        }
        let mut changed = false;
        for i in 0..self.pos.len() {
            let po = self.pos[i];
            let driver = self.obj(po).fanin0().expect("po without driver");
            if !self.obj(driver.id()).is_buf() {
                continue;
            }
            let real = self.obj_real(driver);
            self.patch_fanin0(po, real);
            self.n_buf_fixes += 1;
        }
        for &id in order {
            if self.try_obj(id).is_none() || self.is_trav_id_current(id) {
                continue;
            }
            let (kind, fan0, fan1) = {
                let obj = self.obj(id);
                (obj.kind(), obj.fanin0(), obj.fanin1())
            };
            match kind {
                ObjKind::Latch => {
                    let f0 = fan0.expect("latch fanin");
                    if !self.obj(f0.id()).is_buf() {
                        continue;
                    }
                    let real = self.obj_real(f0);
                    let new = self.latch(real, Init::Zero);
                    self.replace(id, new, true, false);
                    self.n_buf_fixes += 1;
                    changed = true;
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
                    self.replace(id, new, true, false);
                    self.n_buf_fixes += 1;
                    changed = true;
                }
                _ => {}
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn zero_latches_is_structural_noop() {
        let mut aig = Aig::start(None);
        let a = aig.ith_var(0);
        let b = aig.ith_var(1);
        let g = aig.and(a, b);
        aig.create_po(g);
        let nodes = aig.node_num();
        let pis = aig.pi_num();
        let pos = aig.po_num();
        let report = aig.seq_strash(0, &[]).unwrap();
        assert!(report.is_none());
        assert_eq!(aig.node_num(), nodes);
        assert_eq!(aig.pi_num(), pis);
        assert_eq!(aig.po_num(), pos);
        assert_eq!(aig.buf_num(), 0);
    }

    #[test]
    fn init_vector_length_is_enforced() {
        let mut aig = Aig::start(None);
        let a = aig.ith_var(0);
        aig.create_po(a);
        aig.create_po(a);
        assert!(aig.seq_strash(1, &[Init::Zero, Init::One]).is_err());
    }
}
