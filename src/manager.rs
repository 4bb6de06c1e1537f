//! [`Aig`] manager implementation.

use crate::consts::*;
use crate::edge::Edge;
use crate::error::CheckError;
use crate::mem::FixedPool;
use crate::obj::{Obj, ObjId, ObjKind};

use strum::EnumCount;

mod check;
mod dfs;
mod fanout;
mod levels;
mod lifecycle;
mod mffc;
mod oper;
mod table;
mod traversal;

pub use fanout::FanoutIndex;
pub(crate) use table::StrashKey;

/// AIG manager.
///
/// Owns the object pool and the dense id-addressed store over it, the
/// insertion-ordered PI/PO/buffer arrays, the structural hash table that
/// keeps one representative per canonical `(kind, fanins, phases)` key, the
/// traversal-ID counter, and the optional fanout and reverse-level indices.
///
/// A manager is owned by one task at a time; every operation completes
/// before returning. Construction through the operator constructors is
/// idempotent up to structural equality, so two equivalent construction
/// sequences produce identical graphs.
#[derive(Debug, Clone)]
pub struct Aig {
    pub(crate) pool: FixedPool<Obj>,
    /// Dense id -> pool-slot map; recycled ids keep a `None` slot forever.
    pub(crate) store: Vec<Option<u32>>,
    pub(crate) pis: Vec<ObjId>,
    pub(crate) pos: Vec<ObjId>,
    pub(crate) bufs: Vec<ObjId>,
    pub(crate) n_objs: [u32; ObjKind::COUNT],
    pub(crate) created: u32,
    pub(crate) deleted: u32,
    /// Strash bucket heads; chains continue through `Obj::next`.
    pub(crate) buckets: Vec<Option<ObjId>>,
    pub(crate) fanout: Option<FanoutIndex>,
    pub(crate) trav_ids: u32,
    pub(crate) catch_exor: bool,
    /// Reverse-level index, present between `start_reverse_levels` and
    /// `stop_reverse_levels`.
    pub(crate) level_r: Option<Vec<u32>>,
    pub(crate) level_max: u32,
    // buffer bookkeeping maintained by `replace`
    pub(crate) n_buf_replaces: u32,
    pub(crate) n_buf_fixes: u32,
    pub(crate) n_buf_max: u32,
}

/// Point-in-time object counts of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub pis: usize,
    pub pos: usize,
    pub latches: usize,
    pub bufs: usize,
    pub ands: usize,
    pub exors: usize,
    pub levels: u32,
    pub created: u32,
    pub deleted: u32,
}

impl Aig {
    /// Starts a manager. `hint` is a soft bound on the expected number of
    /// nodes; it sizes the object pool and the strash table.
    pub fn start(hint: Option<usize>) -> Self {
        let hint = match hint {
            Some(n) if n > 0 => n,
            _ => DEFAULT_NODE_HINT,
        };
        let mut aig = Aig {
            pool: FixedPool::new(hint),
            store: Vec::with_capacity(hint),
            pis: Vec::new(),
            pos: Vec::new(),
            bufs: Vec::new(),
            n_objs: [0; ObjKind::COUNT],
            created: 0,
            deleted: 0,
            buckets: vec![None; table::prime(hint)],
            fanout: None,
            trav_ids: 1,
            catch_exor: false,
            level_r: None,
            level_max: 0,
            n_buf_replaces: 0,
            n_buf_fixes: 0,
            n_buf_max: 0,
        };
        // the constant node is always object 0
        let id = aig.fetch_obj();
        debug_assert_eq!(id, 0);
        let obj = aig.obj_mut(id);
        obj.kind = ObjKind::Const1;
        obj.phase = true;
        aig.n_objs[ObjKind::Const1 as usize] += 1;
        aig
    }

    /// Starts a manager whose `and` constructor folds the two-level
    /// AND-of-complemented-ANDs shape into a single EXOR node. The flag is
    /// fixed for the manager's lifetime because it changes the canonical key
    /// class of every subsequent strash lookup.
    pub fn with_exor_capture(hint: Option<usize>) -> Self {
        let mut aig = Aig::start(hint);
        aig.catch_exor = true;
        aig
    }

    /// Starts a new manager with the same primary-input structure.
    pub fn start_from(&self) -> Self {
        let mut new = Aig::start(Some(self.obj_id_max()));
        new.catch_exor = self.catch_exor;
        for &pi in &self.pis {
            let level = self.obj(pi).level;
            let id = new.create_pi().id();
            new.obj_mut(id).level = level;
        }
        new
    }

    /// Stops the manager, asserting that every scratch mark was cleared by
    /// the pass that set it. Dropping the manager without this check is the
    /// cancellation path.
    pub fn stop(self) {
        for id in self.live_ids() {
            let obj = self.obj(id);
            assert!(!obj.mark_a && !obj.mark_b, "object {id} dropped with a dirty mark");
        }
    }

    /// Allocates a fresh object slot and assigns the next id.
    pub(crate) fn fetch_obj(&mut self) -> ObjId {
        let slot = self.pool.fetch();
        let id = self.created;
        self.created += 1;
        self.store.push(Some(slot));
        debug_assert_eq!(self.store.len(), self.created as usize);
        self.obj_mut(id).id = id;
        if let Some(fanout) = &mut self.fanout {
            fanout.grow(self.created as usize);
        }
        id
    }

    /// Returns the slot of a dead object to the pool. The id stays burned.
    pub(crate) fn recycle_obj(&mut self, id: ObjId) {
        let slot = self.store[id as usize].take().expect("object already recycled");
        debug_assert_eq!(self.pool.slot(slot).refs, 0);
        self.pool.slot_mut(slot).kind = ObjKind::None;
        self.pool.recycle(slot);
        self.deleted += 1;
    }

    pub fn obj(&self, id: ObjId) -> &Obj {
        let slot = self.store[id as usize].expect("dead object");
        self.pool.slot(slot)
    }

    pub(crate) fn obj_mut(&mut self, id: ObjId) -> &mut Obj {
        let slot = self.store[id as usize].expect("dead object");
        self.pool.slot_mut(slot)
    }

    /// The object, or `None` when the id refers to a recycled slot.
    pub fn try_obj(&self, id: ObjId) -> Option<&Obj> {
        self.store
            .get(id as usize)
            .copied()
            .flatten()
            .map(|slot| self.pool.slot(slot))
    }

    pub const fn const1(&self) -> Edge {
        Edge::CONST1
    }

    pub const fn const0(&self) -> Edge {
        Edge::CONST0
    }

    pub fn pi(&self, i: usize) -> ObjId {
        self.pis[i]
    }

    pub fn po(&self, i: usize) -> ObjId {
        self.pos[i]
    }

    pub fn pis(&self) -> &[ObjId] {
        &self.pis
    }

    pub fn pos(&self) -> &[ObjId] {
        &self.pos
    }

    pub fn pi_num(&self) -> usize {
        self.n_objs[ObjKind::Pi as usize] as usize
    }

    pub fn po_num(&self) -> usize {
        self.n_objs[ObjKind::Po as usize] as usize
    }

    pub fn buf_num(&self) -> usize {
        self.n_objs[ObjKind::Buf as usize] as usize
    }

    pub fn and_num(&self) -> usize {
        self.n_objs[ObjKind::And as usize] as usize
    }

    pub fn exor_num(&self) -> usize {
        self.n_objs[ObjKind::Exor as usize] as usize
    }

    pub fn latch_num(&self) -> usize {
        self.n_objs[ObjKind::Latch as usize] as usize
    }

    /// AND plus EXOR gates.
    pub fn node_num(&self) -> usize {
        self.and_num() + self.exor_num()
    }

    /// Synthesis cost estimate: an EXOR weighs as three ANDs.
    pub fn get_cost(&self) -> usize {
        self.and_num() + 3 * self.exor_num()
    }

    /// Live objects, the constant node included.
    pub fn obj_num(&self) -> usize {
        (self.created - self.deleted) as usize
    }

    /// One past the largest id ever assigned; sizes id-keyed side tables.
    pub fn obj_id_max(&self) -> usize {
        self.store.len()
    }

    pub const fn exor_capture(&self) -> bool {
        self.catch_exor
    }

    /// How many replacements fell back to a buffer, and how many buffer
    /// forwardings later resolved them.
    pub const fn buf_churn(&self) -> (u32, u32) {
        (self.n_buf_replaces, self.n_buf_fixes)
    }

    /// High-water mark of live buffers over the manager's lifetime.
    pub const fn buf_peak(&self) -> u32 {
        self.n_buf_max
    }

    /// Ids of all live objects, in id order.
    pub fn live_ids(&self) -> Vec<ObjId> {
        self.obj_ids().collect()
    }

    pub fn obj_ids(&self) -> impl Iterator<Item = ObjId> + '_ {
        self.store
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(id, _)| id as ObjId)
    }

    /// Ids of live AND/EXOR gates, in id order.
    pub fn node_ids(&self) -> impl Iterator<Item = ObjId> + '_ {
        self.obj_ids().filter(|&id| self.obj(id).is_node())
    }

    /// Phase of the function an edge denotes under the all-zero assignment.
    pub fn edge_phase(&self, e: Edge) -> bool {
        self.obj(e.id()).phase ^ e.is_complement()
    }

    pub fn edge_level(&self, e: Edge) -> u32 {
        self.obj(e.id()).level
    }

    /// Removes all dangling AND/EXOR cones; returns how many gates went away.
    pub fn cleanup(&mut self) -> usize {
        let before = self.node_num();
        let roots: Vec<ObjId> = self
            .node_ids()
            .filter(|&id| self.obj(id).refs == 0)
            .collect();
        for root in roots {
            if self.try_obj(root).is_some() {
                self.delete_rec(root, true);
            }
        }
        let removed = before - self.node_num();
        if removed > 0 {
            tracing::debug!(removed, "cleanup removed dangling nodes");
        }
        removed
    }

    /// Snapshot of the object counts.
    pub fn stats(&self) -> Stats {
        Stats {
            pis: self.pi_num(),
            pos: self.po_num(),
            latches: self.latch_num(),
            bufs: self.buf_num(),
            ands: self.and_num(),
            exors: self.exor_num(),
            levels: self.levels(),
            created: self.created,
            deleted: self.deleted,
        }
    }

    /// Emits the stats snapshot through `tracing`.
    pub fn log_stats(&self) {
        let s = self.stats();
        tracing::info!(
            pis = s.pis,
            pos = s.pos,
            latches = s.latches,
            bufs = s.bufs,
            ands = s.ands,
            exors = s.exors,
            levels = s.levels,
            "aig stats"
        );
    }

    /// Duplicates the manager. With `ordered` set, objects are copied in
    /// stable id order (idempotent on isomorphism checks); otherwise the
    /// copy is rebuilt fanin-first from the primary outputs, dropping
    /// anything unreachable.
    pub fn dup(&self, ordered: bool) -> Aig {
        let mut new = Aig::start(Some(self.obj_id_max()));
        new.catch_exor = self.catch_exor;
        let mut map: Vec<Option<Edge>> = vec![None; self.obj_id_max()];
        map[0] = Some(new.const1());
        if ordered {
            for id in self.obj_ids() {
                let obj = self.obj(id);
                let copied = match obj.kind {
                    ObjKind::Const1 => new.const1(),
                    ObjKind::Pi => {
                        let level = obj.level;
                        let pi = new.create_pi();
                        let pi_id = pi.id();
                        new.obj_mut(pi_id).level = level;
                        pi
                    }
                    ObjKind::Po => {
                        let driver = self.mapped_fanin0(&map, id);
                        let po = new.create_po(driver);
                        Edge::new(po, false)
                    }
                    ObjKind::Buf => self.mapped_fanin0(&map, id),
                    ObjKind::And | ObjKind::Exor => {
                        let f0 = self.mapped_fanin0(&map, id);
                        let f1 = self.mapped_fanin1(&map, id);
                        new.oper(obj.kind, f0, f1)
                    }
                    ObjKind::Latch => {
                        let f0 = self.mapped_fanin0(&map, id);
                        new.latch(f0, crate::seq::Init::Zero)
                    }
                    ObjKind::None | ObjKind::Void => unreachable!("dead object iterated"),
                };
                map[id as usize] = Some(copied);
            }
        } else {
            for &pi in &self.pis {
                let level = self.obj(pi).level;
                let copied = new.create_pi();
                let pi_id = copied.id();
                new.obj_mut(pi_id).level = level;
                map[pi as usize] = Some(copied);
            }
            for i in 0..self.pos.len() {
                let po = self.pos[i];
                let driver = self.obj(po).fanin0.expect("po without driver");
                self.dup_rec(&mut new, &mut map, driver.id());
                let copied = map[driver.id() as usize].expect("driver mapped").not_if(driver.is_complement());
                new.create_po(copied);
            }
        }
        if let Err(e) = new.check() {
            tracing::warn!(error = %e, "dup produced an inconsistent manager");
        }
        new
    }

    fn dup_rec(&self, new: &mut Aig, map: &mut Vec<Option<Edge>>, id: ObjId) {
        if map[id as usize].is_some() {
            return;
        }
        let obj = self.obj(id);
        let f0 = obj.fanin0.expect("interior object with no fanin");
        self.dup_rec(new, map, f0.id());
        if obj.is_buf() || obj.is_latch() {
            let copied = map[f0.id() as usize].expect("fanin mapped").not_if(f0.is_complement());
            let copied = if obj.is_latch() {
                new.latch(copied, crate::seq::Init::Zero)
            } else {
                copied
            };
            map[id as usize] = Some(copied);
            return;
        }
        let f1 = obj.fanin1.expect("gate with one fanin");
        self.dup_rec(new, map, f1.id());
        let c0 = map[f0.id() as usize].expect("fanin mapped").not_if(f0.is_complement());
        let c1 = map[f1.id() as usize].expect("fanin mapped").not_if(f1.is_complement());
        let copied = new.oper(obj.kind, c0, c1);
        map[id as usize] = Some(copied);
    }

    fn mapped_fanin0(&self, map: &[Option<Edge>], id: ObjId) -> Edge {
        let f = self.obj(id).fanin0.expect("object with no fanin");
        map[f.id() as usize].expect("fanin not yet mapped").not_if(f.is_complement())
    }

    fn mapped_fanin1(&self, map: &[Option<Edge>], id: ObjId) -> Edge {
        let f = self.obj(id).fanin1.expect("object with one fanin");
        map[f.id() as usize].expect("fanin not yet mapped").not_if(f.is_complement())
    }

    /// Builds a new manager computing the EXOR of two cones of this one,
    /// phase-normalized so the output is zero under the all-zero input.
    pub fn extract_miter(&self, a: Edge, b: Edge) -> Aig {
        let mut new = Aig::start(Some(self.obj_id_max()));
        let mut map: Vec<Option<Edge>> = vec![None; self.obj_id_max()];
        map[0] = Some(new.const1());
        for &pi in &self.pis {
            map[pi as usize] = Some(new.create_pi());
        }
        self.dup_rec(&mut new, &mut map, a.id());
        self.dup_rec(&mut new, &mut map, b.id());
        let ca = map[a.id() as usize].expect("cone mapped").not_if(a.is_complement());
        let cb = map[b.id() as usize].expect("cone mapped").not_if(b.is_complement());
        let out = new.exor(ca, cb);
        let out = out.not_if(new.edge_phase(out));
        new.create_po(out);
        if let Err(e) = new.check() {
            tracing::warn!(error = %e, "extract_miter produced an inconsistent manager");
        }
        new
    }

    /// Check failure report for a produced manager, if any (see
    /// [`Aig::check`]); logs through `tracing` like the transforms do.
    pub(crate) fn check_report(&self) -> Option<CheckError> {
        match self.check() {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, "manager check failed");
                Some(e)
            }
        }
    }
}
