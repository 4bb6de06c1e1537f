//! Object creation, rewiring and recursive removal.

use super::{Aig, StrashKey};
use crate::edge::Edge;
use crate::obj::{ObjId, ObjKind};

impl Aig {
    /// Creates a primary input and registers it in the PI array.
    pub fn create_pi(&mut self) -> Edge {
        let id = self.fetch_obj();
        self.obj_mut(id).kind = ObjKind::Pi;
        self.pis.push(id);
        self.n_objs[ObjKind::Pi as usize] += 1;
        Edge::new(id, false)
    }

    /// Creates a primary output driven by `driver`.
    pub fn create_po(&mut self, driver: Edge) -> ObjId {
        let id = self.fetch_obj();
        self.obj_mut(id).kind = ObjKind::Po;
        self.pos.push(id);
        self.connect(id, Some(driver), None);
        self.n_objs[ObjKind::Po as usize] += 1;
        id
    }

    /// Materializes the node a key describes, assuming no representative
    /// exists. The operator constructors are the only callers; they fold
    /// constants and consult the table first.
    pub(crate) fn obj_create(&mut self, key: StrashKey) -> ObjId {
        debug_assert!(key.kind.is_hashable());
        let id = self.fetch_obj();
        self.obj_mut(id).kind = key.kind;
        self.connect(id, Some(key.fanin0), key.fanin1);
        self.n_objs[key.kind as usize] += 1;
        id
    }

    /// Wires an object to its fanins: bumps fanin references, fills level
    /// and phase from the fanins, registers the node in the strash table and
    /// in the fanout index when one is active.
    pub(crate) fn connect(&mut self, id: ObjId, fan0: Option<Edge>, fan1: Option<Edge>) {
        debug_assert!(!self.obj(id).is_pi());
        {
            let obj = self.obj_mut(id);
            obj.fanin0 = fan0;
            obj.fanin1 = fan1;
        }
        for (which, fanin) in [(0u8, fan0), (1u8, fan1)] {
            if let Some(f) = fanin {
                debug_assert!(self.try_obj(f.id()).is_some(), "fanin points at a recycled slot");
                self.obj_mut(f.id()).refs += 1;
                if self.fanout.is_some() {
                    self.add_fanout(f.id(), id, which);
                }
            }
        }
        let (level, phase) = match (fan0, fan1) {
            (Some(f0), Some(f1)) => {
                let kind = self.obj(id).kind;
                let l = 1
                    + (kind == ObjKind::Exor) as u32
                    + self.edge_level(f0).max(self.edge_level(f1));
                let p = match kind {
                    ObjKind::Exor => self.edge_phase(f0) ^ self.edge_phase(f1),
                    _ => self.edge_phase(f0) & self.edge_phase(f1),
                };
                (l, p)
            }
            (Some(f0), None) => (self.edge_level(f0), self.edge_phase(f0)),
            _ => unreachable!("connect without a first fanin"),
        };
        {
            let obj = self.obj_mut(id);
            obj.level = level;
            obj.phase = phase;
        }
        if self.obj(id).is_hashable() {
            self.table_insert(id);
        }
    }

    /// Unwires an object from its fanins, dropping their references and its
    /// strash-table entry. The object keeps its slot and id.
    pub(crate) fn disconnect(&mut self, id: ObjId) {
        let fan0 = self.obj(id).fanin0;
        let fan1 = self.obj(id).fanin1;
        for (which, fanin) in [(0u8, fan0), (1u8, fan1)] {
            if let Some(f) = fanin {
                let refs = &mut self.obj_mut(f.id()).refs;
                debug_assert!(*refs > 0, "dereferencing an unreferenced object");
                *refs -= 1;
                if self.fanout.is_some() {
                    self.remove_fanout(f.id(), id, which);
                }
            }
        }
        if self.obj(id).is_hashable() {
            self.table_delete(id);
        }
        let obj = self.obj_mut(id);
        obj.fanin0 = None;
        obj.fanin1 = None;
    }

    /// Frees a disconnected, unreferenced object.
    pub(crate) fn delete(&mut self, id: ObjId) {
        let obj = self.obj(id);
        debug_assert!(!obj.is_terminal(), "terminals are never deleted");
        debug_assert_eq!(obj.refs, 0, "deleting a referenced object");
        let kind = obj.kind;
        self.n_objs[kind as usize] -= 1;
        if kind == ObjKind::Buf {
            self.bufs.retain(|&b| b != id);
        }
        self.recycle_obj(id);
    }

    /// Deletes the maximum fanout-free cone of `id`: disconnects the object
    /// and recursively removes every fanin whose reference count drops to
    /// zero. With `free_top` unset, the root keeps its slot so a caller can
    /// immediately re-type it (this is how `replace` reuses an object's id).
    pub fn delete_rec(&mut self, id: ObjId, free_top: bool) {
        let obj = self.obj(id);
        if obj.is_const1() || obj.is_pi() {
            return;
        }
        debug_assert!(!obj.is_po(), "delete_rec does not remove primary outputs");
        let fan0 = obj.fanin0;
        let fan1 = obj.fanin1;
        self.disconnect(id);
        if free_top {
            self.delete(id);
        }
        for fanin in [fan0, fan1].into_iter().flatten() {
            let t = fanin.id();
            // the first fanin's teardown can already have taken the second
            if self.try_obj(t).map_or(false, |o| o.refs == 0) {
                self.delete_rec(t, true);
            }
        }
    }

    /// Retargets only the first fanin; used to rewire primary outputs. The
    /// old driver's cone is collected when it goes dead.
    pub fn patch_fanin0(&mut self, id: ObjId, new: Edge) {
        debug_assert!(
            !self.obj(id).is_hashable(),
            "patching a hashed node would corrupt its table entry"
        );
        let old = self.obj(id).fanin0.expect("object with no first fanin");
        {
            let refs = &mut self.obj_mut(old.id()).refs;
            debug_assert!(*refs > 0);
            *refs -= 1;
        }
        if self.fanout.is_some() {
            self.remove_fanout(old.id(), id, 0);
        }
        self.obj_mut(id).fanin0 = Some(new);
        self.obj_mut(new.id()).refs += 1;
        if self.fanout.is_some() {
            self.add_fanout(new.id(), id, 0);
        }
        let level = self.level_new(id);
        let phase = self.phase_new(id);
        {
            let obj = self.obj_mut(id);
            obj.level = level;
            obj.phase = phase;
        }
        let old_t = self.obj(old.id());
        if !old_t.is_pi() && !old_t.is_const1() && old_t.refs == 0 {
            self.delete_rec(old.id(), true);
        }
    }

    /// Rewires every fanout of `old` onto `new`, the single path by which
    /// structural rewriting takes effect.
    ///
    /// When `new` is complemented or already referenced — or `nodes_only`
    /// holds and `new` does not denote a plain gate — `old` turns into a Buf
    /// driving `new`, preserving its id for fanouts. Otherwise `old` adopts
    /// `new`'s kind and fanins and `new`'s object is deleted. With
    /// `update_level` set (fanout index required), levels and, if indexed,
    /// reverse levels of the affected cone are re-evaluated to fixpoint.
    pub fn replace(&mut self, old: ObjId, new: Edge, nodes_only: bool, update_level: bool) {
        let new_r = new.id();
        debug_assert!(!self.obj(old).is_pi() && !self.obj(old).is_po());
        debug_assert!(!self.obj(new_r).is_buf() && !self.obj(new_r).is_po());
        debug_assert_ne!(old, new_r, "replacing an object by itself");
        debug_assert!(self.obj(new_r).fanin0.map_or(true, |f| f.id() != old));
        debug_assert!(self.obj(new_r).fanin1.map_or(true, |f| f.id() != old));
        // protect the new cone while the old one is torn down
        self.obj_mut(new_r).refs += 1;
        self.delete_rec(old, false);
        self.obj_mut(new_r).refs -= 1;
        let old_kind = self.obj(old).kind;
        self.n_objs[old_kind as usize] -= 1;
        if new.is_complement()
            || self.obj(new_r).refs > 0
            || (nodes_only && !self.obj(new_r).is_node())
        {
            self.obj_mut(old).kind = ObjKind::Buf;
            self.connect(old, Some(new), None);
            self.bufs.push(old);
            self.n_buf_replaces += 1;
            self.n_buf_max = self.n_buf_max.max(self.buf_num() as u32 + 1);
        } else {
            let fan0 = self.obj(new_r).fanin0;
            let fan1 = self.obj(new_r).fanin1;
            self.obj_mut(old).kind = self.obj(new_r).kind;
            self.disconnect(new_r);
            self.connect(old, fan0, fan1);
            self.delete(new_r);
        }
        self.n_objs[self.obj(old).kind as usize] += 1;
        if update_level {
            self.update_level(old);
            if self.level_r.is_some() {
                self.update_reverse_level(old);
            }
        }
    }
}
