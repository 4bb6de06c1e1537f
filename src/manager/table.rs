//! Structural hash table.
//!
//! Maps a canonical `(kind, ordered regular fanins, fanin phases)` key to the
//! one live node carrying it. Buckets are chained through [`Obj::next`], so
//! insertion and deletion are O(1) once the bucket is found. The table size
//! stays prime and doubles (next prime above twice the entry count) when the
//! load factor reaches one.

use super::Aig;
use crate::consts::*;
use crate::edge::Edge;
use crate::obj::{ObjId, ObjKind};

/// Stack-local lookup key; stands in for a materialized node with the same
/// fanins without touching the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StrashKey {
    pub kind: ObjKind,
    pub fanin0: Edge,
    pub fanin1: Option<Edge>,
}

impl StrashKey {
    /// Canonical two-fanin key: fanins stored sorted by regular target id.
    ///
    /// Constant or equal regular fanins must have been folded away by the
    /// operator constructors before a key is formed.
    pub fn gate(kind: ObjKind, a: Edge, b: Edge) -> Self {
        debug_assert!(matches!(kind, ObjKind::And | ObjKind::Exor));
        debug_assert!(!a.is_const() && !b.is_const());
        debug_assert_ne!(a.id(), b.id());
        let (fanin0, fanin1) = if a.id() < b.id() { (a, b) } else { (b, a) };
        StrashKey {
            kind,
            fanin0,
            fanin1: Some(fanin1),
        }
    }

    pub fn latch(driver: Edge) -> Self {
        StrashKey {
            kind: ObjKind::Latch,
            fanin0: driver,
            fanin1: None,
        }
    }
}

fn hash(key: &StrashKey, size: usize) -> usize {
    let mut h = (key.kind == ObjKind::Exor) as u64 * HASH_KIND_MULT;
    h ^= key.fanin0.id() as u64 * HASH_FANIN0_MULT;
    h ^= key.fanin0.is_complement() as u64 * HASH_COMPL0_MULT;
    if let Some(f1) = key.fanin1 {
        h ^= f1.id() as u64 * HASH_FANIN1_MULT;
        h ^= f1.is_complement() as u64 * HASH_COMPL1_MULT;
    }
    (h % size as u64) as usize
}

/// Next prime greater than or equal to `n`.
pub(crate) fn prime(n: usize) -> usize {
    let mut p = n.max(2);
    loop {
        if p % 2 == 0 {
            p += 1;
            continue;
        }
        let mut i = 3;
        let mut is_prime = true;
        while i * i <= p {
            if p % i == 0 {
                is_prime = false;
                break;
            }
            i += 2;
        }
        if is_prime {
            return p;
        }
        p += 2;
    }
}

impl Aig {
    /// The canonical key a live hashable node is stored under.
    pub(crate) fn node_key(&self, id: ObjId) -> StrashKey {
        let obj = self.obj(id);
        debug_assert!(obj.is_hashable());
        StrashKey {
            kind: obj.kind,
            fanin0: obj.fanin0.expect("hashable node with no fanin"),
            fanin1: obj.fanin1,
        }
    }

    /// Looks up the representative for a key. Keys whose fanins are
    /// unreferenced denote cones being torn down and never match.
    pub(crate) fn table_lookup(&self, key: &StrashKey) -> Option<ObjId> {
        if self.obj(key.fanin0.id()).refs == 0 {
            return None;
        }
        if let Some(f1) = key.fanin1 {
            if self.obj(f1.id()).refs == 0 {
                return None;
            }
            debug_assert!(key.fanin0.id() < f1.id());
        }
        let mut entry = self.buckets[hash(key, self.buckets.len())];
        while let Some(id) = entry {
            let obj = self.obj(id);
            if obj.kind == key.kind && obj.fanin0 == Some(key.fanin0) && obj.fanin1 == key.fanin1 {
                return Some(id);
            }
            entry = obj.next;
        }
        None
    }

    /// Probes for an existing gate without creating anything. Trivial
    /// operand shapes (constants, shared regulars) never match.
    pub(crate) fn strash_probe(&self, kind: ObjKind, a: Edge, b: Edge) -> Option<ObjId> {
        if a.is_const() || b.is_const() || a.id() == b.id() {
            return None;
        }
        self.table_lookup(&StrashKey::gate(kind, a, b))
    }

    pub(crate) fn table_insert(&mut self, id: ObjId) {
        debug_assert!(self.table_lookup(&self.node_key(id)).is_none());
        if self.table_entries() >= self.buckets.len() {
            self.table_resize();
        }
        let key = self.node_key(id);
        let bucket = hash(&key, self.buckets.len());
        let head = self.buckets[bucket];
        self.obj_mut(id).next = head;
        self.buckets[bucket] = Some(id);
    }

    pub(crate) fn table_delete(&mut self, id: ObjId) {
        let key = self.node_key(id);
        let bucket = hash(&key, self.buckets.len());
        let mut entry = self.buckets[bucket].expect("node not in strash table");
        if entry == id {
            self.buckets[bucket] = self.obj(id).next;
            self.obj_mut(id).next = None;
            return;
        }
        loop {
            let next = self.obj(entry).next.expect("node not in strash table");
            if next == id {
                let after = self.obj(id).next;
                self.obj_mut(entry).next = after;
                self.obj_mut(id).next = None;
                return;
            }
            entry = next;
        }
    }

    /// Number of hashable nodes the table should hold.
    pub(crate) fn table_entries(&self) -> usize {
        self.and_num() + self.exor_num() + self.latch_num()
    }

    /// Walks the buckets and counts what the table actually holds.
    pub fn table_count_entries(&self) -> usize {
        let mut count = 0;
        for bucket in &self.buckets {
            let mut entry = *bucket;
            while let Some(id) = entry {
                count += 1;
                entry = self.obj(id).next;
            }
        }
        count
    }

    fn table_resize(&mut self) {
        let old_size = self.buckets.len();
        let mut ids = Vec::with_capacity(self.table_entries());
        for bucket in &mut self.buckets {
            let mut entry = bucket.take();
            while let Some(id) = entry {
                ids.push(id);
                entry = self.pool.slot(self.store[id as usize].expect("live entry")).next;
            }
        }
        self.buckets = vec![None; prime(2 * self.table_entries().max(1))];
        for id in ids {
            let key = self.node_key(id);
            let bucket = hash(&key, self.buckets.len());
            let head = self.buckets[bucket];
            let obj = self.obj_mut(id);
            obj.next = head;
            self.buckets[bucket] = Some(id);
        }
        tracing::debug!(from = old_size, to = self.buckets.len(), "resized strash table");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prime_is_prime_and_large_enough() {
        for n in [0usize, 1, 2, 3, 10, 100, 10_000, 10_007] {
            let p = prime(n);
            assert!(p >= n.max(2));
            assert!((2..p).take_while(|d| d * d <= p).all(|d| p % d != 0));
        }
    }

    #[quickcheck_macros::quickcheck]
    fn prime_never_below_request(n: u16) -> bool {
        prime(n as usize) >= n as usize
    }

    #[test]
    fn gate_key_sorts_fanins() {
        let a = Edge::new(5, true);
        let b = Edge::new(3, false);
        let key = StrashKey::gate(ObjKind::And, a, b);
        assert_eq!(key.fanin0, b);
        assert_eq!(key.fanin1, Some(a));
    }
}
