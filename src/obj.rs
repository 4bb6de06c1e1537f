//! AIG objects.

use crate::edge::Edge;

use strum::EnumCount;

pub type ObjId = u32;

/// Kinds of objects held by a manager.
///
/// `None` marks a recycled slot; `Void` is the one-past-last sentinel used
/// for per-kind counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumCount, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjKind {
    None,
    Const1,
    Pi,
    Po,
    Buf,
    And,
    Exor,
    Latch,
    Void,
}

impl ObjKind {
    /// AND or EXOR gate.
    pub const fn is_node(self) -> bool {
        matches!(self, ObjKind::And | ObjKind::Exor)
    }

    /// Combinational endpoint: never deleted by recursive cone removal.
    pub const fn is_terminal(self) -> bool {
        matches!(self, ObjKind::Pi | ObjKind::Po | ObjKind::Const1)
    }

    /// Kinds kept canonical through the structural hash table.
    pub const fn is_hashable(self) -> bool {
        matches!(self, ObjKind::And | ObjKind::Exor | ObjKind::Latch)
    }
}

impl Default for ObjKind {
    fn default() -> Self {
        ObjKind::None
    }
}

/// One AIG object. Uniform size so the manager's fixed-block pool can recycle
/// slots; all cross-object references go through stable ids.
#[derive(Debug, Clone, Default)]
pub struct Obj {
    pub(crate) kind: ObjKind,
    pub(crate) fanin0: Option<Edge>,
    pub(crate) fanin1: Option<Edge>,
    /// Next entry in the strash bucket chain.
    pub(crate) next: Option<ObjId>,
    /// Value of the node under the all-zero input assignment.
    pub(crate) phase: bool,
    pub(crate) mark_a: bool,
    pub(crate) mark_b: bool,
    /// Fanout reference count, POs and latches included.
    pub(crate) refs: u32,
    /// Combinational depth; EXOR gates cost two levels.
    pub(crate) level: u32,
    /// Number of cuts stored for this object by the cut enumerator.
    pub(crate) n_cuts: u8,
    /// Traversal ID of the last pass that visited this object.
    pub(crate) trav_id: u32,
    pub(crate) id: ObjId,
}

impl Obj {
    pub const fn kind(&self) -> ObjKind {
        self.kind
    }

    pub const fn id(&self) -> ObjId {
        self.id
    }

    pub const fn fanin0(&self) -> Option<Edge> {
        self.fanin0
    }

    pub const fn fanin1(&self) -> Option<Edge> {
        self.fanin1
    }

    /// Complement attribute of the first fanin. Panics when absent.
    pub fn fanin_c0(&self) -> bool {
        self.fanin0.expect("object has no first fanin").is_complement()
    }

    pub fn fanin_c1(&self) -> bool {
        self.fanin1.expect("object has no second fanin").is_complement()
    }

    /// Regular id of the first fanin. Panics when absent.
    pub fn fanin0_id(&self) -> ObjId {
        self.fanin0.expect("object has no first fanin").id()
    }

    pub fn fanin1_id(&self) -> ObjId {
        self.fanin1.expect("object has no second fanin").id()
    }

    pub const fn refs(&self) -> u32 {
        self.refs
    }

    pub const fn level(&self) -> u32 {
        self.level
    }

    pub const fn phase(&self) -> bool {
        self.phase
    }

    pub const fn n_cuts(&self) -> u8 {
        self.n_cuts
    }

    pub const fn trav_id(&self) -> u32 {
        self.trav_id
    }

    pub const fn is_none(&self) -> bool {
        matches!(self.kind, ObjKind::None)
    }

    pub const fn is_const1(&self) -> bool {
        matches!(self.kind, ObjKind::Const1)
    }

    pub const fn is_pi(&self) -> bool {
        matches!(self.kind, ObjKind::Pi)
    }

    pub const fn is_po(&self) -> bool {
        matches!(self.kind, ObjKind::Po)
    }

    pub const fn is_buf(&self) -> bool {
        matches!(self.kind, ObjKind::Buf)
    }

    pub const fn is_and(&self) -> bool {
        matches!(self.kind, ObjKind::And)
    }

    pub const fn is_exor(&self) -> bool {
        matches!(self.kind, ObjKind::Exor)
    }

    pub const fn is_latch(&self) -> bool {
        matches!(self.kind, ObjKind::Latch)
    }

    pub const fn is_node(&self) -> bool {
        self.kind.is_node()
    }

    pub const fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }

    pub const fn is_hashable(&self) -> bool {
        self.kind.is_hashable()
    }

    /// The edge pointing at this object, positive polarity.
    pub const fn edge(&self) -> Edge {
        Edge::new(self.id, false)
    }

    /// Resets the slot to the zeroed state the pool hands out.
    pub(crate) fn clean(&mut self) {
        *self = Obj::default();
    }
}
