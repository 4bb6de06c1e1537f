//! Fanin edge encoding.
//!
//! An edge addresses a target object together with an inversion attribute,
//! packed into a single word: `id << 1 | complement`. Inversion is a
//! constant-time bit flip, so complemented logic costs nothing to represent.

use crate::obj::ObjId;

use core::fmt;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge(u32);

impl Edge {
    /// The constant-1 function. The constant node is always the first object
    /// a manager creates, so its id is zero in every manager.
    pub const CONST1: Edge = Edge(0);

    /// The constant-0 function, i.e. the complement of constant 1.
    pub const CONST0: Edge = Edge(1);

    pub const fn new(id: ObjId, complement: bool) -> Self {
        Edge(id << 1 | complement as u32)
    }

    /// Target object id, inversion stripped.
    pub const fn id(self) -> ObjId {
        self.0 >> 1
    }

    pub const fn is_complement(self) -> bool {
        self.0 & 1 != 0
    }

    /// The same edge without its inversion attribute.
    pub const fn regular(self) -> Edge {
        Edge(self.0 & !1)
    }

    /// The complemented edge.
    #[allow(clippy::should_implement_trait)]
    pub const fn not(self) -> Edge {
        Edge(self.0 ^ 1)
    }

    /// Complements the edge when `c` holds.
    pub const fn not_if(self, c: bool) -> Edge {
        Edge(self.0 ^ c as u32)
    }

    /// Raw literal value (`2 * id + complement`), useful as a dense index.
    pub const fn lit(self) -> u32 {
        self.0
    }

    pub const fn from_lit(lit: u32) -> Edge {
        Edge(lit)
    }

    pub const fn is_const(self) -> bool {
        self.id() == 0
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_complement() {
            write!(f, "!{}", self.id())
        } else {
            write!(f, "{}", self.id())
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_round_trip() {
        let e = Edge::new(42, false);
        assert_eq!(e.not().not(), e);
        assert_eq!(e.not().id(), 42);
        assert!(e.not().is_complement());
        assert_eq!(e.not().regular(), e);
    }

    #[test]
    fn constants() {
        assert_eq!(Edge::CONST1.not(), Edge::CONST0);
        assert!(Edge::CONST0.is_complement());
        assert!(Edge::CONST0.is_const());
        assert_eq!(Edge::CONST1.id(), 0);
    }

    #[test]
    fn not_if_matches_not() {
        let e = Edge::new(7, true);
        assert_eq!(e.not_if(true), e.not());
        assert_eq!(e.not_if(false), e);
    }
}
