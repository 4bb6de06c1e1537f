//! Error types for the manager, the consistency checker and the simulator.

use crate::obj::ObjId;

use std::io;
use thiserror::Error;

/// Recoverable faults surfaced by manager operations.
///
/// Precondition violations (complemented handles where regular ones are
/// required, deleting referenced nodes, dirty marks) are caller bugs and are
/// enforced with assertions instead.
#[derive(Debug, Error)]
pub enum AigError {
    /// A pass referenced a primary input the manager does not have.
    #[error("primary input {var} is not defined (the manager has {pis} inputs)")]
    UndefinedVar {
        /// The requested input index.
        var: usize,
        /// The number of inputs the manager owns.
        pis: usize,
    },
    /// An iterative pass failed to reach a fixed point within its bound.
    #[error("no fixed point after {rounds} rounds")]
    NonConvergent {
        /// Rounds executed before giving up.
        rounds: usize,
    },
    /// The init vector handed to sequential strashing does not cover the
    /// requested number of latches.
    #[error("{given} initial values given for {latches} latches")]
    InitVectorLength {
        /// Length of the supplied init vector.
        given: usize,
        /// Number of PI/PO pairs being converted.
        latches: usize,
    },
}

/// First inconsistency found by [`crate::manager::Aig::check`].
///
/// Transforms run the check on their result and hand the report to the
/// caller together with the produced manager; policy stays with the caller.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("primary input {0} has a fanin")]
    PiWithFanin(ObjId),
    #[error("primary output {0} has no driver")]
    PoWithoutDriver(ObjId),
    #[error("primary output {0} has a second fanin")]
    PoWithSecondFanin(ObjId),
    #[error("node {0} has a missing fanin")]
    NodeWithoutFanin(ObjId),
    #[error("node {0} stores its fanins out of order")]
    UnsortedFanins(ObjId),
    #[error("node {0} is not its own strash representative")]
    NotInTable(ObjId),
    #[error("node {id} carries level {stored} where {computed} is implied by its fanins")]
    WrongLevel { id: ObjId, stored: u32, computed: u32 },
    #[error("node {id} carries a phase inconsistent with its fanins")]
    WrongPhase { id: ObjId },
    #[error("node {id} carries {stored} references but has {counted} fanouts")]
    WrongRefs { id: ObjId, stored: u32, counted: u32 },
    #[error("object {0} has a dirty scratch mark")]
    DirtyMark(ObjId),
    #[error("live objects ({live}) disagree with created ({created}) minus deleted ({deleted})")]
    WrongObjCount { live: u32, created: u32, deleted: u32 },
    #[error("strash table holds {entries} entries for {hashable} hashable nodes")]
    WrongTableCount { entries: u32, hashable: u32 },
    #[error("sequential strashing made no progress after {iterations} iterations")]
    SeqStrashDiverged { iterations: usize },
}

/// Failures of the bit-parallel equivalence simulator.
#[derive(Debug, Error)]
pub enum SimError {
    /// The two designs do not share a PI/PO signature.
    #[error("interface mismatch: ({pis_a},{pos_a}) vs ({pis_b},{pos_b})")]
    InterfaceMismatch {
        pis_a: usize,
        pos_a: usize,
        pis_b: usize,
        pos_b: usize,
    },
    /// The simulator packs one input vector per machine word.
    #[error("at most 64 inputs and 64 outputs are supported (got {pis} inputs, {pos} outputs)")]
    TooWide { pis: usize, pos: usize },
    /// The mask string failed to parse.
    #[error("bad mask string near offset {at}")]
    BadMask { at: usize },
    /// The mask token widths do not sum to the input count.
    #[error("mask widths sum to {sum} but the design has {pis} inputs")]
    MaskWidth { sum: usize, pis: usize },
    /// More than 64 enumeration variables were requested.
    #[error("mask defines too many enumeration variables")]
    TooManyVars,
    /// The design contains latches; the simulator is combinational.
    #[error("sequential designs cannot be simulated combinationally")]
    Sequential,
    /// I/O toward the external reference binary failed.
    #[error("external binary i/o failed: {0}")]
    Io(#[from] io::Error),
    /// The external reference binary exited abnormally.
    #[error("external binary exited with status {status}")]
    Binary { status: i32 },
    /// The two designs disagree on at least one pattern.
    #[error("{0}")]
    Mismatch(Box<crate::sim::Mismatch>),
}

impl SimError {
    /// Process exit class: 2 for setup failures, 3 for miscompares and
    /// failures while comparing.
    pub const fn exit_code(&self) -> i32 {
        match self {
            SimError::InterfaceMismatch { .. }
            | SimError::TooWide { .. }
            | SimError::BadMask { .. }
            | SimError::MaskWidth { .. }
            | SimError::TooManyVars
            | SimError::Sequential => 2,
            SimError::Io(_) | SimError::Binary { .. } | SimError::Mismatch(_) => 3,
        }
    }
}
