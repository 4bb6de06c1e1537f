//! Manager parameters

/// Default soft capacity hint for a manager started without one.
///
/// Prime, so the initial strash table needs no further adjustment.
pub const DEFAULT_NODE_HINT: usize = 10_007;

/// Ceiling for the traversal-ID counter. Incrementing past this point clears
/// every object's traversal ID back to zero instead of wrapping.
pub const TRAV_ID_MAX: u32 = (1 << 30) - 1;

/// Hash multipliers for the structural table key fields.
pub const HASH_KIND_MULT: u64 = 1699;
pub const HASH_FANIN0_MULT: u64 = 7937;
pub const HASH_FANIN1_MULT: u64 = 2971;
pub const HASH_COMPL0_MULT: u64 = 911;
pub const HASH_COMPL1_MULT: u64 = 353;

/// Largest number of leaves for which a cut's truth table fits in one word.
pub const CUT_LEAF_MAX: usize = 6;

/// Elementary truth tables: column `i` is the value of the `i`-th cut leaf
/// over all 64 minterms of a six-variable space.
pub const ELEM_TRUTHS: [u64; CUT_LEAF_MAX] = [
    0xAAAA_AAAA_AAAA_AAAA,
    0xCCCC_CCCC_CCCC_CCCC,
    0xF0F0_F0F0_F0F0_F0F0,
    0xFF00_FF00_FF00_FF00,
    0xFFFF_0000_FFFF_0000,
    0xFFFF_FFFF_0000_0000,
];

/// Words of simulation state kept per object in one simulator round.
pub const SIM_WORDS: usize = 64;

/// Patterns evaluated per simulator round (64 words of 64 bits).
pub const SIM_BATCH: usize = SIM_WORDS * 64;

/// Round limit for ternary simulation; state spaces that do not close within
/// this many frames are reported as non-convergent.
pub const XSIM_ROUND_MAX: usize = 1000;
