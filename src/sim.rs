//! Bit-parallel two-design equivalence checking.
//!
//! Both designs are simulated 4096 patterns per round (64 words of 64
//! bits), with the input enumeration shaped by a mask string: `N` contributes
//! `N` independently enumerated bits, `(N)` contributes `N` bits toggling
//! together. Outputs are compared word-wise; the first differing bit is
//! decoded back into the offending pattern. A design can also be compared
//! against an external reference binary exchanging word-packed column files.

use crate::consts::{SIM_BATCH, SIM_WORDS};
use crate::error::SimError;
use crate::manager::Aig;
use crate::obj::ObjId;

use itertools::Itertools;

use std::fmt;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Input-grouping mask: one word per enumeration variable, each holding the
/// set of input bits that variable drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimMask {
    masks: Vec<u64>,
}

impl SimMask {
    /// Parses the `N | "(" N ")"` token sequence; widths must sum to the
    /// input count. An empty string enumerates every input independently.
    pub fn parse(mask: &str, n_pis: usize) -> Result<SimMask, SimError> {
        if mask.trim().is_empty() {
            if n_pis > 64 {
                return Err(SimError::TooManyVars);
            }
            return Ok(SimMask {
                masks: (0..n_pis).map(|i| 1u64 << i).collect(),
            });
        }
        let bytes = mask.as_bytes();
        let mut masks = Vec::new();
        let mut offset = 0usize;
        let mut at = 0usize;
        while at < bytes.len() {
            while at < bytes.len() && bytes[at].is_ascii_whitespace() {
                at += 1;
            }
            if at == bytes.len() {
                break;
            }
            let grouped = bytes[at] == b'(';
            if grouped {
                at += 1;
                while at < bytes.len() && bytes[at].is_ascii_whitespace() {
                    at += 1;
                }
            }
            let start = at;
            while at < bytes.len() && bytes[at].is_ascii_digit() {
                at += 1;
            }
            if at == start {
                return Err(SimError::BadMask { at });
            }
            let width: usize = mask[start..at].parse().map_err(|_| SimError::BadMask { at })?;
            if width == 0 || width > 64 {
                return Err(SimError::BadMask { at });
            }
            while at < bytes.len() && bytes[at].is_ascii_whitespace() {
                at += 1;
            }
            if grouped {
                if at == bytes.len() || bytes[at] != b')' {
                    return Err(SimError::BadMask { at });
                }
                at += 1;
            }
            if offset + width > n_pis {
                return Err(SimError::MaskWidth {
                    sum: offset + width,
                    pis: n_pis,
                });
            }
            if grouped {
                let m = if width == 64 {
                    u64::MAX
                } else {
                    ((1u64 << width) - 1) << offset
                };
                if masks.len() == 64 {
                    return Err(SimError::TooManyVars);
                }
                masks.push(m);
            } else {
                for bit in 0..width {
                    if masks.len() == 64 {
                        return Err(SimError::TooManyVars);
                    }
                    masks.push(1u64 << (offset + bit));
                }
            }
            offset += width;
        }
        if offset != n_pis {
            return Err(SimError::MaskWidth {
                sum: offset,
                pis: n_pis,
            });
        }
        Ok(SimMask { masks })
    }

    /// Number of independently enumerated variables.
    pub fn n_vars(&self) -> usize {
        self.masks.len()
    }

    /// Total patterns the enumeration covers.
    pub fn patterns(&self) -> u128 {
        1u128 << self.masks.len()
    }

    /// Input word for one enumeration index.
    fn input_word(&self, index: u128) -> u64 {
        self.masks
            .iter()
            .enumerate()
            .filter(|(j, _)| index >> j & 1 == 1)
            .fold(0, |w, (_, m)| w | m)
    }
}

/// Successful comparison summary.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimReport {
    pub patterns: u128,
    pub rounds: u64,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub elapsed: Duration,
}

impl fmt::Display for SimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OK patterns={} rounds={} time={:.3}s",
            self.patterns,
            self.rounds,
            self.elapsed.as_secs_f64()
        )
    }
}

/// First disagreement found between the two designs.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mismatch {
    /// Global pattern index of the failing assignment.
    pub pattern: u128,
    /// Output bit that disagreed first.
    pub out_bit: usize,
    /// Input vector of the failing pattern, one bit per PI.
    pub input: u64,
    /// Output vector of the first design under that input.
    pub out_a: u64,
    /// Output vector of the second design (or the reference binary).
    pub out_b: u64,
    pub n_pis: usize,
    pub n_pos: usize,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let in_hex = (self.n_pis + 3) / 4;
        let out_hex = (self.n_pos + 3) / 4;
        write!(
            f,
            "FAIL pattern={} out_bit={} in=0x{:0iw$x} y1=0x{:0ow$x} y2=0x{:0ow$x}",
            self.pattern,
            self.out_bit,
            self.input,
            self.out_a,
            self.out_b,
            iw = in_hex.max(1),
            ow = out_hex.max(1),
        )
    }
}

/// Combinational evaluation plan for one manager.
struct SimPlan {
    order: Vec<ObjId>,
    po_drivers: Vec<crate::edge::Edge>,
}

impl Aig {
    fn sim_plan(&mut self) -> Result<SimPlan, SimError> {
        if self.latch_num() > 0 || self.buf_num() > 0 {
            return Err(SimError::Sequential);
        }
        let order = self.dfs();
        let po_drivers = self
            .pos
            .iter()
            .map(|&po| self.obj(po).fanin0().expect("po without driver"))
            .collect();
        Ok(SimPlan {
            order,
            po_drivers,
        })
    }

    /// Fills the per-object columns for one round and evaluates the plan.
    fn sim_round(&self, plan: &SimPlan, values: &mut [u64]) {
        for &id in &plan.order {
            let obj = self.obj(id);
            let f0 = obj.fanin0().expect("gate fanin");
            let f1 = obj.fanin1().expect("gate fanin");
            let is_exor = obj.is_exor();
            for w in 0..SIM_WORDS {
                let mut v0 = values[f0.id() as usize * SIM_WORDS + w];
                let mut v1 = values[f1.id() as usize * SIM_WORDS + w];
                if f0.is_complement() {
                    v0 = !v0;
                }
                if f1.is_complement() {
                    v1 = !v1;
                }
                values[id as usize * SIM_WORDS + w] = if is_exor { v0 ^ v1 } else { v0 & v1 };
            }
        }
    }

    /// Exhaustive equivalence check of two combinational designs over the
    /// enumeration the mask describes.
    pub fn simulate_pair(&mut self, other: &mut Aig, mask: &str, verbose: bool) -> Result<SimReport, SimError> {
        if self.pi_num() != other.pi_num() || self.po_num() != other.po_num() {
            return Err(SimError::InterfaceMismatch {
                pis_a: self.pi_num(),
                pos_a: self.po_num(),
                pis_b: other.pi_num(),
                pos_b: other.po_num(),
            });
        }
        if self.pi_num() > 64 || self.po_num() > 64 {
            return Err(SimError::TooWide {
                pis: self.pi_num(),
                pos: self.po_num(),
            });
        }
        let mask = SimMask::parse(mask, self.pi_num())?;
        if verbose {
            tracing::debug!(vars = mask.n_vars(), patterns = %mask.patterns(), "mask parsed");
        }
        let plan_a = self.sim_plan()?;
        let plan_b = other.sim_plan()?;
        let mut vals_a = vec![0u64; self.obj_id_max() * SIM_WORDS];
        let mut vals_b = vec![0u64; other.obj_id_max() * SIM_WORDS];
        let started = Instant::now();
        let mut rounds = 0u64;
        let mut done = 0u128;
        let total = mask.patterns();
        let mut inputs = vec![0u64; SIM_BATCH];
        while done < total {
            let n_this = (total - done).min(SIM_BATCH as u128) as usize;
            self.fill_round(&mask, done, n_this, &mut inputs, &mut vals_a);
            other.fill_round(&mask, done, n_this, &mut inputs, &mut vals_b);
            self.sim_round(&plan_a, &mut vals_a);
            other.sim_round(&plan_b, &mut vals_b);
            let out_b = |w: usize, o: usize| {
                let f = plan_b.po_drivers[o];
                let v = vals_b[f.id() as usize * SIM_WORDS + w];
                if f.is_complement() {
                    !v
                } else {
                    v
                }
            };
            if let Some(m) = self.compare_round(&plan_a, &vals_a, &inputs, done, n_this, &out_b) {
                return Err(SimError::Mismatch(Box::new(m)));
            }
            rounds += 1;
            done += n_this as u128;
            if verbose && rounds % 256 == 0 {
                tracing::debug!(rounds, patterns = %done, "simulation progress");
            }
        }
        let report = SimReport {
            patterns: total,
            rounds,
            elapsed: started.elapsed(),
        };
        tracing::debug!(%report, "simulation finished");
        Ok(report)
    }

    /// Equivalence check against an external binary invoked per round as
    /// `bin <input-file> <output-file>` over word-packed column files
    /// (`n_pis * 64` input words, `n_pos * 64` output words).
    pub fn simulate_against_binary(
        &mut self,
        bin: &Path,
        mask: &str,
        verbose: bool,
    ) -> Result<SimReport, SimError> {
        if self.pi_num() > 64 || self.po_num() > 64 {
            return Err(SimError::TooWide {
                pis: self.pi_num(),
                pos: self.po_num(),
            });
        }
        let mask = SimMask::parse(mask, self.pi_num())?;
        let plan = self.sim_plan()?;
        let mut vals = vec![0u64; self.obj_id_max() * SIM_WORDS];
        let mut out_words = vec![0u64; self.po_num() * SIM_WORDS];
        let (in_path, out_path) = temp_pair();
        let started = Instant::now();
        let mut rounds = 0u64;
        let mut done = 0u128;
        let total = mask.patterns();
        let mut inputs = vec![0u64; SIM_BATCH];
        let result = loop {
            if done >= total {
                break Ok(SimReport {
                    patterns: total,
                    rounds,
                    elapsed: started.elapsed(),
                });
            }
            let n_this = (total - done).min(SIM_BATCH as u128) as usize;
            self.fill_round(&mask, done, n_this, &mut inputs, &mut vals);
            self.sim_round(&plan, &mut vals);
            if let Err(e) = self.exchange_with_binary(bin, &in_path, &out_path, &vals, &mut out_words) {
                break Err(e);
            }
            let out_b = |w: usize, o: usize| out_words[o * SIM_WORDS + w];
            if let Some(m) = self.compare_round(&plan, &vals, &inputs, done, n_this, &out_b) {
                break Err(SimError::Mismatch(Box::new(m)));
            }
            rounds += 1;
            done += n_this as u128;
            if verbose && rounds % 256 == 0 {
                tracing::debug!(rounds, patterns = %done, "simulation progress");
            }
        };
        let _ = fs::remove_file(&in_path);
        let _ = fs::remove_file(&out_path);
        result
    }

    /// Clears and refills the PI columns for the patterns of one round.
    fn fill_round(
        &self,
        mask: &SimMask,
        base: u128,
        n_this: usize,
        inputs: &mut [u64],
        values: &mut [u64],
    ) {
        for w in values[..SIM_WORDS].iter_mut() {
            *w = u64::MAX; // constant-one columns
        }
        for &pi in &self.pis {
            for w in 0..SIM_WORDS {
                values[pi as usize * SIM_WORDS + w] = 0;
            }
        }
        for ptn in 0..n_this {
            let word = mask.input_word(base + ptn as u128);
            inputs[ptn] = word;
            let (w, bit) = (ptn >> 6, 1u64 << (ptn & 63));
            let mut rest = word;
            while rest != 0 {
                let i = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                values[self.pis[i] as usize * SIM_WORDS + w] |= bit;
            }
        }
    }

    /// Compares PO columns of one round; decodes the first differing bit.
    fn compare_round(
        &self,
        plan: &SimPlan,
        values: &[u64],
        inputs: &[u64],
        base: u128,
        n_this: usize,
        out_b: &dyn Fn(usize, usize) -> u64,
    ) -> Option<Mismatch> {
        let valid = |w: usize| {
            let lo = w * 64;
            if n_this >= lo + 64 {
                u64::MAX
            } else if n_this > lo {
                (1u64 << (n_this - lo)) - 1
            } else {
                0
            }
        };
        let out_a = |w: usize, o: usize| {
            let f = plan.po_drivers[o];
            let v = values[f.id() as usize * SIM_WORDS + w];
            if f.is_complement() {
                !v
            } else {
                v
            }
        };
        for (o, w) in (0..plan.po_drivers.len()).cartesian_product(0..SIM_WORDS) {
            let diff = (out_a(w, o) ^ out_b(w, o)) & valid(w);
            if diff == 0 {
                continue;
            }
            let bit = diff.trailing_zeros() as usize;
            let ptn = w * 64 + bit;
            let (mut va, mut vb) = (0u64, 0u64);
            for oo in 0..plan.po_drivers.len() {
                va |= (out_a(w, oo) >> bit & 1) << oo;
                vb |= (out_b(w, oo) >> bit & 1) << oo;
            }
            return Some(Mismatch {
                pattern: base + ptn as u128,
                out_bit: o,
                input: inputs[ptn],
                out_a: va,
                out_b: vb,
                n_pis: self.pi_num(),
                n_pos: plan.po_drivers.len(),
            });
        }
        None
    }

    fn exchange_with_binary(
        &self,
        bin: &Path,
        in_path: &Path,
        out_path: &Path,
        values: &[u64],
        out_words: &mut [u64],
    ) -> Result<(), SimError> {
        let mut file = fs::File::create(in_path)?;
        for &pi in &self.pis {
            for w in 0..SIM_WORDS {
                file.write_all(&values[pi as usize * SIM_WORDS + w].to_le_bytes())?;
            }
        }
        file.flush()?;
        drop(file);
        let _ = fs::remove_file(out_path);
        let status = Command::new(bin).arg(in_path).arg(out_path).status()?;
        if !status.success() {
            return Err(SimError::Binary {
                status: status.code().unwrap_or(-1),
            });
        }
        let mut file = fs::File::open(out_path)?;
        let mut buf = [0u8; 8];
        for word in out_words.iter_mut() {
            file.read_exact(&mut buf)?;
            *word = u64::from_le_bytes(buf);
        }
        Ok(())
    }
}

/// Maps the comparison result onto the process exit classes: 0 equal,
/// 2 setup failure, 3 miscompare or comparison failure.
pub fn exit_code(result: &Result<SimReport, SimError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => e.exit_code(),
    }
}

fn temp_pair() -> (PathBuf, PathBuf) {
    static SEQ: AtomicU32 = AtomicU32::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir();
    let pid = std::process::id();
    (
        dir.join(format!("aigsim_in_{pid}_{seq}")),
        dir.join(format!("aigsim_out_{pid}_{seq}")),
    )
}
