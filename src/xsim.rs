//! Ternary sequential simulation.
//!
//! Runs the registered design from the all-X input, all-zero latch state,
//! one frame per round, until a state repeats. Latches whose accumulated
//! value never leaves a constant are reported; a reducer can tie them off.
//! Converted latches always start at zero (initial value one is encoded as
//! a complemented latch), so no per-latch initial state is needed.

use crate::consts::XSIM_ROUND_MAX;
use crate::error::AigError;
use crate::manager::Aig;
use crate::obj::ObjId;

/// One three-valued signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TernaryValue {
    Zero,
    One,
    Unknown,
}

impl TernaryValue {
    fn invert(self) -> Self {
        match self {
            TernaryValue::Zero => TernaryValue::One,
            TernaryValue::One => TernaryValue::Zero,
            TernaryValue::Unknown => TernaryValue::Unknown,
        }
    }

    fn and(self, other: Self) -> Self {
        match (self, other) {
            (TernaryValue::Zero, _) | (_, TernaryValue::Zero) => TernaryValue::Zero,
            (TernaryValue::Unknown, _) | (_, TernaryValue::Unknown) => TernaryValue::Unknown,
            _ => TernaryValue::One,
        }
    }

    fn exor(self, other: Self) -> Self {
        match (self, other) {
            (TernaryValue::Unknown, _) | (_, TernaryValue::Unknown) => TernaryValue::Unknown,
            (a, b) if a == b => TernaryValue::Zero,
            _ => TernaryValue::One,
        }
    }

    const fn bits(self) -> u64 {
        match self {
            TernaryValue::Zero => 0b01,
            TernaryValue::One => 0b10,
            TernaryValue::Unknown => 0b11,
        }
    }
}

/// Outcome of a ternary simulation run.
#[derive(Debug, Clone)]
pub struct TernaryReport {
    /// Frames simulated before the state space closed.
    pub rounds: usize,
    /// Accumulated value of each latch, in latch id order.
    pub latch_values: Vec<(ObjId, TernaryValue)>,
}

impl TernaryReport {
    /// Latches that never leave a constant value.
    pub fn stuck_latches(&self) -> impl Iterator<Item = (ObjId, bool)> + '_ {
        self.latch_values.iter().filter_map(|&(id, v)| match v {
            TernaryValue::Zero => Some((id, false)),
            TernaryValue::One => Some((id, true)),
            TernaryValue::Unknown => None,
        })
    }
}

impl Aig {
    /// Ternary simulation to a repeated state. Errors when the state space
    /// does not close within [`XSIM_ROUND_MAX`] frames.
    pub fn ternary_simulate(&mut self) -> Result<TernaryReport, AigError> {
        let latches: Vec<ObjId> = self.obj_ids().filter(|&id| self.obj(id).is_latch()).collect();
        let order = self.xsim_order(&latches);
        let mut values: Vec<TernaryValue> = vec![TernaryValue::Unknown; self.obj_id_max()];
        values[0] = TernaryValue::One;
        for &pi in self.pis() {
            values[pi as usize] = TernaryValue::Unknown;
        }
        for &l in &latches {
            values[l as usize] = TernaryValue::Zero;
        }
        let mut states: Vec<Vec<u64>> = Vec::new();
        let words = ((2 * latches.len() + 63) / 64).max(1);
        let mut accumulated = vec![0u64; words];
        for round in 0..XSIM_ROUND_MAX {
            let state = self.xsim_state(&latches, &values, words);
            for (acc, w) in accumulated.iter_mut().zip(&state) {
                *acc |= w;
            }
            if states.iter().any(|s| *s == state) {
                let latch_values = latches
                    .iter()
                    .enumerate()
                    .map(|(i, &l)| {
                        let bits = (accumulated[2 * i / 64] >> (2 * i % 64)) & 0b11;
                        let v = match bits {
                            0b01 => TernaryValue::Zero,
                            0b10 => TernaryValue::One,
                            _ => TernaryValue::Unknown,
                        };
                        (l, v)
                    })
                    .collect();
                return Ok(TernaryReport {
                    rounds: round,
                    latch_values,
                });
            }
            states.push(state);
            self.xsim_frame(&order, &latches, &mut values);
        }
        Err(AigError::NonConvergent {
            rounds: XSIM_ROUND_MAX,
        })
    }

    /// Combinational evaluation order with latches as frame inputs.
    fn xsim_order(&mut self, latches: &[ObjId]) -> Vec<ObjId> {
        self.increment_trav_id();
        let mut order = Vec::new();
        let mut roots: Vec<ObjId> = Vec::new();
        for i in 0..self.pos.len() {
            let po = self.pos[i];
            if let Some(driver) = self.obj(po).fanin0() {
                roots.push(driver.id());
            }
        }
        for &l in latches {
            if let Some(driver) = self.obj(l).fanin0() {
                roots.push(driver.id());
            }
        }
        for root in roots {
            self.xsim_order_rec(root, &mut order);
        }
        order
    }

    fn xsim_order_rec(&mut self, id: ObjId, order: &mut Vec<ObjId>) {
        if self.is_trav_id_current(id) {
            return;
        }
        self.set_trav_id_current(id);
        let obj = self.obj(id);
        // latches are frame boundaries, inputs and constants frame leaves
        if obj.is_pi() || obj.is_const1() || obj.is_latch() {
            return;
        }
        let fan0 = obj.fanin0();
        let fan1 = obj.fanin1();
        for f in [fan0, fan1].into_iter().flatten() {
            self.xsim_order_rec(f.id(), order);
        }
        order.push(id);
    }

    fn xsim_state(&self, latches: &[ObjId], values: &[TernaryValue], words: usize) -> Vec<u64> {
        let mut state = vec![0u64; words];
        for (i, &l) in latches.iter().enumerate() {
            state[2 * i / 64] |= values[l as usize].bits() << (2 * i % 64);
        }
        state
    }

    /// Evaluates one frame and advances every latch to its fanin value.
    fn xsim_frame(&self, order: &[ObjId], latches: &[ObjId], values: &mut [TernaryValue]) {
        for &id in order {
            let obj = self.obj(id);
            let f0 = obj.fanin0().expect("interior object with fanin");
            let v0 = {
                let v = values[f0.id() as usize];
                if f0.is_complement() {
                    v.invert()
                } else {
                    v
                }
            };
            let value = match obj.fanin1() {
                Some(f1) => {
                    let v1 = {
                        let v = values[f1.id() as usize];
                        if f1.is_complement() {
                            v.invert()
                        } else {
                            v
                        }
                    };
                    if obj.is_exor() {
                        v0.exor(v1)
                    } else {
                        v0.and(v1)
                    }
                }
                None => v0,
            };
            values[id as usize] = value;
        }
        let next: Vec<TernaryValue> = latches
            .iter()
            .map(|&l| {
                let f = self.obj(l).fanin0().expect("latch fanin");
                let v = values[f.id() as usize];
                if f.is_complement() {
                    v.invert()
                } else {
                    v
                }
            })
            .collect();
        for (&l, v) in latches.iter().zip(next) {
            values[l as usize] = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn constant_latch_is_detected() {
        let mut aig = Aig::start(None);
        let x = aig.ith_var(0);
        let d = aig.ith_var(1);
        let g = aig.and(x, d);
        aig.create_po(g);
        // the trailing PI/PO pair becomes a latch fed constant zero
        aig.create_po(aig.const0());
        let report = aig.seq_strash(1, &[Init::Zero]).unwrap();
        assert!(report.is_none());
        let report = aig.ternary_simulate().unwrap();
        assert_eq!(report.latch_values.len(), 1);
        assert_eq!(report.stuck_latches().count(), 1);
        assert!(!report.stuck_latches().next().unwrap().1);
    }

    #[test]
    fn free_running_latch_is_unknown() {
        let mut aig = Aig::start(None);
        let x = aig.ith_var(0);
        let d = aig.ith_var(1);
        let g = aig.and(x, d);
        aig.create_po(g);
        // the latch samples a free primary input: X from the second frame on
        aig.create_po(x);
        aig.seq_strash(1, &[Init::Zero]).unwrap();
        let report = aig.ternary_simulate().unwrap();
        assert_eq!(report.stuck_latches().count(), 0);
    }
}
