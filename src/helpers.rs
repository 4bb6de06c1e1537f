//! Random-circuit helpers for randomized testing, enabled by the `random`
//! feature.

use crate::edge::Edge;
use crate::manager::Aig;

use rand::Rng;

/// Builds a random combinational design: `n_gates` gates over `n_pis`
/// inputs, with `n_pos` outputs picked from the built edges. Construction
/// goes through the canonical constructors, so the result satisfies every
/// manager invariant by construction.
pub fn random_aig<R: Rng>(rng: &mut R, n_pis: usize, n_gates: usize, n_pos: usize) -> Aig {
    assert!(n_pis > 0 && n_pos > 0);
    let mut aig = Aig::start(Some(n_pis + n_gates + n_pos));
    let mut edges: Vec<Edge> = (0..n_pis).map(|i| aig.ith_var(i)).collect();
    for _ in 0..n_gates {
        let a = pick(rng, &edges);
        let b = pick(rng, &edges);
        let built = match rng.gen_range(0..3) {
            0 => aig.and(a, b),
            1 => aig.or(a, b),
            _ => {
                let c = pick(rng, &edges);
                aig.mux(c, a, b)
            }
        };
        edges.push(built);
    }
    for _ in 0..n_pos {
        let driver = pick(rng, &edges);
        aig.create_po(driver);
    }
    aig
}

fn pick<R: Rng>(rng: &mut R, edges: &[Edge]) -> Edge {
    let e = edges[rng.gen_range(0..edges.len())];
    e.not_if(rng.gen_bool(0.5))
}
