use aig_core::helpers::random_aig;
use aig_core::prelude::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn random_designs_survive_dup_and_balance() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for round in 0..20 {
        let n_pis = 3 + (round % 6);
        let mut aig = random_aig(&mut rng, n_pis, 30, 3);
        aig.check().expect("random construction is consistent");
        aig.check_levels().expect("levels are exact after construction");

        let mut copy = aig.dup(true);
        copy.check().unwrap();
        let report = aig
            .simulate_pair(&mut copy, "", false)
            .expect("ordered dup preserves the function");
        assert_eq!(report.patterns, 1u128 << n_pis);

        let (mut balanced, check) = aig.balance(true);
        assert!(check.is_none());
        aig.simulate_pair(&mut balanced, "", false)
            .expect("balancing preserves the function");
    }
}

#[test]
fn random_designs_survive_cut_enumeration() {
    let mut rng = StdRng::seed_from_u64(0xcafe);
    let mut aig = random_aig(&mut rng, 6, 40, 2);
    // keep cuts structural so a direct cone evaluation can replay them
    let params = CutParams {
        min_support: false,
        ..CutParams::default()
    };
    let store = aig.compute_cuts(params);
    let mut scratch = Vec::new();
    for id in aig.live_ids() {
        if !aig.obj(id).is_node() {
            continue;
        }
        for cut in store.cuts(id) {
            // every stored cut's function must match a direct cone evaluation
            let leaves: Vec<_> = cut.leaves().to_vec();
            let nodes = aig.collect_cut(id, &leaves);
            let direct = aig.cut_truth(id, &leaves, &nodes, &mut scratch);
            assert_eq!(cut.truth(), direct, "cut truth diverges on node {id}");
        }
    }
    aig.check().unwrap();
}
