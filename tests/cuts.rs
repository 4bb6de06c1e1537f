use aig_core::prelude::*;

#[test]
fn cut_counts_land_in_the_objects() {
    let mut aig = Aig::start(None);
    let out = aig.create_and(5);
    aig.create_po(out);
    let store = aig.compute_cuts(CutParams::default());
    for id in aig.live_ids() {
        let obj = aig.obj(id);
        if obj.is_node() {
            assert_eq!(obj.n_cuts() as usize, store.cuts(id).len());
            assert!(obj.n_cuts() >= 1, "every gate keeps its trivial cut");
        }
    }
}

#[test]
fn cut_truths_match_direct_evaluation() {
    let mut aig = Aig::start(None);
    let a = aig.ith_var(0);
    let b = aig.ith_var(1);
    let c = aig.ith_var(2);
    let d = aig.ith_var(3);
    let ab = aig.and(a, b);
    let cd = aig.or(c, d.not());
    let top = aig.and(ab, cd.not());
    aig.create_po(top);
    let params = CutParams {
        n_cuts_max: 16,
        n_leaf_max: 4,
        min_support: false,
    };
    let store = aig.compute_cuts(params);
    let mut scratch = Vec::new();
    let cuts = store.cuts(top.id());
    assert!(cuts.len() > 1, "merged cuts exist beside the trivial one");
    for cut in cuts {
        if cut.leaves() == [top.id()] {
            continue;
        }
        let leaves = cut.leaves().to_vec();
        let nodes = aig.collect_cut(top.id(), &leaves);
        let direct = aig.cut_truth(top.id(), &leaves, &nodes, &mut scratch);
        assert_eq!(cut.truth(), direct);
    }
    aig.check().unwrap();
}

#[test]
fn support_minimization_drops_vacuous_leaves() {
    let mut aig = Aig::start(None);
    let a = aig.ith_var(0);
    let b = aig.ith_var(1);
    // (a & b) | (a & !b) == a: b is in the structure but not the support
    let l = aig.and(a, b);
    let r = aig.and(a, b.not());
    let top = aig.or(l, r);
    aig.create_po(top);
    let store = aig.compute_cuts(CutParams {
        n_cuts_max: 16,
        n_leaf_max: 4,
        min_support: true,
    });
    let cuts = store.cuts(top.id());
    assert!(
        cuts.iter().any(|c| c.leaves() == [a.id()]),
        "the {{a, b}} cut must shrink to {{a}}"
    );
}

#[test]
fn leaf_bound_limits_cut_width() {
    let mut aig = Aig::start(None);
    let out = aig.create_and(10);
    aig.create_po(out);
    let params = CutParams {
        n_cuts_max: 32,
        n_leaf_max: 3,
        min_support: false,
    };
    let store = aig.compute_cuts(params);
    for id in aig.live_ids() {
        for cut in store.cuts(id) {
            assert!(cut.leaves().len() <= 3);
        }
    }
}
