use aig_core::prelude::*;

#[test]
fn linear_chain_balances_to_depth_three() {
    let mut aig = Aig::start(None);
    // depth-7 right-linear AND chain over 8 inputs
    let mut chain = aig.ith_var(0);
    for i in 1..8 {
        let v = aig.ith_var(i);
        chain = aig.and(chain, v);
    }
    aig.create_po(chain);
    assert_eq!(aig.levels(), 7);
    let (balanced, report) = aig.balance(true);
    assert!(report.is_none());
    assert_eq!(balanced.levels(), 3);
    balanced.check().unwrap();
    balanced.check_levels().unwrap();
}

#[test]
fn balance_twice_changes_nothing() {
    let mut aig = Aig::start(None);
    let vars: Vec<_> = (0..6).map(|i| aig.ith_var(i)).collect();
    let mut left = vars[0];
    for &v in &vars[1..4] {
        left = aig.and(left, v);
    }
    let right = aig.mux(vars[4], left, vars[5]);
    let deep = aig.and(left, right);
    aig.create_po(deep);
    aig.create_po(right.not());
    let (once, r1) = aig.balance(true);
    assert!(r1.is_none());
    let (mut again, _) = aig.balance(true);
    let (twice, r2) = again.balance(true);
    assert!(r2.is_none());
    assert_eq!(once.node_num(), twice.node_num());
    assert_eq!(once.levels(), twice.levels());
    assert_eq!(once.pi_num(), twice.pi_num());
    assert_eq!(once.po_num(), twice.po_num());
}

#[test]
fn balance_preserves_function() {
    let mut aig = Aig::start(None);
    let vars: Vec<_> = (0..5).map(|i| aig.ith_var(i)).collect();
    let mut chain = vars[0];
    for &v in &vars[1..] {
        chain = aig.and(chain, v);
    }
    let side = aig.or(vars[1], vars[3].not());
    let top = aig.and(chain, side);
    aig.create_po(top);
    aig.create_po(side);
    let (mut balanced, report) = aig.balance(true);
    assert!(report.is_none());
    let sim = aig
        .simulate_pair(&mut balanced, "", false)
        .expect("balanced design must stay equivalent");
    assert_eq!(sim.patterns, 32);
}

#[test]
fn balance_keeps_shared_gates_shared() {
    let mut aig = Aig::start(None);
    let a = aig.ith_var(0);
    let b = aig.ith_var(1);
    let c = aig.ith_var(2);
    let d = aig.ith_var(3);
    let ab = aig.and(a, b);
    let abc = aig.and(ab, c);
    let abd = aig.and(ab, d);
    aig.create_po(abc);
    aig.create_po(abd);
    let (balanced, report) = aig.balance(true);
    assert!(report.is_none());
    // the shared (a & b) gate must not be duplicated by the reshaping
    assert!(balanced.node_num() <= aig.node_num());
    balanced.check().unwrap();
}

#[test]
fn exor_supergates_balance_with_capture() {
    let mut aig = Aig::with_exor_capture(None);
    let mut chain = aig.ith_var(0);
    for i in 1..4 {
        let v = aig.ith_var(i);
        chain = aig.exor(chain, v);
    }
    aig.create_po(chain);
    // linear EXOR chain costs two levels per gate
    assert_eq!(aig.levels(), 6);
    let (balanced, report) = aig.balance(true);
    assert!(report.is_none());
    assert_eq!(balanced.levels(), 4);
    balanced.check().unwrap();
}
