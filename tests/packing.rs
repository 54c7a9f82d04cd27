mod common;

use common::DpllSolver;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use setpack::{
    instances::fio::{self, dimacs},
    packing::{self, decode::Selection, encoding::Encoding, Outcome, SetPacking},
    types::Lit,
};

fn scenario(k: usize) -> SetPacking {
    SetPacking::new(5, vec![vec![1, 2], vec![3, 4], vec![1, 3], vec![5]], k).unwrap()
}

/// All selections of the instance's sets that are valid packings
fn packings(inst: &SetPacking) -> Vec<Selection> {
    let m = inst.n_sets();
    (0..1u32 << m)
        .map(|mask| {
            (1..=m)
                .filter(|&set| mask & (1 << (set - 1)) != 0)
                .collect::<Selection>()
        })
        .filter(|sel| sel.verify(inst).is_ok())
        .collect()
}

/// Enumerates all indicator assignments and returns the decoded selections
/// that extend to a model of the encoding
fn satisfying_selections(inst: &SetPacking) -> Vec<Selection> {
    let enc = Encoding::new(inst);
    let m = inst.n_sets();
    let mut sels = vec![];
    for mask in 0..1u32 << m {
        let fixed: Vec<Lit> = enc
            .indicators()
            .iter()
            .map(|(set, var)| {
                if mask & (1 << (set - 1)) != 0 {
                    var.pos_lit()
                } else {
                    var.neg_lit()
                }
            })
            .collect();
        if let Some(model) =
            common::solve(enc.instance().cnf(), enc.instance().n_vars(), &fixed)
        {
            sels.push(Selection::decode(&model, enc.indicators()));
        }
    }
    sels
}

#[test]
fn no_minimum_all_false() {
    let enc = Encoding::new(&scenario(0));
    let fixed: Vec<Lit> = enc.indicators().iter().map(|(_, v)| v.neg_lit()).collect();
    let model = common::solve(enc.instance().cnf(), enc.instance().n_vars(), &fixed).unwrap();
    assert!(Selection::decode(&model, enc.indicators()).is_empty());
}

#[test]
fn scenario_models_are_packings() {
    let inst = scenario(2);
    let sels = satisfying_selections(&inst);
    assert!(!sels.is_empty());
    for sel in &sels {
        assert_eq!(sel.verify(&inst), Ok(()));
        assert!(sel.len() >= 2);
        assert_ne!(sel.sets(), &[1, 3]);
    }
    // every packing of size at least two is admitted
    let expected: Vec<_> = packings(&inst)
        .into_iter()
        .filter(|sel| sel.len() >= 2)
        .collect();
    assert_eq!(sels, expected);
}

#[test]
fn scenario_too_large_minimum() {
    // {S1, S2, S4} is the largest packing
    let inst = scenario(4);
    assert!(satisfying_selections(&inst).is_empty());
    let mut solver = DpllSolver::default();
    assert_eq!(packing::solve(&inst, &mut solver).unwrap(), Outcome::Unsat);

    let inst = scenario(3);
    let mut solver = DpllSolver::default();
    match packing::solve(&inst, &mut solver).unwrap() {
        Outcome::Packing(sel) => {
            assert_eq!(sel.sets(), &[1, 2, 4]);
            assert_eq!(sel.verify(&inst), Ok(()));
        }
        outcome => panic!("unexpected outcome {outcome:?}"),
    }
}

#[test]
fn random_instances() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..60 {
        let n = rng.random_range(1..=6u32);
        let m = rng.random_range(0..=6usize);
        let sets: Vec<Vec<u32>> = (0..m)
            .map(|_| {
                let len = rng.random_range(0..=3);
                (0..len).map(|_| rng.random_range(1..=n)).collect()
            })
            .collect();
        let k = rng.random_range(0..=m);
        let inst = SetPacking::new(n, sets, k).unwrap();

        let max_packing = packings(&inst).iter().map(Selection::len).max().unwrap_or(0);
        let mut solver = DpllSolver::default();
        match packing::solve(&inst, &mut solver).unwrap() {
            Outcome::Packing(sel) => {
                assert!(k <= max_packing, "{inst:?}");
                assert_eq!(sel.verify(&inst), Ok(()), "{inst:?}");
            }
            Outcome::Unsat => assert!(k > max_packing, "{inst:?}"),
            Outcome::Unknown => panic!("in-process solver cannot be interrupted"),
        }

        if k > 0 {
            for sel in satisfying_selections(&inst) {
                assert_eq!(sel.verify(&inst), Ok(()), "{inst:?}");
            }
        }
    }
}

#[test]
fn dimacs_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("formula.cnf");
    let enc = Encoding::new(&scenario(2));
    enc.instance().write_dimacs_path(&path).unwrap();

    let (header, cnf) = dimacs::parse_cnf(fio::open_compressed_uncompressed_read(&path).unwrap())
        .unwrap();
    assert_eq!(header.n_vars, enc.instance().n_vars());
    assert_eq!(header.n_clauses, enc.instance().n_clauses());
    assert_eq!(&cnf, enc.instance().cnf());

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("p cnf 12 18\n-1 -3 0\n-2 -3 0\n"));
}

#[test]
fn parse_instance_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("instance.txt");
    std::fs::write(&path, "5 4 2\n1 2\n3 4\n1 3\n5\n").unwrap();
    let inst = SetPacking::from_path(&path).unwrap();
    assert_eq!(inst, scenario(2));
}
