use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sympatry_joint::{JointTable, Marginals, OddsRatios, SolverConfig, solve_joint};
use sympatry_occupancy::sample_occupancy;
use sympatry_stats::{cooccurrence_rate, frequency};

fn scenario_table() -> JointTable<2> {
    let marginals = Marginals::new([40.0 / 175.0, 85.0 / 175.0]).unwrap();
    let odds = OddsRatios::pair(2.0 / 27.0).unwrap();
    solve_joint(&marginals, &odds, &SolverConfig::new()).unwrap()
}

// ---------------------------------------------------------------------------
// 1. empirical_marginals_converge
// ---------------------------------------------------------------------------
#[test]
fn empirical_marginals_converge() {
    let table = scenario_table();
    let n = 200_000;
    let mut rng = StdRng::seed_from_u64(2024);
    let occ = sample_occupancy(&table, n, &mut rng).unwrap();

    // Four standard errors of a proportion is at most 4 * 0.5 / sqrt(n).
    let tol = 2.0 / (n as f64).sqrt();

    let a = occ.species_column(0);
    let b = occ.species_column(1);
    assert_abs_diff_eq!(frequency(a.iter().copied()), table.marginal(0), epsilon = tol);
    assert_abs_diff_eq!(frequency(b.iter().copied()), table.marginal(1), epsilon = tol);
    assert_abs_diff_eq!(cooccurrence_rate(&a, &b), table.prob(3), epsilon = tol);
}

// ---------------------------------------------------------------------------
// 2. empirical_table_converges
// ---------------------------------------------------------------------------
#[test]
fn empirical_table_converges() {
    let table = scenario_table();
    for (seed, n) in [(1u64, 1_000usize), (2, 100_000)] {
        let mut rng = StdRng::seed_from_u64(seed);
        let occ = sample_occupancy(&table, n, &mut rng).unwrap();
        let empirical = occ.empirical_table();
        let err = sympatry_stats::max_abs_diff(&empirical, table.probs());
        assert!(
            err < 2.0 / (n as f64).sqrt(),
            "n={n}: max deviation {err} exceeds tolerance"
        );
    }
}

// ---------------------------------------------------------------------------
// 3. three_species_correlation
// ---------------------------------------------------------------------------
#[test]
fn three_species_correlation() {
    let marginals = Marginals::new([0.3, 0.5, 0.4]).unwrap();
    let odds = OddsRatios::new([[1.0, 6.0, 1.0], [6.0, 1.0, 0.3], [1.0, 0.3, 1.0]]).unwrap();
    let table = solve_joint(&marginals, &odds, &SolverConfig::new()).unwrap();

    let n = 100_000;
    let mut rng = StdRng::seed_from_u64(77);
    let occ = sample_occupancy(&table, n, &mut rng).unwrap();
    let tol = 2.0 / (n as f64).sqrt();

    for s in 0..3 {
        let col = occ.species_column(s);
        assert_abs_diff_eq!(frequency(col), marginals.get(s), epsilon = tol);
    }
    let pair = table.pair_table(0, 1);
    assert_abs_diff_eq!(
        cooccurrence_rate(&occ.species_column(0), &occ.species_column(1)),
        pair[1][1],
        epsilon = tol
    );
}
