use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sympatry_detect::{DetectionProbs, simulate_detections};
use sympatry_joint::{Marginals, OddsRatios, SolverConfig, odds_ratio_from_conditionals, solve_joint};
use sympatry_model::{
    LinkParameters, ModelBuilder, ModelSpec, PosteriorDraws, Prior, detection_table,
    softmax_with_reference, truth_values,
};
use sympatry_occupancy::sample_occupancy;

const N_SITES: usize = 500;
const N_VISITS: usize = 5;
const DETECTION: [f64; 2] = [0.5, 0.9];

fn run(seed: u64) -> (ModelSpec, LinkParameters) {
    let marginals = Marginals::new([40.0 / 175.0, 85.0 / 175.0]).unwrap();
    let odds = OddsRatios::pair(odds_ratio_from_conditionals(0.6, 0.1).unwrap()).unwrap();
    let table = solve_joint(&marginals, &odds, &SolverConfig::new()).unwrap();

    let mut rng = StdRng::seed_from_u64(seed);
    let occupancy = sample_occupancy(&table, N_SITES, &mut rng).unwrap();
    let probs = DetectionProbs::new(DETECTION).unwrap();
    let history = simulate_detections(&occupancy, &probs, N_VISITS, &mut rng).unwrap();

    let spec = ModelBuilder::<2>::new()
        .build(history.observations(), &occupancy)
        .unwrap();
    (spec, LinkParameters::from_joint(&table).unwrap())
}

// ---------------------------------------------------------------------------
// 1. seeded_pipeline_is_reproducible
// ---------------------------------------------------------------------------
#[test]
fn seeded_pipeline_is_reproducible() {
    let (a, _) = run(42);
    let (b, _) = run(42);
    assert_eq!(a, b);
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());

    let (c, _) = run(43);
    assert_ne!(a.data.observations, c.data.observations);
}

// ---------------------------------------------------------------------------
// 2. bundle_dimensions_and_codes
// ---------------------------------------------------------------------------
#[test]
fn bundle_dimensions_and_codes() {
    let (spec, _) = run(7);
    assert_eq!(spec.n_species, 2);
    assert_eq!(spec.n_states, 4);
    assert_eq!(spec.data.site_count, N_SITES);
    assert_eq!(spec.data.visit_count, N_VISITS);
    assert_eq!(spec.data.observations.len(), N_SITES);
    for row in &spec.data.observations {
        assert_eq!(row.len(), N_VISITS);
        assert!(row.iter().all(|&y| (1..=4).contains(&y)));
    }
    assert_eq!(spec.inits.latent_states.len(), N_SITES);
    assert_eq!(spec.inits.link_parameters.len(), 3);
}

// ---------------------------------------------------------------------------
// 3. observations_consistent_with_latent_states
// ---------------------------------------------------------------------------
#[test]
fn observations_consistent_with_latent_states() {
    let (spec, _) = run(11);
    let table = detection_table(&DETECTION);
    for (row, &z) in spec.data.observations.iter().zip(&spec.inits.latent_states) {
        for &y in row {
            assert!(table.prob(z, usize::from(y)) > 0.0);
        }
    }
}

// ---------------------------------------------------------------------------
// 4. init_log_density_is_finite
// ---------------------------------------------------------------------------
#[test]
fn init_log_density_is_finite() {
    let (spec, _) = run(3);
    let ld = spec
        .log_density(
            &spec.inits.link_parameters,
            &spec.inits.detection_probs,
            &spec.inits.latent_states,
        )
        .unwrap();
    assert!(ld.is_finite());
}

// ---------------------------------------------------------------------------
// 5. link_inits_near_truth
// ---------------------------------------------------------------------------
#[test]
fn link_inits_near_truth() {
    let (spec, truth) = run(5);
    let init_psi = softmax_with_reference(&spec.inits.link_parameters);
    let true_psi = truth.state_probs();
    // 4 / sqrt(N) covers sampling noise in the state frequencies.
    let tol = 4.0 / (N_SITES as f64).sqrt();
    for (a, b) in init_psi.iter().zip(&true_psi) {
        assert_abs_diff_eq!(a, b, epsilon = tol);
    }
    assert_abs_diff_eq!(true_psi.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
}

// ---------------------------------------------------------------------------
// 6. softmax_extremes
// ---------------------------------------------------------------------------
#[test]
fn softmax_extremes() {
    for params in [[20.0, 20.0, 20.0], [-20.0, -20.0, -20.0], [20.0, -20.0, 0.0]] {
        let psi = softmax_with_reference(&params);
        assert!(psi.iter().all(|p| p.is_finite() && (0.0..=1.0).contains(p)));
        assert_abs_diff_eq!(psi.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }
}

// ---------------------------------------------------------------------------
// 7. json_hand_off_round_trip
// ---------------------------------------------------------------------------
#[test]
fn json_hand_off_round_trip() {
    let (spec, _) = run(9);
    let json = spec.to_json().unwrap();
    let back = ModelSpec::from_json(&json).unwrap();
    assert_eq!(back, spec);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["priors"]["link"]["family"], "normal");
    assert_eq!(value["statements"][0]["target"], "beta");
}

// ---------------------------------------------------------------------------
// 8. custom_priors_survive_build
// ---------------------------------------------------------------------------
#[test]
fn custom_priors_survive_build() {
    let (spec, _) = run(1);
    let obs = sympatry_detect::ObservationMatrix::from_codes(
        2,
        N_SITES,
        N_VISITS,
        spec.data.observations.concat(),
    )
    .unwrap();
    let truth = sympatry_occupancy::OccupancyMatrix::<2>::from_rows(
        spec.inits
            .latent_states
            .iter()
            .map(|&z| sympatry_joint::combination_bits::<2>(z - 1))
            .collect(),
    )
    .unwrap();
    let beta_prior = Prior::Beta {
        alpha: 2.0,
        beta: 2.0,
    };
    let rebuilt = ModelBuilder::<2>::new()
        .with_link_prior(Prior::Normal { mean: 0.0, sd: 3.0 })
        .with_detection_prior(beta_prior)
        .with_detection_init([0.3, 0.7])
        .build(&obs, &truth)
        .unwrap();
    assert_eq!(rebuilt.priors.detection, beta_prior);
    assert_eq!(rebuilt.inits.detection_probs, vec![0.3, 0.7]);
    assert_eq!(rebuilt.inits.latent_states, spec.inits.latent_states);
}

// ---------------------------------------------------------------------------
// 9. compare_against_synthetic_draws
// ---------------------------------------------------------------------------
#[test]
fn compare_against_synthetic_draws() {
    let (_, link) = run(2);
    let truth = truth_values(&link, &DETECTION);

    // Draws centred on the truth with a small symmetric spread.
    let mut draws = PosteriorDraws::default();
    for (k, &b) in link.values().iter().enumerate() {
        let chain: Vec<f64> = (-10..=10).map(|d| b + f64::from(d) * 0.01).collect();
        draws.insert(format!("beta[{}]", k + 1), vec![chain.clone(), chain]);
    }
    for (s, &p) in DETECTION.iter().enumerate() {
        let chain: Vec<f64> = (-10..=10).map(|d| p + f64::from(d) * 0.001).collect();
        draws.insert(format!("p[{}]", s + 1), vec![chain]);
    }
    let draws = draws.with_derived_psi(4).unwrap();

    let rows = draws.compare_to_truth(&truth).unwrap();
    assert_eq!(rows.len(), truth.len());
    for row in &rows {
        assert!(row.covered, "{} not covered", row.name);
        assert!(row.abs_error < 1e-9, "{} error {}", row.name, row.abs_error);
    }
}
