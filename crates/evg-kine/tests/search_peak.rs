mod common;

use common::{numu_delta, running_q2, running_w, BoxLimits};
use evg_core::{Interaction, KinePhaseSpace, KineVar, Range1D, ResonanceChannel};
use evg_kine::{KineConfig, MaxXSecSearch, PhaseSpaceBounds};
use proptest::prelude::*;

fn log_peak(center: f64, sigma: f64) -> impl Fn(&Interaction, KinePhaseSpace) -> f64 + Send + Sync {
    move |interaction, _| {
        let d = (running_q2(interaction).ln() - center.ln()) / sigma;
        (-0.5 * d * d).exp()
    }
}

fn setup(config: &KineConfig) -> PhaseSpaceBounds {
    PhaseSpaceBounds::new(Box::new(BoxLimits::standard()), config)
}

#[test]
fn finds_single_peak_within_safety_factor() {
    let config = KineConfig::default();
    let bounds = setup(&config);
    let model = log_peak(0.3, 0.5);
    let mut interaction = numu_delta(2.0);

    let ceiling = MaxXSecSearch::new(&bounds, &model, &config).search(&mut interaction);

    let dense_peak = (0..=10_000)
        .map(|i| {
            let q2 = 0.01 * (100.0_f64).powf(i as f64 / 10_000.0);
            let d = (q2.ln() - 0.3_f64.ln()) / 0.5;
            (-0.5 * d * d).exp()
        })
        .fold(0.0_f64, f64::max);

    assert_eq!(ceiling.safety_factor, 1.25);
    assert!(ceiling.raw_max <= dense_peak + 1e-12);
    assert!(ceiling.raw_max > 0.99 * dense_peak);
    assert!(ceiling.value >= dense_peak);
    assert!((ceiling.value - 1.25 * ceiling.raw_max).abs() < 1e-12);
    assert!(ceiling.evaluations <= 15 + 3);
    assert!(interaction.kinematics.running(KineVar::W).is_none());
    assert!(interaction.kinematics.running(KineVar::Q2).is_none());
}

#[test]
fn monotonic_function_scans_the_full_grid() {
    let config = KineConfig::default();
    let bounds = setup(&config);
    let model = |interaction: &Interaction, _: KinePhaseSpace| running_q2(interaction);
    let mut interaction = numu_delta(2.0);

    let ceiling = MaxXSecSearch::new(&bounds, &model, &config).search(&mut interaction);

    assert_eq!(ceiling.evaluations, 15);
    assert!((ceiling.raw_max - (1.0 - 1e-6)).abs() < 1e-9);
}

#[test]
fn decreasing_function_refines_after_second_point() {
    let config = KineConfig::default();
    let bounds = setup(&config);
    let model = |interaction: &Interaction, _: KinePhaseSpace| 1.0 / running_q2(interaction);
    let mut interaction = numu_delta(2.0);

    let ceiling = MaxXSecSearch::new(&bounds, &model, &config).search(&mut interaction);

    assert!(ceiling.evaluations <= 2 + 3);
    assert!((ceiling.raw_max - 1.0 / (0.01 + 1e-6)).abs() < 1e-3);
}

#[test]
fn w_is_pinned_at_resonance_mass_or_boundary() {
    let config = KineConfig {
        wcut: None,
        ..KineConfig::default()
    };
    let bounds = setup(&config);
    let seen = std::sync::Mutex::new(Vec::new());
    let model = |interaction: &Interaction, _: KinePhaseSpace| {
        seen.lock().unwrap().push(running_w(interaction));
        1.0
    };

    let mut delta = numu_delta(2.0);
    MaxXSecSearch::new(&bounds, &model, &config).search(&mut delta);
    assert!(seen.lock().unwrap().iter().all(|w| *w == 1.232));

    seen.lock().unwrap().clear();
    let mut heavy = numu_delta(2.0);
    heavy.channel = ResonanceChannel::Known(evg_core::Resonance::F37_1950);
    let narrow = KineConfig {
        wcut: Some(1.5),
        ..KineConfig::default()
    };
    let narrow_bounds = setup(&narrow);
    MaxXSecSearch::new(&narrow_bounds, &model, &narrow).search(&mut heavy);
    assert!(seen
        .lock()
        .unwrap()
        .iter()
        .all(|w| (*w - (1.5 - 1e-6)).abs() < 1e-12));
}

#[test]
fn low_energy_uses_larger_safety_factor() {
    let config = KineConfig::default();
    let bounds = setup(&config);
    let model = log_peak(0.3, 0.5);
    let search = MaxXSecSearch::new(&bounds, &model, &config);
    assert_eq!(search.safety_factor(&numu_delta(0.5)), 2.0);
    assert_eq!(search.safety_factor(&numu_delta(0.8)), 1.25);

    let mut interaction = numu_delta(0.5);
    let ceiling = search.search(&mut interaction);
    assert!((ceiling.value - 2.0 * ceiling.raw_max).abs() < 1e-12);
}

#[test]
fn tiny_q2_range_gives_zero_ceiling() {
    let config = KineConfig::default();
    let bounds = PhaseSpaceBounds::new(
        Box::new(BoxLimits {
            w: Range1D::new(1.0, 2.0),
            q2: Range1D::new(1e-6, 5e-5),
        }),
        &config,
    );
    let model = log_peak(0.3, 0.5);
    let mut interaction = numu_delta(2.0);
    let ceiling = MaxXSecSearch::new(&bounds, &model, &config).search(&mut interaction);
    assert_eq!(ceiling.value, 0.0);
    assert_eq!(ceiling.evaluations, 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn ceiling_never_below_grid_values(center in 0.02f64..0.9, sigma in 0.3f64..2.0) {
        let config = KineConfig::default();
        let bounds = setup(&config);
        let model = log_peak(center, sigma);
        let mut interaction = numu_delta(2.0);
        let ceiling = MaxXSecSearch::new(&bounds, &model, &config).search(&mut interaction);

        prop_assert!(ceiling.raw_max > 0.0);
        prop_assert!(ceiling.raw_max <= 1.0 + 1e-12);
        prop_assert!(ceiling.value >= ceiling.raw_max);
    }
}
