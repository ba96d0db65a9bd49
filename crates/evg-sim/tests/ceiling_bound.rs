use evg_core::{Interaction, Resonance, ResonanceChannel, RngHandle, UniformSource};
use evg_kine::KinematicsSelector;
use evg_sim::{build_selector, RunConfig, ToyResonanceModel};

const DRAWS: usize = 10_000;

fn channels() -> Vec<ResonanceChannel> {
    Resonance::ALL
        .into_iter()
        .map(ResonanceChannel::Known)
        .chain(std::iter::once(ResonanceChannel::Generic))
        .collect()
}

fn interaction(config: &RunConfig, channel: ResonanceChannel, energy: f64) -> Interaction {
    let mut interaction = config.beam.interaction(energy);
    interaction.channel = channel;
    interaction
}

/// Largest `σ / ceiling` over uniform draws of W, then Q² at that W.
fn worst_ratio(
    selector: &KinematicsSelector,
    model: &ToyResonanceModel,
    interaction: &Interaction,
    ceiling: f64,
    rng: &mut RngHandle,
) -> f64 {
    let w_range = selector.bounds().w_range(interaction);
    assert!(!w_range.is_empty(), "no W range at {interaction}");
    let mut worst = 0.0_f64;
    for _ in 0..DRAWS {
        let w = w_range.min + w_range.width() * rng.uniform();
        let q2_range = selector.bounds().q2_range(interaction, w);
        if q2_range.is_empty() {
            continue;
        }
        let q2 = q2_range.min + q2_range.width() * rng.uniform();
        let xsec = model.at(interaction.channel, w, q2);
        assert!(
            xsec <= ceiling,
            "{interaction}: xsec {xsec} above ceiling {ceiling} at W={w}, Q2={q2}"
        );
        worst = worst.max(xsec / ceiling);
    }
    worst
}

#[test]
fn ceiling_bounds_toy_model_for_every_channel_and_energy() {
    let config = RunConfig::default();
    let model = ToyResonanceModel::new(&config.model);
    let mut rng = RngHandle::from_seed(2024);
    // Either side of the low-energy threshold (0.8) and of the caching
    // threshold (1.0), then well above both.
    let energies = [0.7, 0.79, 0.81, 0.99, 1.0, 1.6, 3.0];

    let mut worst = 0.0_f64;
    for channel in channels() {
        let mut selector = build_selector(&config).unwrap();
        for energy in energies {
            let mut interaction = interaction(&config, channel, energy);
            let ceiling = selector.max_xsec(&mut interaction);
            assert!(ceiling.value > 0.0, "zero ceiling at {interaction}");
            let ratio = worst_ratio(&selector, &model, &interaction, ceiling.value, &mut rng);
            worst = worst.max(ratio);
        }
    }
    assert!(worst > 0.1, "draws never came near the peak: {worst}");
}

#[test]
fn cached_ceiling_bounds_the_top_of_its_energy_bin() {
    let config = RunConfig::default();
    let model = ToyResonanceModel::new(&config.model);
    let mut rng = RngHandle::from_seed(77);
    // First energy of each pair fills the cache, the second sits near the top
    // of the same 0.05 GeV bin and is answered from it.
    let pairs = [(1.0, 1.049), (1.61, 1.649), (2.5, 2.549)];

    for channel in channels() {
        let mut selector = build_selector(&config).unwrap();
        for (low, high) in pairs {
            let mut first = interaction(&config, channel, low);
            let mut second = interaction(&config, channel, high);
            assert_eq!(
                selector.cache().signature(&first),
                selector.cache().signature(&second)
            );

            let stored = selector.max_xsec(&mut first);
            let hits = selector.stats().cache_hits;
            let reused = selector.max_xsec(&mut second);
            assert_eq!(selector.stats().cache_hits, hits + 1);
            assert_eq!(reused, stored);

            worst_ratio(&selector, &model, &second, reused.value, &mut rng);
        }
    }
}
