use evg_core::{
    EventFlag, EventRecord, InitialState, Interaction, KineVar, Resonance, ResonanceChannel,
};

#[test]
fn record_round_trips_json() {
    let mut interaction = Interaction::new(
        InitialState::numu_proton(1.2),
        ResonanceChannel::Known(Resonance::D13_1520),
        0.105,
    );
    interaction.kinematics.lock(KineVar::W, 1.5);
    interaction.kinematics.lock(KineVar::Q2, 0.4);
    let mut record = EventRecord::new(interaction, 3.5e-38);
    record.set_flag(EventFlag::NoValidKinematics);

    let json = serde_json::to_string_pretty(&record).expect("serialize");
    let decoded: EventRecord = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(decoded, record);
    assert!(decoded.has_flag(EventFlag::NoValidKinematics));
    assert_eq!(decoded.interaction.kinematics.selected(KineVar::Q2), Some(0.4));
}

#[test]
fn channels_resolve_by_name() {
    assert_eq!(Resonance::from_name("P33(1232)"), Some(Resonance::P33_1232));
    assert_eq!(Resonance::from_name("F37_1950"), Some(Resonance::F37_1950));
    assert_eq!(Resonance::from_name("X99(9999)"), None);
    assert_eq!(ResonanceChannel::Generic.envelope_params(), (1.2, 0.6));
    assert_eq!(
        ResonanceChannel::Known(Resonance::P11_1440).envelope_params(),
        (1.440, 0.220)
    );
    assert_eq!(ResonanceChannel::Generic.scan_mass(), 1.23);
}
