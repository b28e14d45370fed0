// Properties of compiled tuning configs

use xen_tuner::{parse_tuning_config, TuningConfig, DEFAULT_TUNING_CONFIG};

const NEGATIVE_EQUAVE: &str = "A4: 440
0 -200c -300c -500c -700c -800c -1000c -1200c
bb b (-100c) # x";

const MEANTONE: &str = "A4: 440
0 193.157c 310.265c 503.422c 696.578c 813.686c 1006.843c 1200c
bb b (76.049c) # x";

/// Cents before wrapping, summed from the nominal and chain degrees
fn raw_cents(config: &TuningConfig, hash: &str) -> f64 {
    let nominal = config.note(hash).unwrap().nominal;
    let av = config.av(hash).unwrap();
    let chains: f64 = config
        .acc_chains
        .iter()
        .zip(av)
        .filter(|(_, &degree)| degree != 0)
        .map(|(chain, &degree)| chain.tunings[(degree + chain.central_idx as i32) as usize])
        .sum();
    config.nominals[nominal] + chains
}

fn assert_wrapped(config: &TuningConfig) {
    let equave = config.equave_size;
    for (hash, entry) in &config.tuning_table {
        assert!(
            entry.cents >= 0.0 && entry.cents < equave.abs(),
            "'{}' wrapped to {} outside [0, {})",
            hash,
            entry.cents,
            equave.abs()
        );
        let raw = raw_cents(config, hash);
        assert!(
            (entry.unwrapped(equave) - raw).abs() < 1e-6,
            "'{}' unwraps to {} instead of {}",
            hash,
            entry.unwrapped(equave),
            raw
        );
    }
}

#[test]
fn test_cents_wrap_invariant() {
    assert_wrapped(&parse_tuning_config(DEFAULT_TUNING_CONFIG).unwrap());
    assert_wrapped(&parse_tuning_config(MEANTONE).unwrap());
}

#[test]
fn test_cents_wrap_invariant_negative_equave() {
    let config = parse_tuning_config(NEGATIVE_EQUAVE).unwrap();
    assert!(config.equave_size < 0.0);
    assert_wrapped(&config);
}

#[test]
fn test_every_spelling_has_a_step() {
    let config = parse_tuning_config(DEFAULT_TUNING_CONFIG).unwrap();
    // 7 nominals x 7 chain degrees
    assert_eq!(config.notes_table.len(), 49);
    assert_eq!(config.steps_list.len(), 12);

    let listed: usize = config.steps_list.iter().map(|s| s.len()).sum();
    assert_eq!(listed, config.notes_table.len());
    for (step, hashes) in config.steps_list.iter().enumerate() {
        for hash in hashes {
            assert_eq!(config.steps_lookup[hash], step);
        }
    }
}

#[test]
fn test_steps_ascend_in_cents() {
    let config = parse_tuning_config(MEANTONE).unwrap();
    let cents: Vec<f64> = config
        .steps_list
        .iter()
        .map(|step| config.tuning(&step[0]).unwrap().cents)
        .collect();
    for pair in cents.windows(2) {
        assert!(pair[0] < pair[1], "steps out of order: {:?}", cents);
    }
    // meantone keeps sharps and flats apart
    assert!(config.steps_list.len() > 12);
}

fn assert_enharmonic_symmetry(config: &TuningConfig) {
    for step in config.steps_list.iter().filter(|s| s.len() > 1) {
        for start in step {
            let mut hash = start.clone();
            for _ in 0..step.len() {
                hash = config.enharmonics[&hash].clone();
            }
            assert_eq!(&hash, start, "cycle from '{}' does not close", start);
        }
    }
}

#[test]
fn test_enharmonic_symmetry() {
    assert_enharmonic_symmetry(&parse_tuning_config(DEFAULT_TUNING_CONFIG).unwrap());
    assert_enharmonic_symmetry(&parse_tuning_config(NEGATIVE_EQUAVE).unwrap());
}

#[test]
fn test_compiled_config_survives_json() {
    let config = parse_tuning_config(DEFAULT_TUNING_CONFIG).unwrap();
    let json = config.to_json().unwrap();
    let restored = TuningConfig::from_json(&json).unwrap();
    assert_eq!(restored.steps_list, config.steps_list);
    assert_eq!(restored.enharmonics, config.enharmonics);
    assert_eq!(restored.notes_table.len(), config.notes_table.len());
}
