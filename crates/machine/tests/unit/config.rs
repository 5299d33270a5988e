//! Configuration tests: defaults, JSON deserialization, and mode parameters.

use bytesim_core::{Config, MachineMode};

#[test]
fn default_config_is_standard_and_unlimited() {
    let config = Config::default();
    assert_eq!(config.mode, MachineMode::Standard);
    assert_eq!(config.clock_hz, 0);
    assert_eq!(config.step_budget, 10_000);
}

#[test]
fn config_deserializes_from_json_with_defaults() {
    let config: Config =
        serde_json::from_str(r#"{"mode": "expanded", "clock_hz": 50}"#).expect("valid json");
    assert_eq!(config.mode, MachineMode::Expanded);
    assert_eq!(config.clock_hz, 50);
    assert_eq!(config.step_budget, 10_000);
}

#[test]
fn mode_parameters_match_the_two_regimes() {
    assert_eq!(MachineMode::Standard.address_bits(), 8);
    assert_eq!(MachineMode::Standard.memory_limit(), 256);
    assert_eq!(MachineMode::Standard.pc_step(), 2);

    assert_eq!(MachineMode::Expanded.address_bits(), 32);
    assert_eq!(MachineMode::Expanded.memory_limit(), 1 << 32);
    assert_eq!(MachineMode::Expanded.pc_step(), 1);

    assert_eq!(MachineMode::Standard.data_bits(), 8);
    assert_eq!(MachineMode::Expanded.data_bits(), 8);
}
