//! Property-based tests for configuration system.

use super::merger::ConfigMerger;
use super::schema::{Config, OutputFormat, ReservationConfig, RetryConfig};
use proptest::prelude::*;

fn retry_strategy() -> impl Strategy<Value = RetryConfig> {
    (
        prop::option::of(1u32..=10),
        prop::option::of(0u64..10_000),
        prop::option::of(0u64..10_000),
    )
        .prop_map(|(max_attempts, initial_backoff_ms, max_backoff_ms)| RetryConfig {
            max_attempts,
            initial_backoff_ms,
            max_backoff_ms,
        })
}

fn config_strategy() -> impl Strategy<Value = Config> {
    (
        prop::option::of((prop::option::of(1u64..), prop::option::of(retry_strategy()))),
        prop::option::of(any::<bool>()),
        prop::option::of(1u64..3600),
        prop::option::of(prop_oneof![
            Just(OutputFormat::Json),
            Just(OutputFormat::Csv),
            Just(OutputFormat::Table),
        ]),
    )
        .prop_map(|(reservation, recover, lock_wait, format)| Config {
            reservation: reservation.map(|(max_duration_ms, expiry_retry)| ReservationConfig {
                max_duration_ms,
                expiry_retry,
            }),
            recover_on_start: recover,
            maximum_lock_wait_seconds: lock_wait,
            output_format: format,
            ..Default::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1000,
        .. ProptestConfig::default()
    })]

    // A set field in the higher layer always wins; an unset one never erases.
    #[test]
    fn config_merge_higher_precedence_wins(low in config_strategy(), high in config_strategy()) {
        let mut merged = low.clone();
        ConfigMerger::merge_into(&mut merged, &high);

        prop_assert_eq!(merged.recover_on_start, high.recover_on_start.or(low.recover_on_start));
        prop_assert_eq!(
            merged.maximum_lock_wait_seconds,
            high.maximum_lock_wait_seconds.or(low.maximum_lock_wait_seconds)
        );
        prop_assert_eq!(merged.output_format, high.output_format.or(low.output_format));
        prop_assert_eq!(merged.max_duration_ms(), high.max_duration_ms().or(low.max_duration_ms()));
    }

    #[test]
    fn config_merge_is_idempotent(config in config_strategy()) {
        let mut merged = config.clone();
        ConfigMerger::merge_into(&mut merged, &config);
        prop_assert_eq!(merged, config);
    }

    #[test]
    fn config_merge_onto_empty_is_identity(config in config_strategy()) {
        let mut merged = Config::default();
        ConfigMerger::merge_into(&mut merged, &config);
        prop_assert_eq!(merged, config);
    }
}
