//! Any configuration that validates yields usable durations.

use proptest::prelude::*;
use vigil_core::config::VigilConfig;

fn seconds() -> impl Strategy<Value = f64> {
    prop_oneof![
        0.0f64..120.0,
        1e18f64..1e21,
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(-1.0),
    ]
}

proptest! {
    #[test]
    fn validated_durations_are_bounded(
        initial in seconds(),
        max in seconds(),
        reset in seconds(),
        deadline in seconds(),
        multiplier in 1.0f64..10.0,
        attempt in 0u32..200,
    ) {
        let mut config = VigilConfig::default();
        config.retry.initial_backoff_secs = initial;
        config.retry.max_backoff_secs = max;
        config.retry.multiplier = multiplier;
        config.circuit_breaker.reset_timeout_secs = reset;
        config.pipeline.default_deadline_secs = Some(deadline);

        if config.validate().is_ok() {
            let delay = config.retry.backoff_delay(attempt);
            prop_assert!(delay <= config.retry.max_backoff());
            prop_assert!(config.retry.initial_backoff() <= config.retry.max_backoff());
            prop_assert!(config.circuit_breaker.reset_timeout().as_secs_f64() <= 1e20);
            prop_assert!(config.pipeline.default_deadline().is_some());
        }
    }
}
