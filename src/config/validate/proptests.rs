//! Property-based tests for configuration validation

use super::validator::validate_config;
use crate::config::schema::*;
use crate::error::Error;
use crate::time::TimeValue;
use proptest::prelude::*;

fn arb_valid_config() -> impl Strategy<Value = BaseConfig> {
    (
        1u64..256,                          // batch_size
        1e-6f64..1.0,                       // learning_rate
        1u64..100,                          // duration in epochs
        1u64..16,                           // gradient_accumulation in steps
        proptest::option::of(0.1f64..10.0), // gradient clipping
    )
        .prop_map(|(batch_size, learning_rate, epochs, accumulation, clip)| BaseConfig {
            training: TrainingConfig {
                duration: TimeValue::epochs(epochs),
                batch_size,
                gradient_accumulation: TimeValue::steps(accumulation),
                gradient_clipping_max_norm: clip,
                ..Default::default()
            },
            optimizer: OptimizerConfig { learning_rate, ..OptimizerConfig::new(Optimizers::Adam) },
            lr_scheduler: LRSchedulerConfig::default(),
            clock: ClockConfig::default(),
            dataloader: DataloaderConfig::default(),
            models: Default::default(),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_config_passes(config in arb_valid_config()) {
        let declared = validate_config(&config).unwrap();
        prop_assert_eq!(declared.duration, config.training.duration);
        prop_assert_eq!(declared.gradient_accumulation, config.training.gradient_accumulation);
    }

    #[test]
    fn prop_zero_batch_size_fails(config in arb_valid_config()) {
        let mut config = config;
        config.training.batch_size = 0;
        prop_assert!(matches!(
            validate_config(&config),
            Err(Error::ConfigValue { ref field, .. }) if field == "batch_size"
        ), "expected ConfigValue error for batch_size");
    }

    #[test]
    fn prop_non_positive_lr_fails(config in arb_valid_config(), lr in -10.0f64..=0.0) {
        let mut config = config;
        config.optimizer.learning_rate = lr;
        prop_assert!(validate_config(&config).is_err());
    }

    #[test]
    fn prop_validated_config_binds_with_dataset_length(
        config in arb_valid_config(),
        dataset_length in 1u64..10_000,
    ) {
        let declared = validate_config(&config).unwrap();
        let context = config.run_context(Some(dataset_length)).unwrap();
        prop_assert!(declared.bind(context).is_ok());
    }
}
