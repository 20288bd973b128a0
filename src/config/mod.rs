//! Declarative training configuration: schema, loading and validation

mod loader;
mod schema;
mod validate;

pub use loader::{load_config, parse_config, ConfigFormat};
pub use schema::{
    BaseConfig, ClockConfig, DataloaderConfig, LRSchedulerConfig, LRSchedulerType, LrBound,
    ModelConfig, OptimizerConfig, Optimizers, PlateauMode, TrainingConfig,
};
pub use validate::validate_config;
