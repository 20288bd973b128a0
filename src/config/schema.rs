//! Declarative training configuration
//!
//! Time-valued fields accept an integer, a `"<n> <unit>"` string or a
//! `{ number, unit }` record; each field applies its own unit rules (see
//! [`TimeField`]).

use crate::error::Result;
use crate::resolve::RunContext;
use crate::schedule::{ConstantLR, DeclaredSchedule, LRScheduler, MultiStepLR, StepDecayLR};
use crate::time::{TimeField, TimeValue};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

macro_rules! time_field_deserializer {
    ($($name:ident => $field:expr),* $(,)?) => {
        $(
            fn $name<'de, D>(deserializer: D) -> std::result::Result<TimeValue, D::Error>
            where
                D: Deserializer<'de>,
            {
                $field.deserialize(deserializer)
            }
        )*
    };
}

time_field_deserializer! {
    de_duration => TimeField::DURATION,
    de_gradient_accumulation => TimeField::GRADIENT_ACCUMULATION,
    de_evaluation_interval => TimeField::EVALUATION_INTERVAL,
    de_update_interval => TimeField::UPDATE_INTERVAL,
    de_warmup => TimeField::WARMUP,
}

/// Training loop parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    pub device: String,
    pub dtype: String,

    /// Total training length; bare integers are iterations
    #[serde(deserialize_with = "de_duration")]
    pub duration: TimeValue,

    pub seed: u64,

    /// Samples per mini-batch
    pub batch_size: u64,

    /// Accumulation window; steps or epochs only, bare integers are steps
    #[serde(deserialize_with = "de_gradient_accumulation")]
    pub gradient_accumulation: TimeValue,

    /// Distance between evaluations; steps or epochs only, bare integers are steps
    #[serde(deserialize_with = "de_evaluation_interval")]
    pub evaluation_interval: TimeValue,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient_clipping_max_norm: Option<f64>,

    pub evaluation_seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            device: "cpu".to_string(),
            dtype: "float32".to_string(),
            duration: TimeValue::iterations(1),
            seed: 0,
            batch_size: 1,
            gradient_accumulation: TimeValue::steps(1),
            evaluation_interval: TimeValue::steps(1),
            gradient_clipping_max_norm: None,
            evaluation_seed: 0,
        }
    }
}

/// Optimizer family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Optimizers {
    #[serde(rename = "SGD")]
    Sgd,
    Adam,
    AdamW,
    AdamW8bit,
    Lion8bit,
    Prodigy,
}

/// Optimizer hyperparameters
///
/// Only carried and validated here; constructing the optimizer is up to the
/// training framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizerConfig {
    pub optimizer: Optimizers,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_betas")]
    pub betas: (f64, f64),
    #[serde(default = "default_eps")]
    pub eps: f64,
    #[serde(default = "default_weight_decay")]
    pub weight_decay: f64,
}

impl OptimizerConfig {
    pub fn new(optimizer: Optimizers) -> Self {
        Self {
            optimizer,
            learning_rate: default_learning_rate(),
            betas: default_betas(),
            eps: default_eps(),
            weight_decay: default_weight_decay(),
        }
    }
}

fn default_learning_rate() -> f64 {
    1e-4
}

fn default_betas() -> (f64, f64) {
    (0.9, 0.999)
}

fn default_eps() -> f64 {
    1e-8
}

fn default_weight_decay() -> f64 {
    1e-2
}

/// Learning rate scheduler family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LRSchedulerType {
    StepLR,
    ExponentialLR,
    ReduceLROnPlateau,
    CosineAnnealingLR,
    #[default]
    ConstantLR,
    LambdaLR,
    OneCycleLR,
    MultiplicativeLR,
    CosineAnnealingWarmRestarts,
    CyclicLR,
    MultiStepLR,
}

/// Direction a plateau scheduler watches the metric in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateauMode {
    #[default]
    Min,
    Max,
}

/// One learning-rate bound for all parameter groups, or one per group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LrBound {
    Single(f64),
    PerGroup(Vec<f64>),
}

impl Default for LrBound {
    fn default() -> Self {
        Self::Single(0.0)
    }
}

/// Learning rate scheduler parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LRSchedulerConfig {
    #[serde(rename = "type")]
    pub kind: LRSchedulerType,

    /// Distance between scheduler updates; iterations or epochs, bare integers are iterations
    #[serde(deserialize_with = "de_update_interval")]
    pub update_interval: TimeValue,

    /// Warmup window; any unit, bare integers are iterations
    #[serde(deserialize_with = "de_warmup")]
    pub warmup: TimeValue,

    pub gamma: f64,
    pub mode: PlateauMode,
    pub factor: f64,
    pub patience: u64,
    pub threshold: f64,
    pub cooldown: u64,
    pub milestones: Vec<u64>,
    pub base_lr: f64,
    pub min_lr: LrBound,
    pub max_lr: LrBound,
    pub eta_min: f64,
}

impl LRSchedulerConfig {
    /// Scheduler whose rate follows this configuration, starting at `learning_rate`
    ///
    /// `StepLR` and `ExponentialLR` decay by `gamma` on every update,
    /// `MultiStepLR` on each of `milestones`. Types that need a metric or a
    /// user function are replayed as a constant rate.
    pub fn build_scheduler(&self, learning_rate: f32) -> Box<dyn LRScheduler> {
        let gamma = self.gamma as f32;
        match self.kind {
            LRSchedulerType::ConstantLR => Box::new(ConstantLR::new(learning_rate)),
            LRSchedulerType::StepLR | LRSchedulerType::ExponentialLR => {
                Box::new(StepDecayLR::new(learning_rate, 1, gamma))
            }
            LRSchedulerType::MultiStepLR => {
                Box::new(MultiStepLR::new(learning_rate, self.milestones.clone(), gamma))
            }
            other => {
                warn!(scheduler = ?other, "scheduler is not replayed; using a constant rate");
                Box::new(ConstantLR::new(learning_rate))
            }
        }
    }
}

impl Default for LRSchedulerConfig {
    fn default() -> Self {
        Self {
            kind: LRSchedulerType::default(),
            update_interval: TimeValue::iterations(1),
            warmup: TimeValue::iterations(0),
            gamma: 0.1,
            mode: PlateauMode::default(),
            factor: 0.1,
            patience: 10,
            threshold: 1e-4,
            cooldown: 0,
            milestones: Vec::new(),
            base_lr: 1e-7,
            min_lr: LrBound::default(),
            max_lr: LrBound::default(),
            eta_min: 0.0,
        }
    }
}

/// Dataloader options, passed through to the data pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataloaderConfig {
    pub num_workers: u32,
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub pin_memory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefetch_factor: Option<u32>,
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub persistent_workers: bool,
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub drop_last: bool,
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub shuffle: bool,
}

impl Default for DataloaderConfig {
    fn default() -> Self {
        Self {
            num_workers: 0,
            pin_memory: false,
            prefetch_factor: None,
            persistent_workers: false,
            drop_last: false,
            shuffle: true,
        }
    }
}

/// Clock logging options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClockConfig {
    /// Log every step and epoch boundary at `info`
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub verbose: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { verbose: true }
    }
}

/// Per-model overrides
///
/// Unset optimizer fields fall back to the top-level [`OptimizerConfig`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// `None` leaves the model's trainable parameters untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_grad: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub betas: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_decay: Option<f64>,
}

impl ModelConfig {
    /// Optimizer parameters for this model's parameter group
    pub fn optimizer_params(&self, base: &OptimizerConfig) -> OptimizerConfig {
        OptimizerConfig {
            optimizer: base.optimizer,
            learning_rate: self.learning_rate.unwrap_or(base.learning_rate),
            betas: self.betas.unwrap_or(base.betas),
            eps: self.eps.unwrap_or(base.eps),
            weight_decay: self.weight_decay.unwrap_or(base.weight_decay),
        }
    }
}

/// Complete training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    pub training: TrainingConfig,
    pub optimizer: OptimizerConfig,
    pub lr_scheduler: LRSchedulerConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub dataloader: DataloaderConfig,
    /// Models being trained, by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub models: BTreeMap<String, ModelConfig>,
}

impl BaseConfig {
    /// Intervals declared by this configuration, unresolved
    pub fn declared_schedule(&self) -> DeclaredSchedule {
        DeclaredSchedule {
            duration: self.training.duration,
            gradient_accumulation: self.training.gradient_accumulation,
            evaluation_interval: self.training.evaluation_interval,
            update_interval: self.lr_scheduler.update_interval,
            warmup: self.lr_scheduler.warmup,
            verbose: self.clock.verbose,
        }
    }

    /// Run context for this configuration's batch size
    pub fn run_context(&self, dataset_length: Option<u64>) -> Result<RunContext> {
        RunContext::new(self.training.batch_size, dataset_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const MINIMAL: &str = r"
training:
  duration: 10 epochs
optimizer:
  optimizer: AdamW
lr_scheduler: {}
";

    #[test]
    fn test_deserialize_minimal_config() {
        let config: BaseConfig = serde_yaml::from_str(MINIMAL).unwrap();
        assert_eq!(config.training.duration, TimeValue::epochs(10));
        assert_eq!(config.training.batch_size, 1);
        assert_eq!(config.training.gradient_accumulation, TimeValue::steps(1));
        assert_eq!(config.optimizer.optimizer, Optimizers::AdamW);
        assert_eq!(config.optimizer.learning_rate, 1e-4);
        assert_eq!(config.lr_scheduler.kind, LRSchedulerType::ConstantLR);
        assert_eq!(config.lr_scheduler.warmup, TimeValue::iterations(0));
        assert!(config.clock.verbose);
        assert!(config.dataloader.shuffle);
    }

    #[test]
    fn test_bare_integers_follow_field_defaults() {
        let yaml = r"
training:
  duration: 500
  gradient_accumulation: 4
  evaluation_interval: 50
optimizer:
  optimizer: SGD
lr_scheduler:
  update_interval: 10
  warmup: 100
";
        let config: BaseConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.training.duration, TimeValue::iterations(500));
        assert_eq!(config.training.gradient_accumulation, TimeValue::steps(4));
        assert_eq!(config.training.evaluation_interval, TimeValue::steps(50));
        assert_eq!(config.lr_scheduler.update_interval, TimeValue::iterations(10));
        assert_eq!(config.lr_scheduler.warmup, TimeValue::iterations(100));
        assert_eq!(config.optimizer.optimizer, Optimizers::Sgd);
    }

    #[test]
    fn test_record_time_values() {
        let yaml = r"
training:
  evaluation_interval: {number: 2, unit: epoch}
optimizer:
  optimizer: Adam
lr_scheduler:
  warmup: {number: 3, unit: steps}
";
        let config: BaseConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.training.evaluation_interval, TimeValue::epochs(2));
        assert_eq!(config.lr_scheduler.warmup, TimeValue::steps(3));
    }

    #[test]
    fn test_accumulation_in_iterations_rejected() {
        let yaml = r"
training:
  gradient_accumulation: 4 iterations
optimizer:
  optimizer: Adam
lr_scheduler: {}
";
        let err = serde_yaml::from_str::<BaseConfig>(yaml).unwrap_err().to_string();
        assert!(err.contains("gradient_accumulation"), "{err}");
        assert!(err.contains("4 iterations"), "{err}");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let yaml = r"
training:
  epochs: 3
optimizer:
  optimizer: Adam
lr_scheduler: {}
";
        assert!(serde_yaml::from_str::<BaseConfig>(yaml).is_err());
    }

    #[test]
    fn test_scheduler_type_and_bounds() {
        let yaml = r"
training: {}
optimizer:
  optimizer: Prodigy
  learning_rate: 1.0
lr_scheduler:
  type: ReduceLROnPlateau
  mode: max
  min_lr: [0.0, 0.1]
";
        let config: BaseConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.lr_scheduler.kind, LRSchedulerType::ReduceLROnPlateau);
        assert_eq!(config.lr_scheduler.mode, PlateauMode::Max);
        assert_eq!(config.lr_scheduler.min_lr, LrBound::PerGroup(vec![0.0, 0.1]));
        assert_eq!(config.lr_scheduler.max_lr, LrBound::Single(0.0));
    }

    #[test]
    fn test_lenient_bools() {
        let yaml = r#"
training: {}
optimizer:
  optimizer: Adam
lr_scheduler: {}
clock:
  verbose: "false"
dataloader:
  shuffle: "false"
  pin_memory: true
"#;
        let config: BaseConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.clock.verbose);
        assert!(!config.dataloader.shuffle);
        assert!(config.dataloader.pin_memory);
    }

    #[test]
    fn test_model_overrides() {
        let yaml = r"
training: {}
optimizer:
  optimizer: AdamW
  learning_rate: 0.001
lr_scheduler: {}
models:
  unet:
    learning_rate: 0.0001
    weight_decay: 0.0
  text_encoder:
    requires_grad: false
";
        let config: BaseConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.models.len(), 2);

        let unet = config.models["unet"].optimizer_params(&config.optimizer);
        assert_eq!(unet.learning_rate, 0.0001);
        assert_eq!(unet.weight_decay, 0.0);
        assert_eq!(unet.betas, (0.9, 0.999));
        assert_eq!(unet.optimizer, Optimizers::AdamW);

        let encoder = &config.models["text_encoder"];
        assert_eq!(encoder.requires_grad, Some(false));
        assert_eq!(encoder.optimizer_params(&config.optimizer), config.optimizer);
    }

    #[test]
    fn test_model_unknown_field_rejected() {
        let yaml = r"
training: {}
optimizer:
  optimizer: Adam
lr_scheduler: {}
models:
  unet:
    lr: 0.1
";
        assert!(serde_yaml::from_str::<BaseConfig>(yaml).is_err());
    }

    #[test]
    fn test_build_scheduler_follows_type() {
        let mut config = LRSchedulerConfig { gamma: 0.5, ..Default::default() };

        let mut constant = config.build_scheduler(0.1);
        constant.step();
        assert_abs_diff_eq!(constant.get_lr(), 0.1, epsilon = 1e-7);

        config.kind = LRSchedulerType::StepLR;
        let mut step = config.build_scheduler(1.0);
        step.step();
        step.step();
        assert_abs_diff_eq!(step.get_lr(), 0.25, epsilon = 1e-7);

        config.kind = LRSchedulerType::MultiStepLR;
        config.milestones = vec![3];
        let mut multi = config.build_scheduler(1.0);
        multi.step();
        multi.step();
        assert_abs_diff_eq!(multi.get_lr(), 1.0, epsilon = 1e-7);
        multi.step();
        assert_abs_diff_eq!(multi.get_lr(), 0.5, epsilon = 1e-7);

        config.kind = LRSchedulerType::ReduceLROnPlateau;
        let mut plateau = config.build_scheduler(0.2);
        plateau.step();
        assert_abs_diff_eq!(plateau.get_lr(), 0.2, epsilon = 1e-7);
    }

    #[test]
    fn test_declared_schedule_from_config() {
        let config: BaseConfig = serde_yaml::from_str(MINIMAL).unwrap();
        let declared = config.declared_schedule();
        assert_eq!(declared.duration, TimeValue::epochs(10));
        assert!(declared.requires_dataset_length());
        assert!(declared.verbose);
    }

    #[test]
    fn test_serializes_time_values_as_strings() {
        let config: BaseConfig = serde_yaml::from_str(MINIMAL).unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("duration: 10 epochs"), "{yaml}");
        let back: BaseConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }
}
