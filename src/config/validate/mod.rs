//! Configuration validation
//!
//! First phase of staged construction: checks a parsed configuration and
//! extracts its declared schedule before any dataloader exists.

mod validator;

#[cfg(test)]
mod proptests;

pub use validator::validate_config;
