#![recursion_limit = "256"]

pub mod application;
pub mod data;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod ml;

pub use application::prepare_use_case::{PrepareConfig, PrepareUseCase, Prepared};
pub use data::vocab::Vocabulary;
pub use errors::{Result, TaggerError};
pub use ml::mlp::{Mlp, MlpConfig};
