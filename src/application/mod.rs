#[allow(clippy::module_inception)]
mod application;
pub mod data;
mod runtime_config;

pub use application::{Application, ApplicationError};
pub use runtime_config::RuntimeConfig;
