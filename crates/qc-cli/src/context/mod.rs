mod app_context;
mod config_warnings;

pub use app_context::{AppContext, ConsoleSession};
pub use config_warnings::warn_unconfigured;

#[cfg(test)]
pub(crate) use app_context::tests as tests_support;
