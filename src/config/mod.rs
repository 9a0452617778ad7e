#[cfg(feature = "cli")]
pub mod cli;
pub mod form_file;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::HealixConfig;
