pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::HealixConfig;

pub use adapters::http::HttpPredictionClient;
pub use adapters::notify::{ConsoleSink, MemorySink, TracingSink};
pub use self::core::{
    form::HealixForm,
    form_store::{FieldId, FormState},
    panel::PredictionPanel,
    submission::{Settlement, SubmissionPipeline},
};
pub use utils::error::{HealixError, Result};
