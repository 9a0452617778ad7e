use crate::config::form_file::load_form;
use crate::config::toml_config::HealixConfig;
use crate::core::form_store::{FieldId, FormState};
use crate::core::{SoftFailurePolicy, ValidationMode};
use crate::utils::error::{HealixError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::Validate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "healix")]
#[command(about = "Predict a clinical trial's completion date from its registry metadata")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Prediction endpoint, overrides the configuration file
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Prefilled form values (.json or .toml)
    #[arg(short, long)]
    pub form: Option<PathBuf>,

    #[arg(long)]
    pub nct_id: Option<String>,
    #[arg(long)]
    pub study_title: Option<String>,
    #[arg(long)]
    pub conditions: Option<String>,
    #[arg(long)]
    pub interventions: Option<String>,
    #[arg(long)]
    pub enrollment: Option<String>,
    #[arg(long)]
    pub phases: Option<String>,
    #[arg(long)]
    pub study_type: Option<String>,
    #[arg(long)]
    pub study_design: Option<String>,
    #[arg(long)]
    pub start_date: Option<String>,
    #[arg(long)]
    pub primary_completion_date: Option<String>,
    #[arg(long)]
    pub locations: Option<String>,

    /// Set a field by id, e.g. `--set studyType=interventional`
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub assignments: Vec<String>,

    /// Reject malformed enrollment/date values instead of forwarding them
    #[arg(long, conflicts_with = "lenient")]
    pub strict: bool,

    /// Forward values as entered, overriding `validation = "strict"` in the config file
    #[arg(long)]
    pub lenient: bool,

    /// What a non-200 reply does to the previous prediction: keep, clear or error
    #[arg(long)]
    pub soft_failure: Option<SoftFailurePolicy>,

    /// Print the request payload without sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Log output format: compact or json
    #[arg(long)]
    pub log_format: Option<LogFormat>,
}

impl CliConfig {
    /// File configuration with command line overrides applied, validated.
    pub fn resolve_config(&self) -> Result<HealixConfig> {
        let mut config = match &self.config {
            Some(path) => HealixConfig::from_file(path)?,
            None => HealixConfig::default(),
        };

        if let Some(endpoint) = &self.endpoint {
            config.endpoint.url = endpoint.clone();
        }
        if self.strict {
            config.submission.validation = ValidationMode::Strict;
        } else if self.lenient {
            config.submission.validation = ValidationMode::Lenient;
        }
        if let Some(policy) = self.soft_failure {
            config.submission.soft_failure = policy;
        }
        if let Some(format) = self.log_format {
            config.logging.get_or_insert_with(Default::default).format = Some(format);
        }

        config.validate()?;
        Ok(config)
    }

    fn field_flags(&self) -> [(FieldId, &Option<String>); 11] {
        [
            (FieldId::NctId, &self.nct_id),
            (FieldId::StudyTitle, &self.study_title),
            (FieldId::Conditions, &self.conditions),
            (FieldId::Interventions, &self.interventions),
            (FieldId::Enrollment, &self.enrollment),
            (FieldId::Phases, &self.phases),
            (FieldId::StudyType, &self.study_type),
            (FieldId::StudyDesign, &self.study_design),
            (FieldId::StartDate, &self.start_date),
            (FieldId::PrimaryCompletionDate, &self.primary_completion_date),
            (FieldId::Locations, &self.locations),
        ]
    }

    /// Form file first, then `--set`, then the dedicated field flags.
    pub fn build_form(&self) -> Result<FormState> {
        let mut form = match &self.form {
            Some(path) => load_form(path)?,
            None => FormState::new(),
        };

        for assignment in &self.assignments {
            let (name, value) =
                assignment
                    .split_once('=')
                    .ok_or_else(|| HealixError::InvalidConfigValueError {
                        field: "set".to_string(),
                        value: assignment.clone(),
                        reason: "expected FIELD=VALUE".to_string(),
                    })?;
            form.update_named(name.trim(), value)?;
        }

        for (field, value) in self.field_flags() {
            if let Some(value) = value {
                form.update_field(field, value.clone());
            }
        }

        Ok(form)
    }
}
