use crate::utils::error::{HealixError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Input affordance of a field. Purely descriptive; the store never rejects a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    NctId,
    StudyTitle,
    Conditions,
    Interventions,
    Enrollment,
    Phases,
    StudyType,
    StudyDesign,
    StartDate,
    PrimaryCompletionDate,
    Locations,
}

impl FieldId {
    /// Display order of the form.
    pub const ALL: [FieldId; 11] = [
        FieldId::NctId,
        FieldId::StudyTitle,
        FieldId::Conditions,
        FieldId::Interventions,
        FieldId::Enrollment,
        FieldId::Phases,
        FieldId::StudyType,
        FieldId::StudyDesign,
        FieldId::StartDate,
        FieldId::PrimaryCompletionDate,
        FieldId::Locations,
    ];

    pub fn id(self) -> &'static str {
        match self {
            FieldId::NctId => "nctId",
            FieldId::StudyTitle => "studyTitle",
            FieldId::Conditions => "conditions",
            FieldId::Interventions => "interventions",
            FieldId::Enrollment => "enrollment",
            FieldId::Phases => "phases",
            FieldId::StudyType => "studyType",
            FieldId::StudyDesign => "studyDesign",
            FieldId::StartDate => "startDate",
            FieldId::PrimaryCompletionDate => "primaryCompletionDate",
            FieldId::Locations => "locations",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldId::NctId => "NCT ID",
            FieldId::StudyTitle => "Study Title",
            FieldId::Conditions => "Conditions",
            FieldId::Interventions => "Interventions",
            FieldId::Enrollment => "Enrollment",
            FieldId::Phases => "Phases",
            FieldId::StudyType => "Study Type",
            FieldId::StudyDesign => "Study Design",
            FieldId::StartDate => "Start Date",
            FieldId::PrimaryCompletionDate => "Primary Completion Date",
            FieldId::Locations => "Locations",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            FieldId::NctId => "Enter NCT ID",
            FieldId::StudyTitle => "Enter Study Title",
            FieldId::Conditions => "Enter Conditions (e.g., Diabetes)",
            FieldId::Interventions => "Enter Interventions (e.g., Drug A)",
            FieldId::Enrollment => "Enter Enrollment Number",
            FieldId::Phases => "Enter Phase (e.g., Phase 1)",
            FieldId::StudyType => "Enter Study Type (e.g., Interventional)",
            FieldId::StudyDesign => "Enter Study Design",
            FieldId::StartDate => "Select Start Date",
            FieldId::PrimaryCompletionDate => "Select Primary Completion Date",
            FieldId::Locations => "Enter Locations",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FieldId::Enrollment => FieldKind::Number,
            FieldId::StartDate | FieldId::PrimaryCompletionDate => FieldKind::Date,
            _ => FieldKind::Text,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FieldId {
    type Err = HealixError;

    /// Accepts `studyTitle`, `study_title`, `study-title` and any casing thereof.
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        FieldId::ALL
            .into_iter()
            .find(|field| field.id().to_lowercase() == wanted)
            .ok_or_else(|| HealixError::UnknownFieldError {
                name: s.to_string(),
            })
    }
}

/// Current values of the trial form. Every field starts empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormState {
    #[serde(alias = "nct_id")]
    pub nct_id: String,
    #[serde(alias = "study_title")]
    pub study_title: String,
    pub conditions: String,
    pub interventions: String,
    pub enrollment: String,
    pub phases: String,
    #[serde(alias = "study_type")]
    pub study_type: String,
    #[serde(alias = "study_design")]
    pub study_design: String,
    #[serde(alias = "start_date")]
    pub start_date: String,
    #[serde(alias = "primary_completion_date")]
    pub primary_completion_date: String,
    pub locations: String,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, field: FieldId) -> &mut String {
        match field {
            FieldId::NctId => &mut self.nct_id,
            FieldId::StudyTitle => &mut self.study_title,
            FieldId::Conditions => &mut self.conditions,
            FieldId::Interventions => &mut self.interventions,
            FieldId::Enrollment => &mut self.enrollment,
            FieldId::Phases => &mut self.phases,
            FieldId::StudyType => &mut self.study_type,
            FieldId::StudyDesign => &mut self.study_design,
            FieldId::StartDate => &mut self.start_date,
            FieldId::PrimaryCompletionDate => &mut self.primary_completion_date,
            FieldId::Locations => &mut self.locations,
        }
    }

    pub fn get(&self, field: FieldId) -> &str {
        match field {
            FieldId::NctId => &self.nct_id,
            FieldId::StudyTitle => &self.study_title,
            FieldId::Conditions => &self.conditions,
            FieldId::Interventions => &self.interventions,
            FieldId::Enrollment => &self.enrollment,
            FieldId::Phases => &self.phases,
            FieldId::StudyType => &self.study_type,
            FieldId::StudyDesign => &self.study_design,
            FieldId::StartDate => &self.start_date,
            FieldId::PrimaryCompletionDate => &self.primary_completion_date,
            FieldId::Locations => &self.locations,
        }
    }

    /// Overwrites exactly one field. Values are stored verbatim.
    pub fn update_field(&mut self, field: FieldId, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    pub fn update_named(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let field: FieldId = name.parse()?;
        self.update_field(field, value);
        Ok(())
    }

    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &str)> + '_ {
        FieldId::ALL.into_iter().map(move |field| (field, self.get(field)))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
