//! Projection of [`FormState`] into the payload the prediction service expects.

use crate::core::form_store::{FieldId, FormState};
use crate::domain::model::PredictionRequest;
use crate::domain::ports::ValidationMode;
use crate::utils::error::{HealixError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// What a browser prints for `Date` parts of an invalid date.
const INVALID_DATE: &str = "NaN-NaN-NaN";

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        // The date as written, not shifted to another zone.
        return Some(dt.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        })
}

/// Reformats a calendar date as zero-padded `YYYY-MM-DD`.
///
/// Returns `None` when the input is not a recognisable date.
pub fn format_date(input: &str) -> Option<String> {
    parse_calendar_date(input).map(|date| date.format("%Y-%m-%d").to_string())
}

/// Locale-independent uppercasing.
pub fn uppercase(input: &str) -> String {
    input.to_uppercase()
}

/// Unsigned `0x`/`0o`/`0b` literal. `None` when the prefix matches but the digits don't.
fn parse_radix_literal(input: &str) -> Option<Option<f64>> {
    let radix = match input.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => 16,
        Some("0o") => 8,
        Some("0b") => 2,
        _ => return None,
    };
    let digits = &input[2..];
    if digits.is_empty() {
        return Some(None);
    }
    Some(digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    }))
}

/// Parses enrollment with browser `Number()` rules: blank is zero,
/// unsigned hex/octal/binary literals are accepted, and anything
/// unparseable is `None` (not-a-number).
pub fn parse_enrollment(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    if let Some(value) = parse_radix_literal(trimmed) {
        return value;
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Integral values serialize as JSON integers; non-finite values have no JSON number.
fn to_json_number(value: f64) -> Option<serde_json::Number> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(serde_json::Number::from(value as i64))
    } else {
        serde_json::Number::from_f64(value)
    }
}

fn strict_enrollment(raw: &str) -> Result<serde_json::Number> {
    let invalid = |message: String| HealixError::ValidationError {
        field: FieldId::Enrollment.label().to_string(),
        message,
    };

    if raw.trim().is_empty() {
        return Err(invalid("a value is required".to_string()));
    }

    match parse_enrollment(raw) {
        Some(n) if n.is_finite() && n >= 0.0 && n.fract() == 0.0 => {
            to_json_number(n).ok_or_else(|| invalid(format!("'{}' is out of range", raw)))
        }
        Some(_) => Err(invalid(format!("'{}' must be a non-negative whole number", raw))),
        None => Err(invalid(format!("'{}' is not a number", raw))),
    }
}

fn strict_date(field: FieldId, raw: &str) -> Result<String> {
    format_date(raw).ok_or_else(|| HealixError::ValidationError {
        field: field.label().to_string(),
        message: if raw.trim().is_empty() {
            "a date is required".to_string()
        } else {
            format!("'{}' is not a valid date", raw)
        },
    })
}

/// Builds the request payload from a form snapshot.
///
/// In [`ValidationMode::Lenient`] this never fails and malformed values are
/// forwarded in their browser-coerced form.
pub fn build_request(form: &FormState, mode: ValidationMode) -> Result<PredictionRequest> {
    let (enrollment, start_date, primary_completion_date) = match mode {
        ValidationMode::Strict => (
            Some(strict_enrollment(&form.enrollment)?),
            strict_date(FieldId::StartDate, &form.start_date)?,
            strict_date(FieldId::PrimaryCompletionDate, &form.primary_completion_date)?,
        ),
        ValidationMode::Lenient => (
            parse_enrollment(&form.enrollment).and_then(to_json_number),
            format_date(&form.start_date).unwrap_or_else(|| INVALID_DATE.to_string()),
            format_date(&form.primary_completion_date).unwrap_or_else(|| INVALID_DATE.to_string()),
        ),
    };

    Ok(PredictionRequest {
        nct_id: form.nct_id.clone(),
        study_title: form.study_title.clone(),
        conditions: form.conditions.clone(),
        interventions: form.interventions.clone(),
        phases: uppercase(&form.phases),
        enrollment,
        study_type: uppercase(&form.study_type),
        study_design: form.study_design.clone(),
        start_date,
        primary_completion_date,
        locations: form.locations.clone(),
    })
}
