use crate::error::{TenderError, TenderResult};
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use tendersheet_models::{BidderEntry, TenderDraft, TenderRecord, WorkItem, PERCENTILE_MAX, PERCENTILE_MIN};
use validator::{Validate, ValidationErrors};

pub fn validate_model<T: Validate>(model: &T) -> TenderResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(TenderError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match &error.code {
                std::borrow::Cow::Borrowed("length") => {
                    format!("Field '{}' cannot be empty", field)
                }
                std::borrow::Cow::Borrowed("range") => {
                    format!("Value out of range for field '{}'", field)
                }
                _ => format!("Validation failed for field '{}': {}", field, error.code),
            };
            messages.push(message);
        }
    }

    messages.sort();
    messages.join(", ")
}

/// Parses and range-checks a bid percentile as it arrives from the client.
///
/// Numbers and numeric strings are accepted; missing, empty, non-numeric and
/// non-finite values are not. The bound is inclusive on both ends.
pub fn validate_percentile(value: Option<&Value>) -> TenderResult<f64> {
    let number = match value {
        None | Some(Value::Null) => {
            return Err(TenderError::validation(
                "percentile",
                "Percentile value cannot be empty",
            ))
        }
        Some(Value::String(text)) if text.trim().is_empty() => {
            return Err(TenderError::validation(
                "percentile",
                "Percentile value cannot be empty",
            ))
        }
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(Value::Number(number)) => number.as_f64(),
        Some(_) => None,
    };

    let number = number.filter(|n| n.is_finite()).ok_or_else(|| {
        TenderError::validation("percentile", "Percentile must be a valid number")
    })?;

    if !(PERCENTILE_MIN..=PERCENTILE_MAX).contains(&number) {
        return Err(TenderError::validation(
            "percentile",
            format!(
                "Percentile must be between {}% and +{}% (got {}%)",
                PERCENTILE_MIN, PERCENTILE_MAX, number
            ),
        ));
    }

    Ok(number)
}

/// Pre-generation gate. Walks works in order and their bidders in order, and
/// stops at the first failure with a message naming that work and bidder.
pub fn validate_generation_request(draft: &TenderDraft) -> TenderResult<TenderRecord> {
    if draft.works.is_empty() {
        return Err(TenderError::validation("works", "No works provided"));
    }

    let mut works = Vec::with_capacity(draft.works.len());

    for work in &draft.works {
        if work.bidders.is_empty() {
            return Err(TenderError::validation(
                "bidders",
                format!("No bidders found for {}", work.name),
            ));
        }

        let mut bidders = Vec::with_capacity(work.bidders.len());
        for (position, bidder) in work.bidders.iter().enumerate() {
            let name = bidder.display_name(position);

            if matches!(bidder.percentile, None | Some(Value::Null)) {
                return Err(TenderError::validation(
                    "percentile",
                    format!("Missing percentile for {} - {}", work.name, name),
                ));
            }

            let percentile = validate_percentile(bidder.percentile.as_ref()).map_err(|e| {
                let reason = match e {
                    TenderError::Validation { message, .. } => message,
                    other => other.to_string(),
                };
                TenderError::validation(
                    "percentile",
                    format!("Invalid percentile for {} - {}: {}", work.name, name, reason),
                )
            })?;

            let entry = BidderEntry {
                name,
                address: bidder
                    .address
                    .as_deref()
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string),
                percentile,
            };
            validate_model(&entry)?;
            bidders.push(entry);
        }

        works.push(WorkItem {
            name: work.name.clone(),
            row_index: work.row_index,
            bidders,
        });
    }

    Ok(TenderRecord::new(draft.nit_info.nit_number.clone(), works))
}

pub fn validate_file_type(file_name: &str, allowed_types: &[String]) -> TenderResult<()> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    if !allowed_types.iter().any(|allowed| allowed.eq_ignore_ascii_case(&extension)) {
        let listed: Vec<String> = allowed_types.iter().map(|t| format!(".{}", t)).collect();
        return Err(TenderError::input(format!(
            "Invalid file type. Please upload Excel files only ({})",
            listed.join(", ")
        )));
    }

    Ok(())
}

pub fn validate_file_size(file_size: u64, max_size: u64) -> TenderResult<()> {
    if file_size > max_size {
        return Err(TenderError::input(format!(
            "File too large: {} bytes (max: {})",
            file_size, max_size
        )));
    }

    Ok(())
}

/// Reduces an uploaded file name to a safe basename.
pub fn sanitize_filename(file_name: &str) -> String {
    let base = file_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();

    cleaned.trim_start_matches('.').to_string()
}

/// Resolves `name` inside `root`, refusing anything that escapes it.
pub fn resolve_download_path(root: &Path, name: &str) -> TenderResult<PathBuf> {
    let requested = Path::new(name);
    let only_normal = requested
        .components()
        .all(|component| matches!(component, Component::Normal(_)));

    if name.is_empty() || !only_normal {
        return Err(TenderError::access_denied(format!(
            "{} resolves outside the output directory",
            name
        )));
    }

    let candidate = root.join(requested);
    if !candidate.exists() {
        return Err(TenderError::not_found(name.to_string()));
    }

    let canonical_root = root.canonicalize()?;
    let canonical = candidate.canonicalize()?;
    if !canonical.starts_with(&canonical_root) {
        return Err(TenderError::access_denied(format!(
            "{} resolves outside the output directory",
            name
        )));
    }

    Ok(canonical)
}
