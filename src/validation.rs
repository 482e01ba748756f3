// Shared validation: identifier grammar, pagination/batch-size bounds, and
// filter shape. Kept separate from the matching logic in `publisher`, which
// is deliberately lenient at evaluation time even though creation time is
// strict here.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{AppError, AppResult};

static ID_RE: OnceLock<Regex> = OnceLock::new();

fn id_pattern() -> &'static Regex {
    ID_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]{1,128}$").unwrap())
}

pub fn validate_id(field: &str, id: &str) -> AppResult<()> {
    if id_pattern().is_match(id) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{field} must match [A-Za-z0-9._-]{{1,128}}"
        )))
    }
}

pub fn validate_pagination(offset: i64, limit: i64) -> AppResult<()> {
    if offset < 0 {
        return Err(AppError::Validation("offset must be >= 0".to_string()));
    }
    if !(1..=100).contains(&limit) {
        return Err(AppError::Validation("limit must be in [1,100]".to_string()));
    }
    Ok(())
}

pub fn validate_batch_size(batch_size: i64) -> AppResult<()> {
    if !(1..=100).contains(&batch_size) {
        return Err(AppError::Validation(
            "batch_size must be in [1,100]".to_string(),
        ));
    }
    Ok(())
}

/// Strict, creation-time filter validation ("invalid filter
/// structure (non-object, non-array value, non-primitive element, null
/// element)"). `None` and an empty object are both accepted as "no filter".
pub fn validate_filter(filter: &Option<serde_json::Value>) -> AppResult<()> {
    let Some(value) = filter else {
        return Ok(());
    };

    let obj = match value {
        serde_json::Value::Null => return Ok(()),
        serde_json::Value::Object(obj) => obj,
        _ => {
            return Err(AppError::Validation(
                "filter must be a JSON object".to_string(),
            ))
        }
    };

    for (key, allowed) in obj {
        let arr = match allowed {
            serde_json::Value::Array(arr) => arr,
            _ => {
                return Err(AppError::Validation(format!(
                    "filter[{key}] must be an array"
                )))
            }
        };

        for element in arr {
            match element {
                serde_json::Value::String(_)
                | serde_json::Value::Number(_)
                | serde_json::Value::Bool(_) => {}
                _ => {
                    return Err(AppError::Validation(format!(
                        "filter[{key}] elements must be strings, numbers, or booleans"
                    )))
                }
            }
        }
    }

    Ok(())
}
