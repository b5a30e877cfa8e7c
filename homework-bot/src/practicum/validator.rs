//! Shape checks for the homework status response.

use serde_json::Value;

use crate::{Error, Result};

/// Validate the response body and return the most recent homework record.
///
/// The API lists homeworks most-recent-first, so the record is the first
/// element of `homeworks`.
pub fn check_response(response: &Value) -> Result<&Value> {
    let body = response
        .as_object()
        .ok_or_else(|| Error::shape("response is not a JSON object"))?;

    let homeworks = body
        .get("homeworks")
        .ok_or_else(|| Error::shape("response has no \"homeworks\" key"))?
        .as_array()
        .ok_or_else(|| Error::shape("\"homeworks\" is not a list"))?;

    homeworks
        .first()
        .ok_or_else(|| Error::shape("\"homeworks\" is empty"))
}

/// Whether the response carries an empty `homeworks` list.
pub(crate) fn is_empty_homeworks(response: &Value) -> bool {
    response
        .get("homeworks")
        .and_then(Value::as_array)
        .is_some_and(|homeworks| homeworks.is_empty())
}
