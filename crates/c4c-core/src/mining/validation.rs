//! Boundary parsing of dashboard and `miningStatus` payloads.
//!
//! The server's JSON shapes are loose: ids arrive as numbers, strings or
//! populated relation objects, and decimals sometimes arrive as strings.
//! Parsing here never fails on a malformed entry. Entries without a college
//! reference are dropped, missing numbers get neutral values, and a missing
//! `remainingHours` becomes NaN so the projector reports the session offline.

use serde_json::{Map, Value};
use tracing::warn;

use crate::mining::errors::PayloadError;
use crate::mining::types::{
    CollegeId, Dashboard, MiningCollege, MiningStatusUpdate, SessionSnapshot, WalletBalance,
};

/// Parse a full dashboard response.
pub fn parse_dashboard(value: &Value) -> Result<Dashboard, PayloadError> {
    let object = value.as_object().ok_or(PayloadError::NotAnObject {
        context: "dashboard",
    })?;
    // Some endpoints wrap the payload as `{ "data": { ... } }`.
    let object = match object.get("data").and_then(Value::as_object) {
        Some(inner) if !object.contains_key("activeSessions") => inner,
        _ => object,
    };

    let status = parse_status_fields(object);
    Ok(Dashboard {
        student: object.get("student").filter(|v| v.is_object()).cloned(),
        summary: object.get("summary").filter(|v| v.is_object()).cloned(),
        mining_colleges: status.mining_colleges,
        active_sessions: status.active_sessions,
        wallets: status.wallets,
    })
}

/// Parse the payload of a `miningStatus` push event.
pub fn parse_mining_status(value: &Value) -> Result<MiningStatusUpdate, PayloadError> {
    let object = value.as_object().ok_or(PayloadError::NotAnObject {
        context: "miningStatus",
    })?;
    Ok(parse_status_fields(object))
}

fn parse_status_fields(object: &Map<String, Value>) -> MiningStatusUpdate {
    MiningStatusUpdate {
        mining_colleges: entries(object, "miningColleges")
            .filter_map(parse_college)
            .collect(),
        active_sessions: entries(object, "activeSessions")
            .filter_map(parse_session)
            .collect(),
        wallets: entries(object, "wallets").filter_map(parse_wallet).collect(),
    }
}

fn entries<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> impl Iterator<Item = &'a Value> {
    let items: &[Value] = match object.get(field) {
        Some(Value::Array(items)) => items.as_slice(),
        Some(Value::Null) | None => &[],
        Some(other) => {
            warn!(
                event = "core.payload.field_not_array",
                field = field,
                found = json_kind(other),
            );
            &[]
        }
    };
    items.iter()
}

fn parse_college(value: &Value) -> Option<MiningCollege> {
    // Entries are either a college object or `{ college: {...} }`.
    let object = value
        .get("college")
        .filter(|c| c.is_object())
        .unwrap_or(value);
    let Some(id) = object.get("id").and_then(id_value) else {
        warn!(event = "core.payload.college_dropped", reason = "missing id");
        return None;
    };
    let attributes = object.get("attributes").unwrap_or(object);

    Some(MiningCollege {
        id,
        name: string_field(attributes, "name"),
        symbol: string_field(attributes, "tokenSymbol")
            .or_else(|| string_field(attributes, "symbol")),
    })
}

fn parse_session(value: &Value) -> Option<SessionSnapshot> {
    let Some(college) = college_ref(value) else {
        warn!(
            event = "core.payload.session_dropped",
            reason = "missing college reference"
        );
        return None;
    };

    Some(SessionSnapshot {
        college,
        is_active: value
            .get("isActive")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        remaining_hours: number(value.get("remainingHours")).unwrap_or(f64::NAN),
        earning_rate: finite_or_zero(number(value.get("earningRate"))),
        current_tokens: finite_or_zero(number(value.get("currentTokens"))),
    })
}

fn parse_wallet(value: &Value) -> Option<WalletBalance> {
    let Some(college) = college_ref(value) else {
        warn!(
            event = "core.payload.wallet_dropped",
            reason = "missing college reference"
        );
        return None;
    };

    Some(WalletBalance {
        college,
        balance: finite_or_zero(number(value.get("balance"))),
    })
}

/// Resolve `college` / `collegeId` into an id, accepting relation objects
/// (`{ id }` or `{ data: { id } }`).
fn college_ref(value: &Value) -> Option<CollegeId> {
    let reference = value.get("college").or_else(|| value.get("collegeId"))?;
    match reference {
        Value::Object(object) => object
            .get("id")
            .or_else(|| object.get("data").and_then(|d| d.get("id")))
            .and_then(id_value),
        other => id_value(other),
    }
}

fn id_value(value: &Value) -> Option<CollegeId> {
    match value {
        Value::Number(n) => Some(CollegeId::new(n.to_string())),
        Value::String(s) if !s.trim().is_empty() => Some(CollegeId::new(s.trim())),
        _ => None,
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn string_field(object: &Value, field: &str) -> Option<String> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
