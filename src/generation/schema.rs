//! # Validación del Itinerario
//! src/generation/schema.rs
//!
//! Verifica que el JSON devuelto por el modelo tenga la forma esperada:
//!
//! ```text
//! { "itinerary": [ { "day": 1, "theme": "...", "activities": [ {time, description, location} x3 ] } ] }
//! ```
//!
//! También se acepta el array de días en la raíz.

use crate::jobs::types::{Activity, DayPlan};
use serde_json::Value;
use thiserror::Error;

/// Actividades por día (Morning / Afternoon / Evening)
pub const ACTIVITIES_PER_DAY: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("response does not contain an itinerary array")]
    MissingItinerary,

    #[error("expected {expected} days, found {found}")]
    DayCount { expected: usize, found: usize },

    #[error("day entry {position} is not an object")]
    DayNotObject { position: usize },

    #[error("day entry {position} has day number {found}, expected {position}")]
    DayNumber { position: usize, found: String },

    #[error("day {day} is missing a non-empty \"{field}\"")]
    MissingDayField { day: usize, field: &'static str },

    #[error("day {day} must have exactly 3 activities, found {found}")]
    ActivityCount { day: usize, found: usize },

    #[error("activity {activity} of day {day} is missing a non-empty \"{field}\"")]
    MissingActivityField { day: usize, activity: usize, field: &'static str },
}

/// Valida el JSON del modelo y lo convierte en días tipados
pub fn validate_itinerary(value: &Value, duration_days: u32) -> Result<Vec<DayPlan>, ValidationError> {
    let days = match value {
        Value::Array(days) => days,
        Value::Object(map) => map
            .get("itinerary")
            .and_then(Value::as_array)
            .ok_or(ValidationError::MissingItinerary)?,
        _ => return Err(ValidationError::MissingItinerary),
    };

    let expected = duration_days as usize;
    if days.len() != expected {
        return Err(ValidationError::DayCount { expected, found: days.len() });
    }

    days.iter()
        .enumerate()
        .map(|(index, day)| validate_day(day, index + 1))
        .collect()
}

fn validate_day(value: &Value, position: usize) -> Result<DayPlan, ValidationError> {
    let day = value.as_object().ok_or(ValidationError::DayNotObject { position })?;

    let number = day.get("day").and_then(day_number);
    if number != Some(position as u64) {
        let found = day.get("day").map(Value::to_string).unwrap_or_else(|| "none".to_string());
        return Err(ValidationError::DayNumber { position, found });
    }

    let theme = non_empty_str(day.get("theme"))
        .ok_or(ValidationError::MissingDayField { day: position, field: "theme" })?;

    let activities = day
        .get("activities")
        .and_then(Value::as_array)
        .ok_or(ValidationError::MissingDayField { day: position, field: "activities" })?;

    if activities.len() != ACTIVITIES_PER_DAY {
        return Err(ValidationError::ActivityCount { day: position, found: activities.len() });
    }

    let activities = activities
        .iter()
        .enumerate()
        .map(|(index, activity)| validate_activity(activity, position, index + 1))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DayPlan {
        day: position as u32,
        theme: theme.to_string(),
        activities,
    })
}

fn validate_activity(value: &Value, day: usize, activity: usize) -> Result<Activity, ValidationError> {
    let field = |name: &'static str| {
        non_empty_str(value.get(name))
            .map(str::to_string)
            .ok_or(ValidationError::MissingActivityField { day, activity, field: name })
    };

    Ok(Activity {
        time: field("time")?,
        description: field("description")?,
        location: field("location")?,
    })
}

/// Acepta `1` o `"1"`
fn day_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
