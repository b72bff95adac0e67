// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use yare::parameterized;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap()
}

#[parameterized(
    reps = { "reps", WorkoutUnit::Reps },
    rep_short = { "rep", WorkoutUnit::Reps },
    seconds = { "seconds", WorkoutUnit::Seconds },
    sec = { "s", WorkoutUnit::Seconds },
    minutes = { "MIN", WorkoutUnit::Minutes },
    meters = { "m", WorkoutUnit::Meters },
    kilometers = { "km", WorkoutUnit::Kilometers },
)]
fn unit_parses(input: &str, expected: WorkoutUnit) {
    assert_eq!(input.parse::<WorkoutUnit>().unwrap(), expected);
}

#[test]
fn unit_rejects_unknown() {
    assert!(matches!("laps".parse::<WorkoutUnit>(), Err(Error::InvalidUnit(_))));
}

#[test]
fn unit_display_matches_serde() {
    let json = serde_json::to_string(&WorkoutUnit::Kilometers).unwrap();
    assert_eq!(json, format!("\"{}\"", WorkoutUnit::Kilometers));
}

#[test]
fn new_generates_client_id_and_trims_name() {
    let fields = WorkoutFields::new("  push-up ", 20.0, WorkoutUnit::Reps, at(1_000)).unwrap();

    assert_eq!(fields.exercise_type, "push-up");
    assert!(fields.client_workout_id.starts_with("w-"));
    assert_eq!(fields.client_workout_id.len(), 10);
}

#[test]
fn client_id_depends_on_inputs() {
    let a = generate_workout_id("push-up", 20.0, &at(1_000));
    let b = generate_workout_id("push-up", 20.0, &at(1_000));
    let c = generate_workout_id("push-up", 21.0, &at(1_000));
    let d = generate_workout_id("push-up", 20.0, &at(1_001));

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
}

#[test]
fn client_id_separates_exercise_from_amount() {
    assert_ne!(
        generate_workout_id("a1", 2.0, &at(1_000)),
        generate_workout_id("a", 12.0, &at(1_000))
    );
}

#[parameterized(
    empty_name = { "", 10.0 },
    blank_name = { "   ", 10.0 },
    zero_amount = { "squat", 0.0 },
    negative_amount = { "squat", -3.0 },
    nan_amount = { "squat", f64::NAN },
    infinite_amount = { "squat", f64::INFINITY },
)]
fn new_rejects_invalid_fields(name: &str, amount: f64) {
    let result = WorkoutFields::new(name, amount, WorkoutUnit::Reps, at(0));
    assert!(matches!(result, Err(Error::InvalidWorkout(_))));
}

#[test]
fn validate_rejects_overlong_exercise() {
    let name = "x".repeat(MAX_EXERCISE_LEN + 1);
    assert!(WorkoutFields::new(name, 1.0, WorkoutUnit::Reps, at(0)).is_err());
}

#[test]
fn unit_defaults_to_reps_when_missing() {
    let json = r#"{"client_workout_id":"w-1","exercise_type":"plank","amount":1.0,"performed_at":"2026-01-01T00:00:00Z"}"#;
    let fields: WorkoutFields = serde_json::from_str(json).unwrap();
    assert_eq!(fields.unit, WorkoutUnit::Reps);
}

#[test]
fn record_flattens_fields() {
    let fields = WorkoutFields::new("run", 5.0, WorkoutUnit::Kilometers, at(0)).unwrap();
    let record = WorkoutRecord {
        id: "srv-1".into(),
        owner: "abcd1234".into(),
        fields,
        recorded_at: at(10),
    };

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["exercise_type"], "run");
    assert_eq!(value["unit"], "kilometers");

    let parsed: WorkoutRecord = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, record);
}
