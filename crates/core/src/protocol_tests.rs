// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::stamp::millis_to_utc;
use crate::workout::WorkoutUnit;
use yare::parameterized;

fn fields() -> WorkoutFields {
    WorkoutFields::new("push-up", 20.0, WorkoutUnit::Reps, millis_to_utc(1_000)).unwrap()
}

fn record() -> WorkoutRecord {
    WorkoutRecord {
        id: "srv-1".into(),
        owner: "abcd1234".into(),
        fields: fields(),
        recorded_at: millis_to_utc(2_000),
    }
}

#[parameterized(
    create = { ClientMessage::create_workout(1, "tok", fields()) },
    delete = { ClientMessage::delete_workout(2, "tok", "w-1") },
    list = { ClientMessage::list_workouts(3, "tok") },
    ping = { ClientMessage::ping(12345) },
)]
fn client_message_roundtrip(msg: ClientMessage) {
    let json = msg.to_json().unwrap();
    assert_eq!(ClientMessage::from_json(&json).unwrap(), msg);
}

#[parameterized(
    created = { ServerMessage::created(1, record()) },
    deleted = { ServerMessage::deleted(2) },
    workouts = { ServerMessage::workouts(3, vec![record()]) },
    rejected = { ServerMessage::rejected(4, 422, "amount must be positive") },
    pong = { ServerMessage::pong(5) },
    error = { ServerMessage::error("bad frame") },
)]
fn server_message_roundtrip(msg: ServerMessage) {
    let json = msg.to_json().unwrap();
    assert_eq!(ServerMessage::from_json(&json).unwrap(), msg);
}

#[test]
fn ping_wire_format() {
    let json = ClientMessage::ping(7).to_json().unwrap();
    assert_eq!(json, r#"{"type":"ping","id":7}"#);
}

#[test]
fn correlation_ids_match_between_request_and_reply() {
    let request = ClientMessage::delete_workout(41, "tok", "w-1");
    let reply = ServerMessage::deleted(41);
    assert_eq!(Some(request.correlation_id()), reply.correlation_id());
}

#[test]
fn error_frame_has_no_correlation_id() {
    assert_eq!(ServerMessage::error("x").correlation_id(), None);
}

#[parameterized(
    create = { ClientMessage::create_workout(0, "tok", fields()) },
    delete = { ClientMessage::delete_workout(0, "tok", "w-1") },
    list = { ClientMessage::list_workouts(0, "tok") },
    ping = { ClientMessage::ping(0) },
)]
fn with_correlation_id_rewrites_id(msg: ClientMessage) {
    let name = msg.name();
    let rewritten = msg.with_correlation_id(99);
    assert_eq!(rewritten.correlation_id(), 99);
    assert_eq!(rewritten.name(), name);
}

#[test]
fn unknown_type_fails_to_parse() {
    assert!(ClientMessage::from_json(r#"{"type":"update_workout"}"#).is_err());
}
