// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;
use fit_core::{MutationPayload, WorkoutFields, WorkoutUnit};

use crate::error::Result;

use super::{block_on, Context};

pub fn run(ctx: &Context, exercise: String, amount: f64, unit: String, sync: bool) -> Result<()> {
    let unit: WorkoutUnit = unit.parse()?;
    let fields = WorkoutFields::new(exercise, amount, unit, Utc::now())?;

    if sync {
        let session = ctx.connect()?;
        session.engine.enqueue_workout_create(fields.clone())?;
        println!("{}", format_logged(&fields, session.engine.pending_count()));
        let summary = block_on(session.sync_now())?;
        println!("{}", summary.render());
    } else {
        let mut queue = ctx.open_queue()?;
        queue.enqueue(MutationPayload::create(fields.clone()))?;
        println!("{}", format_logged(&fields, queue.count()));
    }
    Ok(())
}

pub(crate) fn format_logged(fields: &WorkoutFields, pending: usize) -> String {
    format!(
        "Logged {} {} {} ({})\nPending: {}",
        fields.exercise_type, fields.amount, fields.unit, fields.client_workout_id, pending
    )
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
