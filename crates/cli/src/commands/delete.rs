// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use fit_core::MutationPayload;

use crate::error::Result;

use super::{block_on, Context};

pub fn run(ctx: &Context, workout_id: String, sync: bool) -> Result<()> {
    let workout_id = workout_id.trim();

    if sync {
        let session = ctx.connect()?;
        session.engine.enqueue_workout_delete(workout_id)?;
        println!("{}", format_deleted(workout_id, session.engine.pending_count()));
        let summary = block_on(session.sync_now())?;
        println!("{}", summary.render());
    } else {
        let mut queue = ctx.open_queue()?;
        queue.enqueue(MutationPayload::delete(workout_id))?;
        println!("{}", format_deleted(workout_id, queue.count()));
    }
    Ok(())
}

pub(crate) fn format_deleted(workout_id: &str, pending: usize) -> String {
    format!("Queued delete of {}\nPending: {}", workout_id, pending)
}

#[cfg(test)]
#[path = "delete_tests.rs"]
mod tests;
