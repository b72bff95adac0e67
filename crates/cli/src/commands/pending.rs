// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use fit_core::{MutationPayload, QueuedMutation};

use crate::cli::OutputFormat;
use crate::error::Result;

use super::Context;

pub fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let queue = ctx.open_queue()?;
    let pending = queue.list();

    match output {
        OutputFormat::Text => {
            if pending.is_empty() {
                println!("Nothing pending.");
            }
            for mutation in &pending {
                println!("{}", format_mutation(mutation));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&pending)?);
        }
    }
    Ok(())
}

/// One line per mutation: time, kind, workout, detail.
pub(crate) fn format_mutation(mutation: &QueuedMutation) -> String {
    let when = mutation.created_at.format("%Y-%m-%d %H:%M:%S");
    let detail = match &mutation.payload {
        MutationPayload::CreateWorkout { fields } => {
            format!("{} {} {}", fields.exercise_type, fields.amount, fields.unit)
        }
        MutationPayload::DeleteWorkout { .. } => String::new(),
    };
    let mut line = format!(
        "{} {} {} {}",
        when,
        mutation.kind(),
        mutation.payload.workout_id(),
        detail
    )
    .trim_end()
    .to_string();
    if mutation.attempts > 0 {
        line.push_str(&format!(" (attempts: {})", mutation.attempts));
    }
    line
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
