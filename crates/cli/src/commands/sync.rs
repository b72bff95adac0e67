// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot sync: probe the remote, drain once, report.

use crate::error::Result;

use super::{block_on, Context};

pub fn run(ctx: &Context) -> Result<()> {
    let session = ctx.connect()?;
    let summary = block_on(session.sync_now())?;
    println!("{}", summary.render());
    Ok(())
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
