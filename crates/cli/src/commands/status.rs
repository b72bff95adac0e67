// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::config::RemoteConfig;
use crate::error::Result;
use crate::sync::{probe_once, probe_target};

use super::{block_on, Context};

/// Reachability of the configured remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reachability {
    NotConfigured,
    Reachable,
    Unreachable,
}

/// Show state directory, remote, identity and queue status.
pub fn run(ctx: &Context) -> Result<()> {
    let pending = ctx.open_queue()?.count();
    let identity = ctx.config.identity()?.map(|id| id.to_string());
    let reachability = match &ctx.config.remote {
        Some(remote) => block_on(probe(remote))?,
        None => Reachability::NotConfigured,
    };

    print!(
        "{}",
        format_status(
            &ctx.state_dir,
            ctx.config.remote.as_ref(),
            reachability,
            identity.as_deref(),
            pending,
        )
    );
    Ok(())
}

async fn probe(remote: &RemoteConfig) -> Reachability {
    let Some(target) = probe_target(&remote.url) else {
        return Reachability::Unreachable;
    };
    if probe_once(&target, remote.connect_timeout()).await {
        Reachability::Reachable
    } else {
        Reachability::Unreachable
    }
}

pub(crate) fn format_status(
    state_dir: &Path,
    remote: Option<&RemoteConfig>,
    reachability: Reachability,
    identity: Option<&str>,
    pending: usize,
) -> String {
    let status = match reachability {
        Reachability::NotConfigured => "local only (no remote configured)",
        Reachability::Reachable => "online",
        Reachability::Unreachable => "offline",
    };
    let mut out = format!("Status: {}\n", status);
    if let Some(remote) = remote {
        out.push_str(&format!("Remote: {}\n", remote.url));
    }
    out.push_str(&format!("Identity: {}\n", identity.unwrap_or("not set")));
    out.push_str(&format!("Pending ops: {}\n", pending));
    out.push_str(&format!("State dir: {}\n", state_dir.display()));
    if reachability == Reachability::NotConfigured {
        out.push_str("\nTo enable sync, run 'fitsync config remote ws://host:port'.\n");
    }
    out
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
