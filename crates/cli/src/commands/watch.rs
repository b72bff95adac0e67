// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Foreground sync loop.
//!
//! Probes the remote on an interval, lets the runner drain on reconnect and
//! on the safety-net interval, and prints every state change until Ctrl-C.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::{Error, Result};
use crate::sync::{spawn_probe, DroppedMutation, SyncRunner};

use super::{block_on, Context, Session};

pub fn run(ctx: &Context) -> Result<()> {
    let session = ctx.connect()?;
    let probe_interval = ctx.config.sync.probe_interval();
    let interval = ctx.config.sync.interval();
    block_on(watch(session, probe_interval, interval))?
}

async fn watch(
    session: Session,
    probe_interval: std::time::Duration,
    interval: std::time::Duration,
) -> Result<()> {
    let target = session
        .probe_target()
        .ok_or_else(|| Error::InvalidRemoteUrl {
            url: session.remote.url.clone(),
            reason: "cannot derive host to probe".to_string(),
        })?;
    let engine = Arc::clone(&session.engine);

    let _pending = engine.on_pending_count_change(|n| println!("{}", format_pending(n)));
    let _syncing = engine.on_syncing_change(|syncing| println!("{}", format_syncing(syncing)));
    let _dropped = engine.on_mutation_dropped(|d| println!("{}", format_dropped(d)));

    let cancel = CancellationToken::new();
    let printer = {
        let mut online = session.monitor.subscribe();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = online.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let now = *online.borrow_and_update();
                        println!("{}", format_connectivity(now));
                    }
                }
            }
        })
    };

    println!(
        "Watching {} ({} pending). Press Ctrl-C to stop.",
        session.remote.url,
        engine.pending_count()
    );

    // First probe before binding the identity, so the initial drain sees
    // the real connectivity.
    session.probe().await;
    let runner = SyncRunner::spawn(Arc::clone(&engine), Arc::clone(&session.monitor), interval);
    let probe = spawn_probe(
        Arc::clone(&session.monitor),
        target,
        probe_interval,
        session.remote.connect_timeout(),
        cancel.clone(),
    );
    engine.initialize(session.identity.clone()).await;

    let signal = tokio::signal::ctrl_c().await;
    info!("stopping watch");
    cancel.cancel();
    runner.shutdown().await;
    let _ = probe.await;
    let _ = printer.await;
    engine.shutdown();
    signal?;

    println!("Stopped ({} pending).", engine.pending_count());
    Ok(())
}

pub(crate) fn format_pending(count: usize) -> String {
    format!("pending: {}", count)
}

pub(crate) fn format_syncing(syncing: bool) -> String {
    if syncing {
        "syncing...".to_string()
    } else {
        "idle".to_string()
    }
}

pub(crate) fn format_connectivity(online: bool) -> String {
    if online {
        "online".to_string()
    } else {
        "offline".to_string()
    }
}

pub(crate) fn format_dropped(dropped: &DroppedMutation) -> String {
    format!(
        "dropped {} {}: {}",
        dropped.kind, dropped.workout_id, dropped.reason
    )
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
