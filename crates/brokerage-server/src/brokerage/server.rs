//! TCP listener and top-level Brokerage House wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Accepts new TCP connections.
//! - Assigns each connection a `WorkerId` and spawns its worker task.
//! - On shutdown stops accepting and waits for every worker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::context::ServerContext;
use crate::transport::Listener;
use crate::types::WorkerId;

use super::worker;

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

fn next_worker_id() -> WorkerId {
    WorkerId(NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed))
}

/// Bind the configured address and serve until shutdown.
pub async fn run(ctx: Arc<ServerContext>) -> anyhow::Result<()> {
    let addr = ctx.config.bh_listen_addr();
    let listener = Listener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    serve(listener, ctx).await
}

/// Accept on `listener` until `ctx.shutdown` fires, then wait for the
/// workers to finish.
pub async fn serve(listener: Listener, ctx: Arc<ServerContext>) -> anyhow::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "brokerage house listening");
    }

    let mut shutdown = ctx.shutdown.subscribe();
    let mut workers = JoinSet::new();

    while !*shutdown.borrow_and_update() {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            Some(done) = workers.join_next(), if !workers.is_empty() => {
                if let Err(e) = done {
                    warn!(error = %e, "worker task failed");
                }
            }
            accepted = listener.accept() => {
                let (conn, peer) = match accepted {
                    Ok(a) => a,
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                        continue;
                    }
                };

                // Includes workers that have not registered yet.
                if workers.len() >= ctx.config.max_workers {
                    warn!(%peer, max = ctx.config.max_workers, "rejecting connection, too many workers");
                    drop(conn);
                    continue;
                }

                let id = next_worker_id();
                workers.spawn(worker::run_worker(id, conn, peer, Arc::clone(&ctx)));
            }
        }
    }

    info!(workers = workers.len(), "brokerage house stopping");
    for (id, w) in ctx.workers.read().await.iter() {
        info!(
            worker = id.0,
            peer = %w.peer,
            since = %w.connected_at.format("%H:%M:%S"),
            "waiting for worker"
        );
    }
    while let Some(done) = workers.join_next().await {
        if let Err(e) = done {
            warn!(error = %e, "worker task failed");
        }
    }
    info!("brokerage house stopped");
    Ok(())
}
