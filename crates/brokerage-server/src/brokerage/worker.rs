//! Per-connection worker.
//!
//! Receive a request, run it on a blocking thread, send the status back,
//! repeat. One storage connection and one `TxnRunner` per worker, so
//! nothing is shared between workers except the logs.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use brokerage_core::status::{self, SUCCESS};
use brokerage_core::TxnRunner;
use brokerage_protocol::{decode_request, describe_input, encode_reply, REPLY_SIZE, REQUEST_SIZE};
use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::context::ServerContext;
use crate::transport::{Connection, TransportError};
use crate::types::{WorkerId, WorkerInfo};

pub(crate) async fn run_worker(
    id: WorkerId,
    mut conn: Connection,
    peer: SocketAddr,
    ctx: Arc<ServerContext>,
) {
    let storage = match ctx.storage.connect() {
        Ok(s) => s,
        Err(e) => {
            error!(worker = id.0, error = %e, "cannot open storage connection");
            ctx.log.fault("storage connect", &e);
            conn.disconnect().await;
            return;
        }
    };
    let mut runner = TxnRunner::new(storage, ctx.market_sink());

    ctx.workers.write().await.insert(
        id,
        WorkerInfo {
            peer,
            connected_at: Local::now(),
        },
    );
    info!(worker = id.0, %peer, "worker started");

    let mut shutdown = ctx.shutdown.subscribe();

    loop {
        if *shutdown.borrow_and_update() {
            break;
        }

        let received = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            r = conn.receive(REQUEST_SIZE) => r,
        };
        let buf = match received {
            Ok(buf) => buf,
            Err(TransportError::Closed) => {
                debug!(worker = id.0, "peer disconnected");
                break;
            }
            Err(e) => {
                warn!(worker = id.0, error = %e, "receive failed");
                ctx.log.fault("receive", &e);
                break;
            }
        };

        let input = match decode_request(&buf) {
            Ok(input) => input,
            Err(e) => {
                warn!(worker = id.0, error = %e, "undecodable request, closing");
                ctx.log.fault("decode request", &e);
                break;
            }
        };
        let ty = input.txn_type();
        debug!(worker = id.0, txn = %ty, "request");

        let started = Instant::now();
        let joined = tokio::task::spawn_blocking(move || {
            let result = runner.run(&input);
            (runner, input, result)
        })
        .await;
        let (back, input, result) = match joined {
            Ok(done) => done,
            Err(e) => {
                error!(worker = id.0, txn = %ty, error = %e, "transaction thread failed");
                ctx.log.fault("transaction thread", &e);
                break;
            }
        };
        runner = back;
        let elapsed = started.elapsed();

        if result.status != SUCCESS {
            ctx.log.txn_error(result.status, &describe_input(&input));
            if status::is_console_visible(result.status) {
                error!(
                    txn = %ty,
                    status = result.status,
                    log = %ctx.log.error_path().display(),
                    "transaction failed, see error log"
                );
            }
        }
        ctx.log.mix(ty, result.status, elapsed, result.output.as_ref());

        let mut reply = Vec::with_capacity(REPLY_SIZE);
        encode_reply(result.status, &mut reply);
        if let Err(e) = conn.send(&reply).await {
            warn!(worker = id.0, error = %e, "reply failed");
            ctx.log.fault("send reply", &e);
            break;
        }
    }

    ctx.workers.write().await.remove(&id);
    conn.disconnect().await;
    info!(worker = id.0, %peer, "worker stopped");
}
