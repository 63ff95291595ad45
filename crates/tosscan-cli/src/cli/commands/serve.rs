//! `tosscan serve`: native-messaging host on stdin/stdout.
//!
//! Requests are handled concurrently so `cancelAnalysis` can reach a running
//! `analyzeLinks`; replies are written in completion order by one writer task.

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tosscan_core::command::framing::{self, MAX_OUTGOING};
use tosscan_core::command::{Dispatcher, Response};
use tosscan_core::orchestrator::Orchestrator;

use crate::cli::panel::DetachedPanel;

pub async fn run_serve(orch: Arc<Orchestrator>) -> Result<()> {
    let dispatcher = Arc::new(Dispatcher::new(orch, Box::new(DetachedPanel)));
    tracing::info!("native messaging host started");
    serve_stream(dispatcher, tokio::io::stdin(), tokio::io::stdout()).await?;
    tracing::info!("stdin closed, native messaging host exiting");
    Ok(())
}

/// Serve framed requests from `reader` until EOF, replying on `writer`.
pub async fn serve_stream<R, W>(dispatcher: Arc<Dispatcher>, mut reader: R, writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<Vec<u8>>(32);
    let writer_task = tokio::spawn(write_replies(rx, writer));

    let mut handlers = JoinSet::new();
    while let Some(raw) = framing::read_message(&mut reader).await? {
        reap_finished(&mut handlers);
        let dispatcher = Arc::clone(&dispatcher);
        let tx = tx.clone();
        handlers.spawn(async move {
            let mut reply = dispatcher.handle_raw(&raw).await.to_bytes();
            if reply.len() > MAX_OUTGOING {
                tracing::warn!(bytes = reply.len(), "reply too large for native messaging");
                reply = Response::failure("response exceeds the native messaging size limit")
                    .to_bytes();
            }
            // Receiver only goes away when the writer failed; already logged.
            let _ = tx.send(reply).await;
        });
    }
    while let Some(joined) = handlers.join_next().await {
        log_join_failure(joined);
    }
    drop(tx);
    writer_task.await??;
    Ok(())
}

/// Drop handlers that already finished. Returns how many were reaped.
fn reap_finished(handlers: &mut JoinSet<()>) -> usize {
    let mut reaped = 0;
    while let Some(joined) = handlers.try_join_next() {
        log_join_failure(joined);
        reaped += 1;
    }
    reaped
}

fn log_join_failure(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!("request handler failed: {e}");
    }
}

async fn write_replies<W: AsyncWrite + Unpin>(mut rx: mpsc::Receiver<Vec<u8>>, mut writer: W) -> Result<()> {
    while let Some(reply) = rx.recv().await {
        if let Err(e) = framing::write_message(&mut writer, &reply).await {
            tracing::error!("writing reply failed: {e:#}");
            return Err(e);
        }
    }
    Ok(())
}
