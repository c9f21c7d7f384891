//! Reload Actor
//!
//! Applies file changes strictly one at a time. Compiles block, so each
//! change runs on the blocking pool while the actor waits for it.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::{ReloadMsg, WsMsg};
use crate::context::ServerContext;
use crate::core::FileChange;
use crate::reload::{ChangeOutcome, Delivery, apply_reload, on_change};
use crate::{debug, log};

pub struct ReloadActor {
    rx: mpsc::Receiver<ReloadMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    ctx: Arc<ServerContext>,
}

impl ReloadActor {
    pub fn new(
        rx: mpsc::Receiver<ReloadMsg>,
        ws_tx: mpsc::Sender<WsMsg>,
        ctx: Arc<ServerContext>,
    ) -> Self {
        Self { rx, ws_tx, ctx }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            let change = match msg {
                ReloadMsg::Change(change) => change,
                ReloadMsg::Shutdown => break,
            };

            let ctx = Arc::clone(&self.ctx);
            let handled = tokio::task::spawn_blocking(move || handle_change(&ctx, &change)).await;

            let deliveries = match handled {
                Ok(Some(deliveries)) => deliveries,
                Ok(None) => {
                    log!("watch"; "source changed in production mode, exiting");
                    std::process::exit(1);
                }
                Err(e) => {
                    log!("error"; "reload task failed: {}", e);
                    continue;
                }
            };

            for delivery in deliveries {
                if self.ws_tx.send(WsMsg::Notify(delivery)).await.is_err() {
                    return;
                }
            }
        }
        debug!("reload"; "stopped");
    }
}

/// Deliveries for one change; `None` when the process must exit.
fn handle_change(ctx: &ServerContext, change: &FileChange) -> Option<Vec<Delivery>> {
    match on_change(ctx, change) {
        ChangeOutcome::Exit => None,
        ChangeOutcome::Ignored => Some(Vec::new()),
        ChangeOutcome::Notified(requests) => {
            debug!("reload"; "{} {}: {} page(s) to reload",
                change.kind.label(), change.path.display(), requests.len());
            Some(
                requests
                    .iter()
                    .filter_map(|request| apply_reload(ctx, request))
                    .collect(),
            )
        }
    }
}
