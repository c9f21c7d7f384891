//! Actor Coordinator - Wires up the Hot Reload Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates communication channels
//! - Starts the watcher before initial discovery
//! - Runs the actors concurrently

mod runtime;

use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::{FsActor, WatchFilter, WatcherError};
use super::messages::{ReloadMsg, WsMsg};
use super::reload::ReloadActor;
use super::ws::WsActor;
use crate::context::ServerContext;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    ctx: Arc<ServerContext>,
    fs: FsActor,
    reload_tx: mpsc::Sender<ReloadMsg>,
    reload_rx: mpsc::Receiver<ReloadMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    ws_rx: mpsc::Receiver<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    /// Create the channels and start watching `filter.base()`.
    ///
    /// Events observed from here on queue up until [`Coordinator::run`].
    pub fn new(ctx: Arc<ServerContext>, filter: WatchFilter) -> Result<Self, WatcherError> {
        let (reload_tx, reload_rx) = mpsc::channel::<ReloadMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);
        let fs = FsActor::new(filter, reload_tx.clone())?;

        Ok(Self {
            ctx,
            fs,
            reload_tx,
            reload_rx,
            ws_tx,
            ws_rx,
            shutdown_rx: None,
        })
    }

    /// Sender used by the HTTP side to hand over upgraded dev sockets.
    pub fn ws_sender(&self) -> mpsc::Sender<WsMsg> {
        self.ws_tx.clone()
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(self) -> Result<()> {
        let reload = ReloadActor::new(self.reload_rx, self.ws_tx.clone(), self.ctx);
        let ws = WsActor::new(self.ws_rx);

        crate::debug!("actor"; "start");
        runtime::run_actors(
            self.fs,
            reload,
            ws,
            self.reload_tx,
            self.ws_tx,
            self.shutdown_rx,
        )
        .await?;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
