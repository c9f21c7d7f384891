use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::fs::FsActor;
use crate::actor::messages::{ReloadMsg, WsMsg};
use crate::actor::reload::ReloadActor;
use crate::actor::ws::WsActor;

/// Run all actors concurrently.
pub(super) async fn run_actors(
    fs: FsActor,
    reload: ReloadActor,
    ws: WsActor,
    reload_tx: mpsc::Sender<ReloadMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) -> Result<()> {
    let reload_handle = tokio::spawn(async move { reload.run().await });
    let ws_handle = tokio::spawn(async move { ws.run().await });
    let fs_handle = tokio::spawn(async move { fs.run().await });

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    } else {
        let _ = fs_handle.await;
    }

    let _ = reload_tx.send(ReloadMsg::Shutdown).await;
    let _ = ws_tx.send(WsMsg::Shutdown).await;

    let _ = tokio::time::timeout(Duration::from_millis(500), reload_handle).await;
    let _ = tokio::time::timeout(Duration::from_millis(500), ws_handle).await;

    Ok(())
}
