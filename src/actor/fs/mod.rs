//! FileSystem Actor
//!
//! Watches the source directory and forwards every change, in order, to
//! the ReloadActor.
//!
//! ```text
//! notify ──(std mpsc)──▶ bridge thread ──(tokio mpsc)──▶ classify ──▶ ReloadMsg
//! ```
//!
//! The watcher is created before initial discovery so nothing written in
//! between is lost; events buffer in the bridge until `run` starts.

mod classifier;
mod filter;
mod scan;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;

use super::messages::ReloadMsg;
use crate::{debug, log};

pub use filter::WatchFilter;
pub use scan::{discover, scan};

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("source directory {0} does not exist")]
    MissingRoot(PathBuf),

    #[error("failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// notify callback output (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Must stay alive for events to flow.
    watcher: RecommendedWatcher,
    filter: WatchFilter,
    reload_tx: mpsc::Sender<ReloadMsg>,
}

impl FsActor {
    /// Start watching immediately. Any failure here is fatal to startup.
    pub fn new(filter: WatchFilter, reload_tx: mpsc::Sender<ReloadMsg>) -> Result<Self, WatcherError> {
        let root = filter.base().to_path_buf();
        if !root.is_dir() {
            return Err(WatcherError::MissingRoot(root));
        }

        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let watch_err = |source| WatcherError::Watch {
            path: root.clone(),
            source,
        };

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = notify_tx.send(res);
        })
        .map_err(watch_err)?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(watch_err)?;

        debug!("watch"; "watching {}", root.display());
        Ok(Self {
            notify_rx,
            watcher,
            filter,
            reload_tx,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            notify_rx,
            watcher: _watcher,
            filter,
            reload_tx,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // notify only offers a sync callback
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    // Runtime errors do not stop the watcher.
                    Err(e) => log!("watch"; "notify error: {}", e),
                }
            }
        });

        while let Some(event) = async_rx.recv().await {
            for change in classifier::classify(&event, &filter) {
                debug!("watch"; "{}: {}", change.kind.label(), change.path.display());
                if reload_tx.send(ReloadMsg::Change(change)).await.is_err() {
                    return;
                }
            }
        }
    }
}
