//! Channel endpoints and frame application.

use crossbeam::channel::{Receiver, Sender, unbounded};
use parking_lot::{Mutex, RwLock};

use super::{RouteCache, SyncError, SyncFrame, SyncMessage};
use crate::compiler::DependencyGraph;

/// Create a connected sender/inbox pair.
pub fn channel() -> (SyncSender, SyncInbox) {
    let (tx, rx) = unbounded();
    (
        SyncSender { tx },
        SyncInbox {
            rx,
            apply_lock: Mutex::new(()),
        },
    )
}

/// Worker side of the channel.
#[derive(Clone)]
pub struct SyncSender {
    tx: Sender<SyncFrame>,
}

impl SyncSender {
    pub fn send(&self, message: &SyncMessage) -> Result<(), SyncError> {
        self.send_frame(SyncFrame::encode(message)?)
    }

    pub fn send_frame(&self, frame: SyncFrame) -> Result<(), SyncError> {
        self.tx.send(frame).map_err(|_| SyncError::Disconnected)
    }
}

/// Outcome of one flush.
#[derive(Debug, Default)]
pub struct FlushReport {
    /// Frames that decoded and were applied.
    pub applied: usize,
    pub errors: Vec<SyncError>,
}

/// Serving side of the channel.
pub struct SyncInbox {
    rx: Receiver<SyncFrame>,
    apply_lock: Mutex<()>,
}

impl SyncInbox {
    /// Apply every queued frame, in arrival order.
    ///
    /// Concurrent flushes serialize on the apply lock so frames are never
    /// applied out of order.
    pub fn flush(&self, cache: &RouteCache, graph: &RwLock<DependencyGraph>) -> FlushReport {
        let _guard = self.apply_lock.lock();
        let mut report = FlushReport::default();

        while let Ok(frame) = self.rx.try_recv() {
            match frame.decode() {
                Ok(message) => {
                    report.applied += 1;
                    if let Err(err) = apply(message, cache, graph) {
                        report.errors.push(err);
                    }
                }
                Err(err) => report.errors.push(err),
            }
        }

        report
    }
}

/// Apply one message.
///
/// A route update naming a dependency the graph does not know is still
/// applied, but reported: it means the update overtook its snapshot.
fn apply(
    message: SyncMessage,
    cache: &RouteCache,
    graph: &RwLock<DependencyGraph>,
) -> Result<(), SyncError> {
    match message {
        SyncMessage::DependencyMap { dependency_map } => {
            *graph.write() = DependencyGraph::from_snapshot(dependency_map);
            Ok(())
        }
        SyncMessage::Route { route, contents } => {
            let missing = {
                let graph = graph.read();
                contents
                    .dependencies
                    .iter()
                    .find(|dep| !graph.contains(dep))
                    .cloned()
            };
            cache.upsert(route.clone(), contents);
            match missing {
                Some(dep) => Err(SyncError::StaleGraph { route, dep }),
                None => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::DependencySnapshot;
    use crate::core::{RouteId, RunMode};
    use crate::sync::RouteContents;
    use std::path::PathBuf;

    fn snapshot() -> SyncMessage {
        let mut map = DependencySnapshot::new();
        map.insert(
            PathBuf::from("/src/Nav.component"),
            vec![PathBuf::from("/src/index.page")],
        );
        SyncMessage::DependencyMap {
            dependency_map: map,
        }
    }

    fn update() -> SyncMessage {
        SyncMessage::Route {
            route: RouteId::new("/"),
            contents: RouteContents {
                source_relative_path: "index.page".into(),
                data_script: None,
                hydration_script: String::new(),
                module_code: "m".into(),
                style: String::new(),
                dependencies: vec![PathBuf::from("/src/Nav.component")],
            },
        }
    }

    fn state() -> (RouteCache, RwLock<DependencyGraph>) {
        (
            RouteCache::new(RunMode::Development),
            RwLock::new(DependencyGraph::new()),
        )
    }

    #[test]
    fn test_snapshot_then_update_is_clean() {
        let (tx, inbox) = channel();
        let (cache, graph) = state();

        tx.send(&snapshot()).unwrap();
        tx.send(&update()).unwrap();

        let report = inbox.flush(&cache, &graph);
        assert_eq!(report.applied, 2);
        assert!(report.errors.is_empty());
        assert!(cache.current(&RouteId::new("/")).is_some());
    }

    #[test]
    fn test_update_then_snapshot_is_stale() {
        let (tx, inbox) = channel();
        let (cache, graph) = state();

        tx.send(&update()).unwrap();
        tx.send(&snapshot()).unwrap();

        let report = inbox.flush(&cache, &graph);
        assert_eq!(report.applied, 2);
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            &report.errors[0],
            SyncError::StaleGraph { route, .. } if route.as_str() == "/"
        ));
        // Applied regardless.
        assert!(cache.current(&RouteId::new("/")).is_some());
    }

    #[test]
    fn test_snapshot_replaces_graph() {
        let (tx, inbox) = channel();
        let (cache, graph) = state();

        tx.send(&snapshot()).unwrap();
        tx.send(&SyncMessage::DependencyMap {
            dependency_map: DependencySnapshot::new(),
        })
        .unwrap();
        inbox.flush(&cache, &graph);

        assert_eq!(graph.read().len(), 0);
    }

    #[test]
    fn test_malformed_frame_reported_and_skipped() {
        let (tx, inbox) = channel();
        let (cache, graph) = state();

        tx.send_frame(SyncFrame::from_text(r#"{"type":"bogus"}"#)).unwrap();
        tx.send(&snapshot()).unwrap();

        let report = inbox.flush(&cache, &graph);
        assert_eq!(report.applied, 1);
        assert!(matches!(report.errors[0], SyncError::Malformed(_)));
        assert_eq!(graph.read().len(), 1);
    }

    #[test]
    fn test_send_after_inbox_dropped() {
        let (tx, inbox) = channel();
        drop(inbox);
        assert!(matches!(tx.send(&snapshot()), Err(SyncError::Disconnected)));
    }
}
