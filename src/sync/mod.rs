//! Synchronization from the compile worker to the serving side.
//!
//! ```text
//!  compile worker                         serving side
//!  ──────────────                         ────────────
//!  SyncSender::send(msg) ── JSON frame ──▶ SyncInbox::flush()
//!                          (FIFO)            ├─ dependency_map → replace graph
//!                                            └─ route          → RouteCache::upsert
//! ```
//!
//! The channel is one-directional and ordered. Frames are applied only when
//! the serving side flushes, and a flush applies every queued frame in
//! arrival order under one lock.

mod cache;
mod inbox;
mod message;

pub use cache::{RouteArtifact, RouteCache, RouteVersions};
pub use inbox::{FlushReport, SyncInbox, SyncSender, channel};
pub use message::{RouteContents, SyncError, SyncFrame, SyncMessage};
