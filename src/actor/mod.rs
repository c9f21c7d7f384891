//! Actor System for Hot Reload
//!
//! Message-passing concurrency for the running server:
//!
//! ```text
//! FsActor ──▶ ReloadActor ──▶ WsActor ◀── dev socket upgrades (HTTP)
//! (watch)     (recompile,      (per-route
//!              diff)            delivery)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher and initial discovery
//! - `reload` - Serialised change handling
//! - `ws` - Development client delivery
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod reload;
pub mod ws;

pub use coordinator::Coordinator;
