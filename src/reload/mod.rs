//! Hot reload.
//!
//! ```text
//! FileChange ──▶ notifier ──walk──▶ DependencyGraph
//!                   │
//!                   ├── recompile page ──▶ RouteCache (previous, current)
//!                   │                            │
//!                   │                          diff
//!                   ▼                            │
//!               Delivery ◀───── css | reload ────┘
//! ```
//!
//! # Modules
//!
//! - `message` - frames sent to development clients
//! - `diff` - style patch versus full reload
//! - `notifier` - change events to deliveries

pub mod diff;
pub mod message;
pub mod notifier;

pub use message::HotReloadMessage;
pub use notifier::{ChangeOutcome, Delivery, ReloadRequest, apply_reload, on_change};
