//! Route table: file-system paths to lazily compiled handlers.
//!
//! ```text
//! users_[id].get ──translate──▶ GET /users/:id ──register──▶ RouteTable
//!                                                                │
//!                     request GET /users/7 ──lookup──▶ RouteMatch{entry, id=7}
//!                                                                │
//!                                      LazyHandler::advance(Request)
//!                                      Uninitialized ──compile──▶ Compiled
//! ```

mod error;
mod handler;
mod table;
mod translate;

pub use error::{HandlerError, RouteError};
pub use handler::{HandlerState, LazyHandler, Trigger};
pub use table::{RouteEntry, RouteKey, RouteMatch, RouteTable};
pub use translate::{RouteSpec, TranslateError, translate};
