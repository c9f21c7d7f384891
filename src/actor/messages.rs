//! Actor Message Definitions
//!
//! ```text
//! FsActor --Change--> ReloadActor --Notify--> WsActor
//!                                               ^
//!                          HTTP server --AddClient
//! ```

use std::io::{Read, Write};

use tungstenite::WebSocket;

use crate::core::{FileChange, RouteId};
use crate::reload::Delivery;

/// Messages to the ReloadActor
#[derive(Debug)]
pub enum ReloadMsg {
    Change(FileChange),
    Shutdown,
}

/// Messages to the WsActor
pub enum WsMsg {
    /// Push to the clients viewing a route
    Notify(Delivery),
    /// Dev socket connection accepted by the HTTP server
    AddClient(DevClient),
    Shutdown,
}

/// Byte stream a WebSocket runs over.
pub trait Duplex: Read + Write + Send {}

impl<T: Read + Write + Send> Duplex for T {}

/// A development client connected to the dev socket.
pub struct DevClient {
    pub socket: WebSocket<Box<dyn Duplex>>,
    /// Route the client is viewing; `None` receives every notification.
    pub route: Option<RouteId>,
}
