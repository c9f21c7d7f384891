//! WebSocket upgrades over tiny_http.
//!
//! tiny_http hands back the raw stream after the 101 response; tungstenite
//! takes over from there without repeating the handshake.

use std::sync::Arc;
use std::thread;

use anyhow::{Result, anyhow};
use tiny_http::{Header, Request, Response, StatusCode};
use tokio::sync::mpsc;
use tungstenite::handshake::derive_accept_key;
use tungstenite::protocol::{Message, Role, WebSocket};

use super::response::{Reply, header_value, send};
use crate::actor::messages::{DevClient, Duplex, WsMsg};
use crate::compiler::SocketEndpoint;
use crate::core::RouteId;
use crate::debug;

/// Whether the request asks for a WebSocket.
pub fn wants_upgrade(request: &Request) -> bool {
    header_value(request, "Upgrade").is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
}

/// Complete the handshake and return the server side of the socket.
fn upgrade(request: Request) -> Result<WebSocket<Box<dyn Duplex>>> {
    let Some(key) = header_value(&request, "Sec-WebSocket-Key") else {
        send(request, Reply::text(400, "missing Sec-WebSocket-Key"))?;
        return Err(anyhow!("upgrade without Sec-WebSocket-Key"));
    };

    let headers = [
        ("Upgrade", "websocket".to_string()),
        ("Connection", "Upgrade".to_string()),
        ("Sec-WebSocket-Accept", derive_accept_key(key.trim().as_bytes())),
    ];
    let mut response = Response::empty(StatusCode(101));
    for (field, value) in headers {
        let header = Header::from_bytes(field, value.as_bytes())
            .map_err(|()| anyhow!("invalid {field} header"))?;
        response = response.with_header(header);
    }

    let stream = request.upgrade("websocket", response);
    Ok(WebSocket::from_raw_socket(
        Box::new(stream) as Box<dyn Duplex>,
        Role::Server,
        None,
    ))
}

/// Register a hot-reload client with the WsActor.
pub fn accept_dev_client(
    request: Request,
    route: Option<RouteId>,
    ws_tx: &mpsc::Sender<WsMsg>,
) -> Result<()> {
    let socket = upgrade(request)?;
    ws_tx
        .blocking_send(WsMsg::AddClient(DevClient { socket, route }))
        .map_err(|_| anyhow!("hot reload is not running"))
}

/// Serve a `.socket` route on its own thread until the client leaves.
pub fn accept_socket(request: Request, endpoint: Arc<dyn SocketEndpoint>) -> Result<()> {
    let socket = upgrade(request)?;
    thread::spawn(move || serve_socket(socket, endpoint.as_ref()));
    Ok(())
}

fn serve_socket(mut socket: WebSocket<Box<dyn Duplex>>, endpoint: &dyn SocketEndpoint) {
    if let Some(greeting) = endpoint.greeting()
        && socket.send(Message::text(greeting)).is_err()
    {
        return;
    }

    loop {
        match socket.read() {
            Ok(Message::Text(text)) => {
                if let Some(reply) = endpoint.on_message(text.as_str())
                    && socket.send(Message::text(reply)).is_err()
                {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("socket"; "connection closed: {}", e);
                break;
            }
        }
    }
}
