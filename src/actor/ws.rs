//! WebSocket Actor
//!
//! Owns the dev socket clients and delivers hot-reload messages to the
//! ones viewing the affected route. A client whose send fails is dropped.

use tokio::sync::mpsc;
use tungstenite::protocol::Message;

use super::messages::{DevClient, WsMsg};
use crate::core::RouteId;
use crate::debug;
use crate::reload::Delivery;

pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    clients: Vec<DevClient>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Vec::new(),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Notify(delivery) => self.send_to_route(&delivery),
                WsMsg::AddClient(client) => {
                    debug!("ws"; "client connected (total: {}, route: {:?})",
                        self.clients.len() + 1, client.route.as_ref().map(RouteId::as_str));
                    self.clients.push(client);
                }
                WsMsg::Shutdown => {
                    debug!("ws"; "shutting down");
                    for mut client in self.clients.drain(..) {
                        let _ = client.socket.close(None);
                        let _ = client.socket.flush();
                    }
                    break;
                }
            }
        }
    }

    fn send_to_route(&mut self, delivery: &Delivery) {
        let text = delivery.message.to_json();
        let mut sent = 0;

        self.clients.retain_mut(|client| {
            if !wants(client.route.as_ref(), &delivery.route) {
                return true;
            }
            match client.socket.send(Message::text(text.clone())) {
                Ok(()) => {
                    sent += 1;
                    true
                }
                Err(e) => {
                    debug!("ws"; "client disconnected: {}", e);
                    false
                }
            }
        });

        debug!("ws"; "{} sent to {} client(s) viewing {}", delivery.message.label(), sent, delivery.route);
    }
}

/// Whether a client viewing `viewing` receives notifications for `target`.
fn wants(viewing: Option<&RouteId>, target: &RouteId) -> bool {
    viewing.is_none_or(|route| route == target)
}
