//! Server lifecycle management.

use std::net::{IpAddr, SocketAddr};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Result, anyhow};
use crossbeam::channel::Receiver;
use tiny_http::Server;

use crate::actor::Coordinator;
use crate::log;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map_or_else(|| "unknown error".to_string(), |e| e.to_string())
    ))
}

/// Run the actor system on its own thread and tokio runtime.
pub fn spawn_actors(coordinator: Coordinator, shutdown_rx: Receiver<()>) -> JoinHandle<()> {
    thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                log!("actor"; "failed to create tokio runtime: {}", e);
                return;
            }
        };

        rt.block_on(async {
            if let Err(e) = coordinator.with_shutdown_signal(shutdown_rx).run().await {
                log!("actor"; "error: {}", e);
            }
        });
    })
}

/// Wait for actor system to shutdown gracefully (max 2 seconds).
pub fn wait_for_shutdown(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_bind_skips_taken_port() {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let (first, first_addr) = bind_with_retry(localhost, 0).unwrap();
        let port = first.server_addr().to_ip().map(|a| a.port()).unwrap();
        assert_eq!(first_addr.port(), 0);

        let (_second, addr) = bind_with_retry(localhost, port).unwrap();
        assert_ne!(addr.port(), port);
    }
}
