use axum::{
    body::Body,
    extract::Request,
    http::Uri,
    middleware::Next,
    response::Response,
};
use colored::Colorize;
use local_ip_address::local_ip;
use std::{
    io,
    net::{IpAddr, SocketAddr},
    time::Duration,
};
use tokio::net::TcpSocket;
use tower_http::trace::OnResponse;
use tracing::{Span, debug, info};

use crate::logging::{FormatElapsedTimeOptions, format_elapsed_time};

pub fn log_server_start(
    start_time: quanta::Instant,
    host: bool,
    addr: SocketAddr,
    server_type: &str,
) {
    info!(name: "SKIP_FORMAT", "");
    let elapsed_time =
        format_elapsed_time(start_time.elapsed(), &FormatElapsedTimeOptions::default_dev());
    info!(name: "SKIP_FORMAT", "{} {}", "Folio 📁".bold().bright_cyan(), format!("{} server started in {}", server_type, elapsed_time));
    info!(name: "SKIP_FORMAT", "");

    let port = addr.port();
    let url = format!("\x1b]8;;http://localhost:{port}\x1b\\http://localhost:{port}\x1b]8;;\x1b\\")
        .bold()
        .underline()
        .bright_blue();
    let network_url = match (host, local_ip()) {
        (true, Ok(local_ip)) => {
            format!("\x1b]8;;http://{local_ip}:{port}\x1b\\http://{local_ip}:{port}\x1b]8;;\x1b\\")
                .bold()
                .underline()
                .bright_magenta()
        }
        (true, Err(_)) => "Could not determine the local network address".dimmed(),
        (false, _) => "Use --host to expose the server to your network".dimmed(),
    };
    info!(name: "SKIP_FORMAT", "🮔  {}    {}", "Local".bold(), url);
    info!(name: "SKIP_FORMAT", "🮔  {}  {}", "Network".bold(), network_url);
    info!(name: "SKIP_FORMAT", "");

    info!(name: "server", "{}", "waiting for requests...".dimmed());
}

/// Copies the request URI into the response extensions, where [`CustomOnResponse`] can read it.
pub async fn remember_uri(request: Request, next: Next) -> Response {
    let uri = request.uri().clone();
    let mut response = next.run(request).await;
    response.extensions_mut().insert(uri);
    response
}

#[derive(Clone, Debug)]
pub struct CustomOnResponse;

impl OnResponse<Body> for CustomOnResponse {
    fn on_response(self, response: &Response<Body>, latency: Duration, _span: &Span) {
        let status = response.status();

        // Skip informational responses
        if status.is_informational() {
            return;
        }

        let status = if status.is_server_error() {
            status.to_string().red()
        } else if status.is_client_error() {
            status.to_string().yellow()
        } else {
            status.to_string().green()
        };

        let uri = response
            .extensions()
            .get::<Uri>()
            .unwrap_or(&Uri::default())
            .to_string()
            .bold();

        let latency = format_elapsed_time(latency, &FormatElapsedTimeOptions::default());

        let message = format!("{} {} {}", status, uri, latency);

        info!(name: "", "{}", message);
    }
}

pub async fn find_open_port(address: &IpAddr, starting_port: u16) -> io::Result<u16> {
    for port in starting_port..=u16::MAX {
        let socket = if address.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };

        match socket.bind(SocketAddr::new(*address, port)) {
            Ok(_) => {
                debug!("Found open port: {}", port);
                return Ok(port);
            }
            Err(_) => {
                debug!(
                    "Port {} is already in use or failed to bind, trying next one",
                    port
                );
            }
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AddrInUse,
        format!("no free port at or above {starting_port}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_open_port_skips_taken_port() {
        let address = IpAddr::from([127, 0, 0, 1]);
        let taken = tokio::net::TcpListener::bind((address, 0)).await.unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        let port = find_open_port(&address, taken_port).await.unwrap();
        assert_ne!(port, taken_port);
        assert!(port > taken_port);
    }
}
