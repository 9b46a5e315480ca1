use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use axum::{
    Router,
    handler::HandlerWithoutStateExt,
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
};
use quanta::Instant;
use tokio::{fs, net::TcpSocket};
use tracing::{Level, debug};

use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::server_utils::{CustomOnResponse, find_open_port, log_server_start, remember_uri};

/// Serves `site_dir` as-is, the way a static host would.
pub async fn start_preview_web_server(
    site_dir: PathBuf,
    host: bool,
    starting_port: u16,
) -> io::Result<()> {
    let start_time = Instant::now();

    async fn handle_404(site_dir: PathBuf) -> impl IntoResponse {
        let content = match fs::read_to_string(site_dir.join("404.html")).await {
            Ok(custom_content) => custom_content,
            Err(_) => include_str!("./404.html").to_string(),
        };

        (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            content,
        )
            .into_response()
    }

    // Listen on every interface with --host, only on localhost otherwise
    let addr = if host {
        IpAddr::from([0, 0, 0, 0])
    } else {
        IpAddr::from([127, 0, 0, 1])
    };

    let port = find_open_port(&addr, starting_port).await?;
    let socket = TcpSocket::new_v4()?;
    let _ = socket.set_reuseaddr(true);

    socket.bind(SocketAddr::new(addr, port))?;
    let listener = socket.listen(1024)?;
    let local_addr = listener.local_addr()?;

    debug!("listening on {}", local_addr);

    let site_dir_clone = site_dir.clone();
    let service = (move || handle_404(site_dir_clone.clone())).into_service();
    let serve_dir = ServeDir::new(site_dir).not_found_service(service);

    let router = Router::new()
        .fallback_service(serve_dir)
        .layer(middleware::from_fn(remember_uri))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(CustomOnResponse),
        );

    log_server_start(start_time, host, local_addr, "Preview");

    axum::serve(listener, router.into_make_service()).await
}
