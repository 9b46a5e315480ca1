//! Drives the router over every route of a site directory, to find pages that would make it fall back to a full load.
use std::{
    io,
    path::{Path, PathBuf},
};

use colored::Colorize;
use folio::{
    NavigationOutcome, Ports, RouteTable, Router, RouterOptions,
    errors::{FolioError, NavigationError},
    memory::{ImmediateTimer, MemoryHistory, MemoryLocation, MemoryRenderer},
    ports::{FetchResponse, Fetcher},
};
use tracing::info;

use crate::logging::{FormatElapsedTimeOptions, format_elapsed_time};

/// Reads pages from a directory. Missing files answer `404`, like a static host would.
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Fetcher for FsFetcher {
    async fn fetch(&self, resource: &str) -> Result<FetchResponse, NavigationError> {
        let path = self.root.join(resource.trim_start_matches('/'));

        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(FetchResponse::ok(body)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(FetchResponse {
                status: 404,
                body: String::new(),
            }),
            Err(err) => Err(NavigationError::Transport(format!(
                "{}: {}",
                path.display(),
                err
            ))),
        }
    }
}

#[derive(Debug)]
pub enum RouteStatus {
    Swapped { title: String },
    Fallback { reason: String },
}

#[derive(Debug)]
pub struct RouteReport {
    pub path: String,
    pub resource: String,
    pub status: RouteStatus,
}

#[derive(Debug, Default)]
pub struct CheckReport {
    pub routes: Vec<RouteReport>,
}

impl CheckReport {
    pub fn fallbacks(&self) -> usize {
        self.routes
            .iter()
            .filter(|route| matches!(route.status, RouteStatus::Fallback { .. }))
            .count()
    }

    pub fn all_swapped(&self) -> bool {
        self.fallbacks() == 0
    }
}

pub async fn check_route(
    site_dir: &Path,
    routes: &RouteTable,
    path: &str,
) -> Result<RouteStatus, FolioError> {
    let router = Router::new(
        routes.clone(),
        RouterOptions::default(),
        Ports {
            fetcher: FsFetcher::new(site_dir),
            history: MemoryHistory::at("/"),
            renderer: MemoryRenderer::with_content(""),
            location: MemoryLocation::default(),
            timer: ImmediateTimer::default(),
        },
    )?;
    router.start()?;

    let status = match router.navigate(path).await {
        NavigationOutcome::Rendered | NavigationOutcome::Superseded => RouteStatus::Swapped {
            title: router.ports().renderer.title().trim().to_string(),
        },
        NavigationOutcome::FullReload { reason } => RouteStatus::Fallback {
            reason: reason.to_string(),
        },
    };

    Ok(status)
}

pub async fn check_site(site_dir: &Path) -> Result<CheckReport, FolioError> {
    if !site_dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", site_dir.display()),
        )
        .into());
    }

    let start_time = quanta::Instant::now();
    let routes = RouteTable::portfolio();
    let mut report = CheckReport::default();

    for (path, resource) in routes.iter() {
        let status = check_route(site_dir, &routes, path).await?;

        match &status {
            RouteStatus::Swapped { title } => {
                info!(name: "check", "{} {} {}", "swap".green(), path.bold(), title.dimmed())
            }
            RouteStatus::Fallback { reason } => {
                info!(name: "check", "{} {} {}", "fallback".yellow(), path.bold(), reason)
            }
        }

        report.routes.push(RouteReport {
            path: path.to_string(),
            resource: resource.to_string(),
            status,
        });
    }

    let elapsed = format_elapsed_time(start_time.elapsed(), &FormatElapsedTimeOptions::default());

    info!(
        name: "check",
        "{} routes checked in {}, {} would fall back",
        report.routes.len(),
        elapsed,
        report.fallbacks()
    );

    Ok(report)
}
