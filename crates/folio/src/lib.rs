#![cfg_attr(docsrs, feature(doc_cfg))]
//! Client-side behavior of a static portfolio site.
//!
//! - [`router`]: in-page navigation between the pages of a fixed [`RouteTable`], swapping the `#page-content` region
//!   of fetched pages into the live document and keeping the browser history consistent.
//! - [`nav`]: the hamburger menu toggle.
//! - [`theme`]: the light/dark theme switcher, remembered across visits.
//!
//! Everything the browser provides goes through the traits in [`ports`], so the logic runs anywhere. The `web`
//! feature adds the browser implementations and mounts everything on the page.
//!
//! ## Example
//! ```rust
//! use folio::memory::{ImmediateTimer, MemoryFetcher, MemoryHistory, MemoryLocation, MemoryRenderer};
//! use folio::{Ports, RouteTable, Router, RouterOptions};
//!
//! let fetcher = MemoryFetcher::default();
//! fetcher.insert(
//!     "about.html",
//!     r#"<title>About</title><div id="page-content"><h1>About</h1></div>"#,
//! );
//!
//! let router = Router::new(
//!     RouteTable::portfolio(),
//!     RouterOptions::default(),
//!     Ports {
//!         fetcher,
//!         history: MemoryHistory::at("/"),
//!         renderer: MemoryRenderer::with_content("<h1>Home</h1>"),
//!         location: MemoryLocation::default(),
//!         timer: ImmediateTimer::default(),
//!     },
//! )?;
//!
//! router.start()?;
//! # Ok::<(), folio::errors::FolioError>(())
//! ```

pub mod active_link;
pub mod errors;
pub mod fragment;
pub mod memory;
pub mod nav;
pub mod ports;
pub mod router;
pub mod routes;
pub mod theme;

mod options;

#[cfg(feature = "web")]
#[cfg_attr(docsrs, doc(cfg(feature = "web")))]
pub mod web;

pub use options::{RouterOptions, StaleNavigation};
pub use router::{NavigationOutcome, Ports, Router};
pub use routes::{Anchor, RouteTable};
