//! # Hearth Server
//!
//! Application assembly and HTTP serving for the Hearth framework.
//!
//! - [`AppBuilder`] runs discovery, injection and route installation
//! - [`install`] mounts every router's routes on a [`TransportBinder`]
//! - [`RouteTable`] is the built-in binder
//! - [`Dispatcher`] turns HTTP requests into [`RequestContext`](hearth_core::RequestContext)s
//!   and runs them
//! - [`Server`] serves a dispatcher over HTTP/1.1 with graceful shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use hearth_config::ConfigLoader;
//! use hearth_server::App;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new()
//!         .with_defaults()
//!         .with_optional_file("hearth.toml")?
//!         .with_env_prefix("HEARTH")
//!         .load()?;
//!
//!     let app = App::builder().config(config).build()?;
//!     app.serve().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/hearth-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod dispatcher;
mod error;
mod installer;
pub mod responders;
mod route_table;
mod server;
pub mod shutdown;

pub use app::{App, AppBuilder};
pub use dispatcher::{Dispatcher, REQUEST_ID_HEADER};
pub use error::ServerError;
pub use installer::{install, InstallReport, InstalledRoute};
pub use route_table::{RouteTable, TransportBinder};
pub use server::Server;
pub use shutdown::ShutdownSignal;
