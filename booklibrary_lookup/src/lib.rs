#[cfg(any(feature = "client", feature = "server", test))]
use anyhow::Context;
#[cfg(any(feature = "client", feature = "server", test))]
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
#[cfg(any(feature = "client", feature = "server", test))]
use reqwest_tracing::TracingMiddleware;

pub mod api;

#[cfg(any(feature = "client", test))]
pub mod client;

#[cfg(any(feature = "server", test))]
pub mod app_config;
#[cfg(any(feature = "server", test))]
pub mod error;
#[cfg(any(feature = "server", test))]
pub mod genre_suggester;
#[cfg(any(feature = "server", test))]
mod handlers;
#[cfg(any(feature = "server", test))]
pub mod open_library;
#[cfg(any(feature = "server", test))]
pub mod settings;

#[cfg(any(feature = "client", feature = "server", test))]
pub(crate) fn traced_client() -> anyhow::Result<ClientWithMiddleware> {
    let reqwest_client = reqwest::Client::builder()
        .build()
        .context("Failed to build reqwest client")?;
    Ok(ClientBuilder::new(reqwest_client)
        .with(TracingMiddleware::default())
        .build())
}
