pub mod api;

#[cfg(any(feature = "client", test))]
pub mod client;

#[cfg(any(feature = "server", test))]
pub mod app_config;
#[cfg(any(feature = "server", test))]
pub mod books;
#[cfg(any(feature = "server", test))]
pub mod catalog;
#[cfg(any(feature = "server", test))]
pub mod collections;
#[cfg(any(feature = "server", test))]
pub mod context;
#[cfg(any(feature = "server", test))]
pub mod error;
#[cfg(any(feature = "server", test))]
mod handlers;
#[cfg(any(feature = "server", test))]
pub mod settings;
#[cfg(any(feature = "server", test))]
pub mod store;
