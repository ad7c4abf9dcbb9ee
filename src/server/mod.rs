mod api_error;
pub mod config;
mod http_layers;
mod paging;
mod question_routes;
mod quiz_routes;
#[allow(clippy::module_inception)]
pub mod server;
pub mod state;
#[cfg(test)]
mod test_store;

pub use config::ServerConfig;
pub use http_layers::*;
#[allow(unused_imports)] // Used by main.rs
pub use server::run_server;
