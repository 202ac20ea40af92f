pub mod bootstrap;
pub mod error;
pub mod health;
pub mod routes;
pub mod server;

pub use bootstrap::{bootstrap, bootstrap_with_config, Application, BootstrapError};
pub use routes::{router, AppState};
