pub mod config;
pub mod debounce;
pub mod metrics;
pub mod routes;
pub mod session;
pub mod state;

pub use config::Config;
pub use routes::router;
pub use state::AppState;
