pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::Config;
pub use routes::build_router;
pub use state::AppState;
