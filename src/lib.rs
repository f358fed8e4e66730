pub mod app;
pub mod chart;
pub mod chart_data;
pub mod config;
pub mod counter;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod pocketbase;
pub mod quarter;
pub mod recipes;
pub mod session;
pub mod state;
pub mod transform;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
