pub mod app;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod export;
pub mod extract;
pub mod handlers;
pub mod hours;
pub mod models;
pub mod noshow;
pub mod records;
pub mod roster;
pub mod schedule;
pub mod state;
pub mod stats;
pub mod storage;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_data;
