pub mod app;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod overview;
pub mod picker;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;
pub mod year_state;

pub use app::router;
pub use config::Config;
pub use overview::spawn_refresh_loop;
pub use state::AppState;
