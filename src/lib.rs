pub mod app;
pub mod clock;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;

pub use app::router;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CheckInConfig, Team};
pub use state::AppState;
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
pub use store::{CheckInStore, LoadOutcome, StoreEvent};
