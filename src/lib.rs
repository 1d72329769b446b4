// Library surface for the binary and for headless/integration tests.
pub mod app_dirs;
pub mod config;
pub mod day_grid;
pub mod error;
pub mod logging;
pub mod progress;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod speech;
pub mod store;
pub mod study;
pub mod summary;
pub mod util;
pub mod vocab;
pub mod wake_lock;

pub use error::{Result, TrainerError};
