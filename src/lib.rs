// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod device;
pub mod device_settings;
pub mod driver;
pub mod error;
pub mod handler;
pub mod hooks;
pub mod input;
pub mod logging;
pub mod pin;
pub mod protocol;
pub mod recovery;
pub mod runtime;
pub mod settings;
pub mod ui;

pub use app::{App, AppState};
