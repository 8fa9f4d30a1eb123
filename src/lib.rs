// Export modules for use in tests
pub mod app;
pub mod assets;
pub mod event_source;
pub mod loader;
pub mod panic_handler;
pub mod recognize;
pub mod render;
pub mod select;
pub mod settings;
pub mod speech;
pub mod surface;
pub mod widget;

// Re-export main app components
pub use app::{ReaderApp, run_app};
