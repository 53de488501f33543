// Presentation layer - HTTP routes, handlers and view models
pub mod app_state;
pub mod error;
pub mod handlers;
pub mod views;
