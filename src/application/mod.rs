// Application layer - Use cases, pollers and the ports they depend on
pub mod dashboard_service;
pub mod map_service;
pub mod recording_service;
pub mod result_service;
pub mod session_service;
pub mod settings_store;
pub mod telemetry_api;

#[cfg(test)]
pub mod testing;
