// Domain layer - Pure models and state machines, no I/O
pub mod device;
pub mod game_result;
pub mod i18n;
pub mod markers;
pub mod power;
pub mod recording;
pub mod settings;
pub mod time_label;
