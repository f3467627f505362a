pub mod config;
pub mod error;
pub mod events;
pub mod manifest;
pub mod slide;
pub mod stage;
pub mod tasks;
pub mod transition;
