pub mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod content;
pub mod events;
pub mod input;
pub mod machine;
pub mod menu;
pub mod picking;
pub mod popup;
pub mod stage;
pub mod theme;
pub mod time;
pub mod tween;

pub use app::{run, run_with_overrides, Presentation};
