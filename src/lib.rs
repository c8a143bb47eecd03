pub mod app;
pub mod compositor;
pub mod config;
pub mod controller;
pub mod input;
pub mod params;
pub mod render;
pub mod sim;
pub mod snapshot;
pub mod terminal;
