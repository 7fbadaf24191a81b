pub mod analysis;
pub mod app;
pub mod audio;
pub mod color;
pub mod command;
pub mod config;
pub mod glyph;
pub mod grid;
pub mod logging;
pub mod mapping;
pub mod picture;
pub mod render;
pub mod signal;
pub mod surface;
pub mod terminal;
pub mod visual;
