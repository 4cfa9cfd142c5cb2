pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod hooks;
pub mod scan;
pub mod surface;
pub mod viewer;
pub mod tasks {
    pub mod controller;
    pub mod loader;
}

pub use viewer::AlbumViewer;
