//! webshelf: local library server for a personal web archive
//!
//! One binary that serves the bundled UI, proxies full-text queries to the
//! archive index, renders HTML/JSON result views, and relocates the archive
//! root at runtime by restarting its own listener:
//! - Archivist trait + in-memory reference archive with a JSON on-disk index
//! - Term highlighting and snippet assembly for result previews
//! - Pure HTML views with contextual escaping
//! - Single-listener lifecycle with a coordinated base-path restart protocol

pub mod archive;
pub mod config;
pub mod highlight;
pub mod render;
pub mod server;
pub mod util;

pub use config::Config;
