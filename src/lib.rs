//! showreel - portfolio site backend for a filmmaker
//!
//! Content comes from a headless CMS with a bundled fallback, media keys
//! resolve against a public CDN bucket, and the embedded player and its
//! full-screen overlay are modelled as state machines driven by an async
//! event loop.

pub mod contact;
pub mod content;
pub mod media;
pub mod player;
pub mod server;
pub mod utils;

pub use utils::error::{Result, ShowreelError};
