//! JSON input boundary
//!
//! Records arrive as the decoded body of the backend's list endpoint, and
//! filter selections may arrive as a session filter map. Both are plain
//! `serde_json` values.
//!
//! - `decoder.rs` - list payload to `Record`s

mod decoder;

pub use decoder::RecordDecoder;
