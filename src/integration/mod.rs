//! Integration testing module
//!
//! End-to-end tests over complete master playlists:
//! - Segment-by-segment MPEG-TS and fMP4 variants
//! - Byte-range addressed fMP4
//! - Validation failures, index and path errors
//! - Concurrent loads over one shared loader

pub mod e2e;
pub mod fixtures;
