//! HLS playlist hosting
//!
//! Takes a parsed master playlist with its media playlists and segments,
//! validates the model, lays it out under a hosting root
//! (`<i>/playlist.m3u8` per variant) and renders line-exact M3U8 text.
//!
//! ```no_run
//! use hls_hosting::{Loader, MasterPlaylist};
//!
//! # fn run(master: MasterPlaylist) -> hls_hosting::Result<()> {
//! let loader = Loader::new(master);
//! let master_m3u8 = loader.load_master_playlist()?;
//! let first_variant = loader.load_media_playlist(0)?;
//! # Ok(())
//! # }
//! ```

pub mod byterange;
pub mod cache;
pub mod config;
pub mod error;
pub mod hosting;
pub mod loader;
pub mod model;
pub mod resolve;
pub mod serialize;
pub mod tags;
pub mod validate;

#[cfg(test)]
mod integration;

pub use byterange::{ByteRange, ResolvedByteRange};
pub use cache::{CachedLoader, PlaylistCache};
pub use config::HostingConfig;
pub use error::{
    HostingError, IndexError, PathError, PathErrorReason, Result, ValidationError, Violation,
    ViolationKind,
};
pub use hosting::{write_tree, HostedTree};
pub use loader::Loader;
pub use model::{
    ContainerFormat, MasterPlaylist, MediaPlaylist, MediaPlaylistBuilder, RequestType, Segment,
};
pub use resolve::{
    resolve, ResolvedMasterPlaylist, ResolvedMediaPlaylist, Resolver, SegmentReference,
};
pub use serialize::{render_master, render_media};
pub use validate::{validate, validate_media};
