//! Playlist loader
//!
//! Composes validation, path resolution and serialization over one
//! immutable master playlist. Every call is independent; a `Loader` can be
//! shared across threads behind an `Arc`.

use bytes::Bytes;

use crate::config::HostingSettings;
use crate::error::{IndexError, Result};
use crate::model::MasterPlaylist;
use crate::resolve::{ResolvedMasterPlaylist, Resolver, SegmentReference};
use crate::serialize::{render_master, render_media};
use crate::validate::{validate, validate_media};

#[derive(Debug, Clone)]
pub struct Loader {
    master: MasterPlaylist,
    resolver: Resolver,
}

impl Loader {
    /// Loader hosting at the root with `playlist.m3u8` media playlists
    pub fn new(master: MasterPlaylist) -> Self {
        Self::with_resolver(master, Resolver::default())
    }

    pub fn with_settings(master: MasterPlaylist, settings: &HostingSettings) -> Self {
        Self::with_resolver(
            master,
            Resolver::new(settings.root.as_str(), settings.media_playlist_name.as_str()),
        )
    }

    pub fn with_resolver(master: MasterPlaylist, resolver: Resolver) -> Self {
        Self { master, resolver }
    }

    pub fn master(&self) -> &MasterPlaylist {
        &self.master
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Number of media playlists
    pub fn media_count(&self) -> usize {
        self.master.media_playlists.len()
    }

    /// Validate the whole model and compute every hosting path
    pub fn resolve(&self) -> Result<ResolvedMasterPlaylist<'_>> {
        validate(&self.master)?;
        Ok(self.resolver.resolve(&self.master)?)
    }

    /// Render the master playlist
    pub fn load_master_playlist(&self) -> Result<Bytes> {
        let resolved = self.resolve()?;
        Ok(render_master(&resolved))
    }

    /// Render the media playlist at `index`
    pub fn load_media_playlist(&self, index: usize) -> Result<Bytes> {
        let media = self
            .master
            .media_playlists
            .get(index)
            .ok_or(IndexError {
                index,
                len: self.media_count(),
            })?;
        validate_media(index, media)?;
        let resolved = self.resolver.resolve_media(&self.master, index, media)?;
        Ok(render_media(&resolved))
    }

    /// Segment files to host, by media index then playback order
    pub fn segment_references(&self) -> Result<Vec<SegmentReference>> {
        let resolved = self.resolve()?;
        Ok(resolved
            .media_playlists
            .iter()
            .flat_map(|m| m.segment_references())
            .collect())
    }
}
