//! Hosting path resolution
//!
//! Media playlist `i` is hosted at `<i>/<media playlist name>` relative to
//! the master playlist's directory. Segment references stay as authored,
//! relative to their media playlist's directory, and must not climb out of
//! it. Pure string computation, no filesystem access.

use crate::byterange::ResolvedByteRange;
use crate::error::{PathError, PathErrorReason};
use crate::model::{MasterPlaylist, MediaPlaylist};
use crate::validate::resolved_byte_ranges;

/// Default file name of a hosted media playlist
pub const DEFAULT_MEDIA_PLAYLIST_NAME: &str = "playlist.m3u8";

/// A master playlist with every hosting path computed
#[derive(Debug, Clone)]
pub struct ResolvedMasterPlaylist<'a> {
    pub playlist: &'a MasterPlaylist,
    /// Where the master playlist is written, under the hosting root
    pub hosting_path: String,
    pub media_playlists: Vec<ResolvedMediaPlaylist<'a>>,
}

/// A media playlist placed in its index directory
#[derive(Debug, Clone)]
pub struct ResolvedMediaPlaylist<'a> {
    pub index: usize,
    pub playlist: &'a MediaPlaylist,
    /// Reference line written into the master playlist, e.g. `0/playlist.m3u8`
    pub reference: String,
    /// Where the media playlist is written, under the hosting root
    pub hosting_path: String,
    /// Directory the hosted segments are written to
    pub hosting_dir: String,
    /// Directory the authored segment paths are relative to in the source tree
    pub source_dir: String,
}

/// One physical segment file that must be hosted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentReference {
    pub media_index: usize,
    /// Reference line as written in the media playlist
    pub reference: String,
    pub hosting_path: String,
    pub source_path: String,
    /// Sub-ranges served from this file; empty for discrete segments
    pub byte_ranges: Vec<ResolvedByteRange>,
}

/// Computes hosting paths under a root directory
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resolver {
    hosting_root: String,
    media_playlist_name: String,
}

impl Resolver {
    pub fn new(hosting_root: impl Into<String>, media_playlist_name: impl Into<String>) -> Self {
        let hosting_root: String = hosting_root.into();
        Self {
            hosting_root: hosting_root.trim_end_matches('/').to_string(),
            media_playlist_name: media_playlist_name.into(),
        }
    }

    /// Resolve the master playlist and all of its media playlists
    pub fn resolve<'a>(
        &self,
        master: &'a MasterPlaylist,
    ) -> Result<ResolvedMasterPlaylist<'a>, PathError> {
        let media_playlists = master
            .media_playlists
            .iter()
            .enumerate()
            .map(|(index, media)| self.resolve_media(master, index, media))
            .collect::<Result<Vec<_>, _>>()?;

        let hosting_path = join(&self.hosting_root, file_name(&master.path));
        tracing::debug!(
            "Resolved {} -> {} with {} media playlist(s)",
            master.path,
            hosting_path,
            media_playlists.len()
        );

        Ok(ResolvedMasterPlaylist {
            playlist: master,
            hosting_path,
            media_playlists,
        })
    }

    /// Resolve one media playlist of `master` at position `index`
    pub fn resolve_media<'a>(
        &self,
        master: &MasterPlaylist,
        index: usize,
        media: &'a MediaPlaylist,
    ) -> Result<ResolvedMediaPlaylist<'a>, PathError> {
        for segment in &media.segments {
            check_relative(&segment.path)?;
            // Segments share the directory of the hosted media playlist
            if normalize(&segment.path) == normalize(&self.media_playlist_name) {
                return Err(PathError {
                    reference: segment.path.clone(),
                    reason: PathErrorReason::Collides,
                });
            }
        }

        let reference = format!("{}/{}", index, self.media_playlist_name);
        let hosting_dir = join(&self.hosting_root, &index.to_string());
        let source_dir = join(parent_dir(&master.path), parent_dir(&media.path));

        Ok(ResolvedMediaPlaylist {
            index,
            playlist: media,
            hosting_path: join(&self.hosting_root, &reference),
            reference,
            hosting_dir,
            source_dir,
        })
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new("", DEFAULT_MEDIA_PLAYLIST_NAME)
    }
}

/// Resolve `master` under `hosting_root` with the default media playlist name
pub fn resolve<'a>(
    master: &'a MasterPlaylist,
    hosting_root: &str,
) -> Result<ResolvedMasterPlaylist<'a>, PathError> {
    Resolver::new(hosting_root, DEFAULT_MEDIA_PLAYLIST_NAME).resolve(master)
}

impl ResolvedMediaPlaylist<'_> {
    /// Segment files to host, in playback order, one entry per distinct file.
    ///
    /// Byte-range playlists yield a single entry carrying every sub-range.
    pub fn segment_references(&self) -> Vec<SegmentReference> {
        let ranges = if self.playlist.is_byte_range() {
            resolved_byte_ranges(self.playlist).unwrap_or_default()
        } else {
            Vec::new()
        };

        let mut refs: Vec<SegmentReference> = Vec::new();
        for (i, segment) in self.playlist.segments.iter().enumerate() {
            let pos = match refs.iter().position(|r| r.reference == segment.path) {
                Some(pos) => pos,
                None => {
                    refs.push(SegmentReference {
                        media_index: self.index,
                        reference: segment.path.clone(),
                        hosting_path: join(&self.hosting_dir, &segment.path),
                        source_path: join(&self.source_dir, &segment.path),
                        byte_ranges: Vec::new(),
                    });
                    refs.len() - 1
                }
            };
            if let Some(range) = ranges.get(i) {
                refs[pos].byte_ranges.push(*range);
            }
        }
        refs
    }
}

/// Reject references that leave their owning directory
pub fn check_relative(reference: &str) -> Result<(), PathError> {
    let reject = |reason| {
        Err(PathError {
            reference: reference.to_string(),
            reason,
        })
    };

    if reference.trim().is_empty() {
        return reject(PathErrorReason::Empty);
    }
    if reference.contains("://") {
        return reject(PathErrorReason::Url);
    }
    let bytes = reference.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic();
    if reference.starts_with('/') || reference.starts_with('\\') || has_drive {
        return reject(PathErrorReason::Absolute);
    }

    let mut depth = 0usize;
    for component in reference.split(['/', '\\']) {
        match component {
            "" | "." => {}
            ".." => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return reject(PathErrorReason::Traversal),
            },
            _ => depth += 1,
        }
    }
    if depth == 0 {
        // Names the directory itself, not a file in it
        return reject(PathErrorReason::Traversal);
    }
    Ok(())
}

/// Collapse `.`, `..` and repeated separators of a relative path
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split(['/', '\\']) {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            part => parts.push(part),
        }
    }
    parts.join("/")
}

/// Join two relative path fragments with `/`
pub fn join(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        path.to_string()
    } else if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

/// Directory part of a `/`-separated path, empty when there is none
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}
