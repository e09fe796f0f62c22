//! M3U8 serializer
//!
//! Authored tag lines are the source of truth for formatting and are
//! emitted verbatim. The serializer only inserts reference lines: media
//! playlist references into the master playlist, segment paths into a
//! media playlist.

use bytes::Bytes;

use crate::model::RequestType;
use crate::resolve::{ResolvedMasterPlaylist, ResolvedMediaPlaylist};
use crate::tags::TagKind;

/// Render a resolved master playlist.
///
/// Each `#EXT-X-STREAM-INF` line is followed by the reference of the media
/// playlist at the same position.
pub fn render_master(resolved: &ResolvedMasterPlaylist<'_>) -> Bytes {
    let mut output = String::new();
    let mut references = resolved.media_playlists.iter().map(|m| m.reference.as_str());

    for tag in &resolved.playlist.tags {
        push_line(&mut output, tag);
        if TagKind::of(tag) == TagKind::StreamInf {
            if let Some(reference) = references.next() {
                push_line(&mut output, reference);
            }
        }
    }
    for reference in references {
        push_line(&mut output, reference);
    }

    tracing::debug!(
        "Rendered master playlist {} ({} bytes)",
        resolved.hosting_path,
        output.len()
    );
    Bytes::from(output)
}

/// Render a resolved media playlist.
///
/// A segment's path follows its `#EXTINF` line, or its `#EXT-X-BYTERANGE`
/// line when that comes later, and precedes any other tag.
pub fn render_media(resolved: &ResolvedMediaPlaylist<'_>) -> Bytes {
    let playlist = resolved.playlist;
    let byte_range = playlist
        .mode()
        .map(|(_, request_type)| request_type == RequestType::ByteRange)
        .unwrap_or(false);

    let mut output = String::new();
    let mut segments = playlist.segments.iter();
    // EXTINF seen, URI not yet written
    let mut open = false;
    // EXT-X-BYTERANGE seen for the current segment
    let mut ranged = false;

    let mut flush = |output: &mut String, open: &mut bool, ranged: &mut bool| {
        if *open {
            if let Some(segment) = segments.next() {
                push_line(output, &segment.path);
            }
        }
        *open = false;
        *ranged = false;
    };

    for tag in &playlist.tags {
        match TagKind::of(tag) {
            TagKind::Inf => {
                if open {
                    flush(&mut output, &mut open, &mut ranged);
                }
                push_line(&mut output, tag);
                open = true;
            }
            TagKind::ByteRange if byte_range => {
                if open && ranged {
                    flush(&mut output, &mut open, &mut ranged);
                }
                push_line(&mut output, tag);
                ranged = true;
            }
            _ => {
                if open {
                    flush(&mut output, &mut open, &mut ranged);
                }
                push_line(&mut output, tag);
            }
        }
    }
    if open {
        flush(&mut output, &mut open, &mut ranged);
    }

    tracing::debug!(
        "Rendered media playlist {} ({} segments, {} bytes)",
        resolved.hosting_path,
        playlist.segments.len(),
        output.len()
    );
    Bytes::from(output)
}

fn push_line(output: &mut String, line: &str) {
    output.push_str(line);
    output.push('\n');
}
