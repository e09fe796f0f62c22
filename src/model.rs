//! Playlist model
//!
//! Immutable value types for a master playlist, its media playlists and
//! their segments, as handed over by an upstream parser.

use serde::{Deserialize, Serialize};

use crate::byterange::{ByteRange, BYTERANGE_TAG};
use crate::tags::format_duration_ms;

/// Container format of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerFormat {
    Ts,
    Fmp4,
}

impl ContainerFormat {
    /// File extension, including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ContainerFormat::Ts => ".ts",
            ContainerFormat::Fmp4 => ".mp4",
        }
    }
}

/// How a player requests segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    /// One file per segment
    SegmentBySegment,
    /// All segments are sub-ranges of one file
    ByteRange,
}

/// One addressable unit of media
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub path: String,
    pub duration_ms: u64,
    pub discontinuity_sequence: u64,
    pub file_extension: String,
    pub container_format: ContainerFormat,
    pub request_type: RequestType,
}

impl Segment {
    /// A discrete segment file
    pub fn new(path: impl Into<String>, duration_ms: u64, format: ContainerFormat) -> Self {
        Self {
            path: path.into(),
            duration_ms,
            discontinuity_sequence: 0,
            file_extension: format.extension().to_string(),
            container_format: format,
            request_type: RequestType::SegmentBySegment,
        }
    }

    /// A sub-range of a shared segment file
    pub fn byte_range(path: impl Into<String>, duration_ms: u64, format: ContainerFormat) -> Self {
        Self {
            request_type: RequestType::ByteRange,
            ..Self::new(path, duration_ms, format)
        }
    }

    pub fn with_discontinuity_sequence(mut self, sequence: u64) -> Self {
        self.discontinuity_sequence = sequence;
        self
    }
}

/// Ordered segments of one stream variant plus its tag lines
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPlaylist {
    pub path: String,
    pub tags: Vec<String>,
    pub segments: Vec<Segment>,
    pub total_duration_ms: u64,
    pub total_discontinuity_count: u64,
}

impl MediaPlaylist {
    pub fn builder(path: impl Into<String>) -> MediaPlaylistBuilder {
        MediaPlaylistBuilder::new(path)
    }

    /// Container format and request type of the first segment
    pub fn mode(&self) -> Option<(ContainerFormat, RequestType)> {
        self.segments
            .first()
            .map(|s| (s.container_format, s.request_type))
    }

    pub fn is_byte_range(&self) -> bool {
        matches!(self.mode(), Some((_, RequestType::ByteRange)))
    }
}

/// Top-level playlist enumerating the stream variants
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterPlaylist {
    pub path: String,
    pub tags: Vec<String>,
    pub media_playlists: Vec<MediaPlaylist>,
}

/// Builds a self-consistent [`MediaPlaylist`] from its segments,
/// generating the VOD tag lines and the derived totals.
#[derive(Debug, Clone)]
pub struct MediaPlaylistBuilder {
    path: String,
    version: u32,
    segments: Vec<(Segment, Option<ByteRange>)>,
}

impl MediaPlaylistBuilder {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: 4,
            segments: Vec::new(),
        }
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn segment(mut self, segment: Segment) -> Self {
        self.segments.push((segment, None));
        self
    }

    pub fn byte_range_segment(mut self, segment: Segment, range: ByteRange) -> Self {
        self.segments.push((segment, Some(range)));
        self
    }

    pub fn build(self) -> MediaPlaylist {
        let max_ms = self
            .segments
            .iter()
            .map(|(s, _)| s.duration_ms)
            .max()
            .unwrap_or(0);
        // Rounded up to whole seconds
        let target_duration = max_ms.div_ceil(1000);
        let first_sequence = self
            .segments
            .first()
            .map(|(s, _)| s.discontinuity_sequence)
            .unwrap_or(0);

        let mut tags = vec![
            "#EXTM3U".to_string(),
            format!("#EXT-X-VERSION:{}", self.version),
            "#EXT-X-PLAYLIST-TYPE:VOD".to_string(),
            "#EXT-X-INDEPENDENT-SEGMENTS".to_string(),
            format!("#EXT-X-TARGETDURATION:{}", target_duration),
            "#EXT-X-MEDIA-SEQUENCE:0".to_string(),
            format!("#EXT-X-DISCONTINUITY-SEQUENCE:{}", first_sequence),
        ];

        let mut total_duration_ms = 0;
        let mut discontinuities = 0;
        let mut previous = first_sequence;
        for (segment, range) in &self.segments {
            if segment.discontinuity_sequence > previous {
                tags.push("#EXT-X-DISCONTINUITY".to_string());
                discontinuities += 1;
            }
            previous = segment.discontinuity_sequence;
            total_duration_ms += segment.duration_ms;

            tags.push(format!("#EXTINF:{},", format_duration_ms(segment.duration_ms)));
            if let Some(range) = range {
                tags.push(format!("{}{}", BYTERANGE_TAG, range));
            }
        }
        tags.push("#EXT-X-ENDLIST".to_string());

        MediaPlaylist {
            path: self.path,
            tags,
            segments: self.segments.into_iter().map(|(s, _)| s).collect(),
            total_duration_ms,
            total_discontinuity_count: discontinuities,
        }
    }
}
