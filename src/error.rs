use std::fmt;

use thiserror::Error;

/// Main error type for playlist hosting
#[derive(Error, Debug)]
pub enum HostingError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Playlist model decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// The playlist model violates one or more structural invariants.
///
/// Every check runs before this is returned, so `violations` lists all of
/// them in the order they were found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Whether any violation of the given kind was recorded
    pub fn contains(&self, pred: impl Fn(&ViolationKind) -> bool) -> bool {
        self.violations.iter().any(|v| pred(&v.kind))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.as_slice() {
            [] => write!(f, "no violations"),
            [only] => write!(f, "{}", only),
            [first, rest @ ..] => write!(f, "{} (and {} more)", first, rest.len()),
        }
    }
}

/// A single invariant violation, located by entity path
/// (`master`, `media[0]`, `media[0]/segment[2]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub entity: String,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.entity, self.kind)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    #[error("master playlist has no variants")]
    NoVariants,

    #[error("{tags} EXT-X-STREAM-INF tags for {playlists} media playlists")]
    StreamInfCountMismatch { tags: usize, playlists: usize },

    #[error("{tags} EXTINF tags for {segments} segments")]
    ExtinfCountMismatch { tags: usize, segments: usize },

    #[error("{tags} EXT-X-BYTERANGE tags, expected {expected}")]
    ByteRangeCountMismatch { tags: usize, expected: usize },

    #[error("{tags} EXT-X-DISCONTINUITY tags, declared count is {declared}")]
    DiscontinuityTagMismatch { tags: usize, declared: u64 },

    #[error("segments mix container formats")]
    MixedContainerFormat,

    #[error("segments mix request types")]
    MixedRequestType,

    #[error("file extension {found:?} does not match container format, expected {expected:?}")]
    FileExtensionMismatch { expected: String, found: String },

    #[error("declared total duration {declared}ms, segments sum to {computed}ms")]
    TotalDurationMismatch { declared: u64, computed: u64 },

    #[error("declared discontinuity count {declared}, segments cross {computed}")]
    DiscontinuityCountMismatch { declared: u64, computed: u64 },

    #[error("discontinuity sequence decreases from {previous} to {current}")]
    DiscontinuitySequenceDecreased { previous: u64, current: u64 },

    #[error("byte-range segment references {found:?}, playlist file is {expected:?}")]
    ByteRangePathMismatch { expected: String, found: String },

    #[error("malformed EXT-X-BYTERANGE tag {line:?}")]
    MalformedByteRange { line: String },

    #[error("EXT-X-BYTERANGE without offset on the first sub-range")]
    MissingByteRangeOffset,

    #[error("byte range {range} overlaps the previous sub-range")]
    OverlappingByteRange { range: String },

    #[error("zero-length EXT-X-BYTERANGE tag {line:?}")]
    EmptyByteRange { line: String },

    #[error("segment {segment} has no EXTINF and EXT-X-BYTERANGE pair")]
    UnpairedByteRange { segment: usize },

    #[error("EXT-X-DISCONTINUITY-SEQUENCE is {declared}, first segment is in sequence {first}")]
    DiscontinuitySequenceTagMismatch { declared: u64, first: u64 },

    #[error("malformed EXT-X-DISCONTINUITY-SEQUENCE tag {line:?}")]
    MalformedDiscontinuitySequence { line: String },
}

/// Requested media playlist index is outside `[0, len)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("media playlist index {index} out of range (0..{len})")]
pub struct IndexError {
    pub index: usize,
    pub len: usize,
}

/// A reference would leave its owning directory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("reference {reference:?} rejected: {reason}")]
pub struct PathError {
    pub reference: String,
    pub reason: PathErrorReason,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathErrorReason {
    #[error("empty reference")]
    Empty,
    #[error("absolute path")]
    Absolute,
    #[error("URL references are not hosted")]
    Url,
    #[error("climbs above its owning directory")]
    Traversal,
    #[error("collides with a hosted playlist")]
    Collides,
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, HostingError>;
