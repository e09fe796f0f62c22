//! M3U8 tag classification
//!
//! Tag lines are carried verbatim; the rest of the crate only needs to
//! know which tag a line is.

// helper.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).expect("valid regex"))
    }};
}

/// Recognized tag kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Header,
    Version,
    StreamInf,
    PlaylistType,
    IndependentSegments,
    TargetDuration,
    MediaSequence,
    DiscontinuitySequence,
    Inf,
    ByteRange,
    Discontinuity,
    EndList,
    /// Any other `#EXT` tag, or a comment
    Other,
}

impl TagKind {
    /// Classify a tag line by its name
    pub fn of(line: &str) -> TagKind {
        let re = regex!(r"^#(EXT[A-Z0-9-]*)(?::|$)");
        let Some(name) = re.captures(line.trim_end()).and_then(|c| c.get(1)) else {
            return TagKind::Other;
        };
        match name.as_str() {
            "EXTM3U" => TagKind::Header,
            "EXT-X-VERSION" => TagKind::Version,
            "EXT-X-STREAM-INF" => TagKind::StreamInf,
            "EXT-X-PLAYLIST-TYPE" => TagKind::PlaylistType,
            "EXT-X-INDEPENDENT-SEGMENTS" => TagKind::IndependentSegments,
            "EXT-X-TARGETDURATION" => TagKind::TargetDuration,
            "EXT-X-MEDIA-SEQUENCE" => TagKind::MediaSequence,
            "EXT-X-DISCONTINUITY-SEQUENCE" => TagKind::DiscontinuitySequence,
            "EXTINF" => TagKind::Inf,
            "EXT-X-BYTERANGE" => TagKind::ByteRange,
            "EXT-X-DISCONTINUITY" => TagKind::Discontinuity,
            "EXT-X-ENDLIST" => TagKind::EndList,
            _ => TagKind::Other,
        }
    }
}

/// Count the lines of `tags` that are of the given kind
pub fn count(tags: &[String], kind: TagKind) -> usize {
    tags.iter().filter(|t| TagKind::of(t) == kind).count()
}

/// Render a millisecond duration as EXTINF decimal seconds.
///
/// Whole seconds print without a fraction, otherwise up to three
/// decimals with trailing zeros trimmed.
pub fn format_duration_ms(ms: u64) -> String {
    let secs = ms / 1000;
    let frac = ms % 1000;
    if frac == 0 {
        return secs.to_string();
    }
    let s = format!("{}.{:03}", secs, frac);
    s.trim_end_matches('0').to_string()
}
