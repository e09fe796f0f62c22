//! Structural validation of the playlist model
//!
//! Every check runs; the returned error carries all violations found.

use crate::byterange::{ByteRange, ResolvedByteRange};
use crate::error::{ValidationError, Violation, ViolationKind};
use crate::model::{MasterPlaylist, MediaPlaylist, RequestType};
use crate::tags::{self, TagKind};

const DISCONTINUITY_SEQUENCE_TAG: &str = "#EXT-X-DISCONTINUITY-SEQUENCE:";

/// Entity path of the master playlist in violations
pub const MASTER_ENTITY: &str = "master";

pub fn media_entity(index: usize) -> String {
    format!("media[{}]", index)
}

fn segment_entity(index: usize, segment: usize) -> String {
    format!("media[{}]/segment[{}]", index, segment)
}

/// Validate a master playlist and every media playlist it holds
pub fn validate(master: &MasterPlaylist) -> Result<(), ValidationError> {
    let mut violations = Vec::new();

    let stream_infs = tags::count(&master.tags, TagKind::StreamInf);
    if master.media_playlists.is_empty() {
        violations.push(Violation {
            entity: MASTER_ENTITY.to_string(),
            kind: ViolationKind::NoVariants,
        });
    }
    if stream_infs != master.media_playlists.len() {
        violations.push(Violation {
            entity: MASTER_ENTITY.to_string(),
            kind: ViolationKind::StreamInfCountMismatch {
                tags: stream_infs,
                playlists: master.media_playlists.len(),
            },
        });
    }

    for (index, media) in master.media_playlists.iter().enumerate() {
        check_media(index, media, &mut violations);
    }

    finish(&master.path, violations)
}

/// Validate a single media playlist at position `index`
pub fn validate_media(index: usize, media: &MediaPlaylist) -> Result<(), ValidationError> {
    let mut violations = Vec::new();
    check_media(index, media, &mut violations);
    finish(&media.path, violations)
}

fn finish(path: &str, violations: Vec<Violation>) -> Result<(), ValidationError> {
    if violations.is_empty() {
        return Ok(());
    }
    tracing::warn!(
        "Playlist {} failed validation with {} violation(s)",
        path,
        violations.len()
    );
    for v in &violations {
        tracing::debug!("  {}", v);
    }
    Err(ValidationError::new(violations))
}

fn check_media(index: usize, media: &MediaPlaylist, out: &mut Vec<Violation>) {
    let entity = media_entity(index);
    let mut push = |entity: String, kind: ViolationKind| out.push(Violation { entity, kind });

    let extinfs = tags::count(&media.tags, TagKind::Inf);
    if extinfs != media.segments.len() {
        push(
            entity.clone(),
            ViolationKind::ExtinfCountMismatch {
                tags: extinfs,
                segments: media.segments.len(),
            },
        );
    }

    // Uniform container format and request type
    if let Some((format, request_type)) = media.mode() {
        if media.segments.iter().any(|s| s.container_format != format) {
            push(entity.clone(), ViolationKind::MixedContainerFormat);
        }
        if media.segments.iter().any(|s| s.request_type != request_type) {
            push(entity.clone(), ViolationKind::MixedRequestType);
        }
    }

    for (i, segment) in media.segments.iter().enumerate() {
        let expected = segment.container_format.extension();
        if segment.file_extension != expected {
            push(
                segment_entity(index, i),
                ViolationKind::FileExtensionMismatch {
                    expected: expected.to_string(),
                    found: segment.file_extension.clone(),
                },
            );
        }
    }

    // One EXT-X-BYTERANGE per byte-range segment, none otherwise
    let byte_range_tags = tags::count(&media.tags, TagKind::ByteRange);
    let byte_range_segments = media
        .segments
        .iter()
        .filter(|s| s.request_type == RequestType::ByteRange)
        .count();
    if byte_range_tags != byte_range_segments {
        push(
            entity.clone(),
            ViolationKind::ByteRangeCountMismatch {
                tags: byte_range_tags,
                expected: byte_range_segments,
            },
        );
    }

    if media.is_byte_range() {
        for segment in unpaired_byte_ranges(&media.tags) {
            push(entity.clone(), ViolationKind::UnpairedByteRange { segment });
        }
    }

    if let Some(first) = media.segments.first() {
        if first.request_type == RequestType::ByteRange {
            for (i, segment) in media.segments.iter().enumerate().skip(1) {
                if segment.path != first.path {
                    push(
                        segment_entity(index, i),
                        ViolationKind::ByteRangePathMismatch {
                            expected: first.path.clone(),
                            found: segment.path.clone(),
                        },
                    );
                }
            }
        }
    }

    if let Err(kinds) = resolved_byte_ranges(media) {
        for kind in kinds {
            push(entity.clone(), kind);
        }
    }

    let computed: u64 = media
        .segments
        .iter()
        .fold(0u64, |acc, s| acc.saturating_add(s.duration_ms));
    if computed != media.total_duration_ms {
        push(
            entity.clone(),
            ViolationKind::TotalDurationMismatch {
                declared: media.total_duration_ms,
                computed,
            },
        );
    }

    let mut crossings = 0u64;
    for (i, pair) in media.segments.windows(2).enumerate() {
        let (previous, current) = (pair[0].discontinuity_sequence, pair[1].discontinuity_sequence);
        if current < previous {
            push(
                segment_entity(index, i + 1),
                ViolationKind::DiscontinuitySequenceDecreased { previous, current },
            );
        } else if current > previous {
            crossings += 1;
        }
    }
    if crossings != media.total_discontinuity_count {
        push(
            entity.clone(),
            ViolationKind::DiscontinuityCountMismatch {
                declared: media.total_discontinuity_count,
                computed: crossings,
            },
        );
    }

    for line in media
        .tags
        .iter()
        .filter(|t| TagKind::of(t) == TagKind::DiscontinuitySequence)
    {
        let declared = line
            .trim_end()
            .strip_prefix(DISCONTINUITY_SEQUENCE_TAG)
            .and_then(|v| v.trim().parse::<u64>().ok());
        match (declared, media.segments.first()) {
            (None, _) => push(
                entity.clone(),
                ViolationKind::MalformedDiscontinuitySequence { line: line.clone() },
            ),
            (Some(declared), Some(first)) if declared != first.discontinuity_sequence => push(
                entity.clone(),
                ViolationKind::DiscontinuitySequenceTagMismatch {
                    declared,
                    first: first.discontinuity_sequence,
                },
            ),
            _ => {}
        }
    }

    let discontinuity_tags = tags::count(&media.tags, TagKind::Discontinuity);
    if discontinuity_tags as u64 != media.total_discontinuity_count {
        push(
            entity,
            ViolationKind::DiscontinuityTagMismatch {
                tags: discontinuity_tags,
                declared: media.total_discontinuity_count,
            },
        );
    }
}

/// Segments of a byte-range playlist whose EXTINF and EXT-X-BYTERANGE
/// lines do not sit next to each other.
///
/// Tags are walked in order. A segment is complete once it has one EXTINF
/// and one EXT-X-BYTERANGE, in either order, with no other tag between
/// them.
fn unpaired_byte_ranges(tags: &[String]) -> Vec<usize> {
    let mut unpaired = Vec::new();
    let mut segment = 0usize;
    // EXTINF waiting for its range
    let mut inf = false;
    // EXT-X-BYTERANGE waiting for its EXTINF
    let mut range = false;

    for tag in tags {
        match TagKind::of(tag) {
            TagKind::Inf => {
                if inf {
                    unpaired.push(segment);
                    segment += 1;
                }
                if range {
                    range = false;
                    inf = false;
                    segment += 1;
                } else {
                    inf = true;
                }
            }
            TagKind::ByteRange => {
                if inf {
                    inf = false;
                    segment += 1;
                } else if range {
                    unpaired.push(segment);
                } else {
                    range = true;
                }
            }
            _ => {
                if inf || range {
                    unpaired.push(segment);
                }
                if inf {
                    segment += 1;
                }
                inf = false;
                range = false;
            }
        }
    }
    if inf || range {
        unpaired.push(segment);
    }
    unpaired.dedup();
    unpaired
}

/// Parse the playlist's EXT-X-BYTERANGE tags in order and fill in missing
/// offsets. Sub-ranges must not overlap one another.
pub fn resolved_byte_ranges(
    media: &MediaPlaylist,
) -> Result<Vec<ResolvedByteRange>, Vec<ViolationKind>> {
    let mut problems = Vec::new();
    let mut ranges: Vec<ResolvedByteRange> = Vec::new();

    for line in media
        .tags
        .iter()
        .filter(|t| TagKind::of(t) == TagKind::ByteRange)
    {
        let Some(range) = ByteRange::from_tag(line.trim_end()) else {
            problems.push(ViolationKind::MalformedByteRange { line: line.clone() });
            continue;
        };
        if range.length == 0 {
            problems.push(ViolationKind::EmptyByteRange { line: line.clone() });
            continue;
        }
        match range.resolve(ranges.last().copied()) {
            Some(resolved) => ranges.push(resolved),
            None => problems.push(ViolationKind::MissingByteRangeOffset),
        }
    }
    if !problems.is_empty() {
        return Err(problems);
    }

    let mut sorted = ranges.clone();
    sorted.sort_by_key(|r| (r.offset, r.length));
    // Each range is checked against the furthest end seen so far
    let mut covered = 0u64;
    for (i, range) in sorted.iter().enumerate() {
        if i > 0 && range.offset < covered {
            problems.push(ViolationKind::OverlappingByteRange {
                range: range.to_string(),
            });
        }
        covered = covered.max(range.end());
    }

    if problems.is_empty() {
        Ok(ranges)
    } else {
        Err(problems)
    }
}
