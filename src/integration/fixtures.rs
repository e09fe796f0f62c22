//! Test fixtures for integration tests
//!
//! Complete master playlists as an upstream parser would hand them over.

use crate::model::{ContainerFormat, MasterPlaylist, MediaPlaylist, RequestType, Segment};

pub const STREAM_INF: &str = "#EXT-X-STREAM-INF:AVERAGE-BANDWIDTH=2231539,BANDWIDTH=2984657,CODECS=\"avc1.64001F,mp4a.40.2\",RESOLUTION=1280x720";

fn lines(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

fn master_tags() -> Vec<String> {
    lines(&["#EXTM3U", "#EXT-X-VERSION:4", STREAM_INF])
}

const HEADER: [&str; 7] = [
    "#EXTM3U",
    "#EXT-X-VERSION:4",
    "#EXT-X-PLAYLIST-TYPE:VOD",
    "#EXT-X-INDEPENDENT-SEGMENTS",
    "#EXT-X-TARGETDURATION:5",
    "#EXT-X-MEDIA-SEQUENCE:0",
    "#EXT-X-DISCONTINUITY-SEQUENCE:0",
];

fn segment(
    path: &str,
    duration_ms: u64,
    format: ContainerFormat,
    request_type: RequestType,
) -> Segment {
    Segment {
        path: path.to_string(),
        duration_ms,
        discontinuity_sequence: 0,
        file_extension: format.extension().to_string(),
        container_format: format,
        request_type,
    }
}

fn segment_media(format: ContainerFormat) -> MediaPlaylist {
    let ext = format.extension();
    let mut tags = lines(&HEADER);
    tags.extend(lines(&["#EXTINF:3,", "#EXTINF:4,", "#EXTINF:5,", "#EXT-X-ENDLIST"]));

    MediaPlaylist {
        path: "testMediaPlaylist.m3u8".to_string(),
        tags,
        segments: [3000, 4000, 5000]
            .iter()
            .enumerate()
            .map(|(i, ms)| {
                segment(
                    &format!("segment-{}{}", i, ext),
                    *ms,
                    format,
                    RequestType::SegmentBySegment,
                )
            })
            .collect(),
        total_duration_ms: 12 * 1000,
        total_discontinuity_count: 0,
    }
}

/// One variant, three MPEG-TS segment files
pub fn ts_master_playlist() -> MasterPlaylist {
    MasterPlaylist {
        path: "testMasterPlaylist.m3u8".to_string(),
        tags: master_tags(),
        media_playlists: vec![segment_media(ContainerFormat::Ts)],
    }
}

/// One variant, three fMP4 segment files
pub fn fmp4_master_playlist() -> MasterPlaylist {
    MasterPlaylist {
        path: "testMasterPlaylist.m3u8".to_string(),
        tags: master_tags(),
        media_playlists: vec![segment_media(ContainerFormat::Fmp4)],
    }
}

/// One variant, three sub-ranges of one fMP4 file.
///
/// `total_duration_ms` is the sum of the listed segments.
pub fn byte_range_master_playlist() -> MasterPlaylist {
    let mut tags = lines(&HEADER);
    tags.extend(lines(&[
        "#EXTINF:3,",
        "#EXT-X-BYTERANGE:300000@100",
        "#EXTINF:4,",
        "#EXT-X-BYTERANGE:400000@300100",
        "#EXTINF:5,",
        "#EXT-X-BYTERANGE:500000@700100",
        "#EXT-X-ENDLIST",
    ]));
    let segments = [3000, 4000, 5000]
        .iter()
        .map(|ms| {
            segment(
                "segment-0.mp4",
                *ms,
                ContainerFormat::Fmp4,
                RequestType::ByteRange,
            )
        })
        .collect();

    MasterPlaylist {
        path: "testMasterPlaylist.m3u8".to_string(),
        tags: master_tags(),
        media_playlists: vec![MediaPlaylist {
            path: "testMediaPlaylist.m3u8".to_string(),
            tags,
            segments,
            total_duration_ms: 12 * 1000,
            total_discontinuity_count: 0,
        }],
    }
}

/// The byte-range fixture with a declared total of 36 seconds, which does
/// not match its three listed segments
pub fn byte_range_master_playlist_inconsistent_total() -> MasterPlaylist {
    let mut master = byte_range_master_playlist();
    master.media_playlists[0].total_duration_ms = 36 * 1000;
    master
}

/// Two variants: MPEG-TS segments and byte-range fMP4
pub fn multi_variant_master_playlist() -> MasterPlaylist {
    let mut master = ts_master_playlist();
    let byte_range = byte_range_master_playlist();
    master.tags.push(
        "#EXT-X-STREAM-INF:AVERAGE-BANDWIDTH=1115769,BANDWIDTH=1492328,CODECS=\"avc1.64001F,mp4a.40.2\",RESOLUTION=640x360"
            .to_string(),
    );
    master
        .media_playlists
        .extend(byte_range.media_playlists);
    master
}
