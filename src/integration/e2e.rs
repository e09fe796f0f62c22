//! End-to-end integration tests

use std::sync::Arc;

use crate::cache::{CachedLoader, PlaylistCache};
use crate::error::{HostingError, IndexError, ViolationKind};
use crate::integration::fixtures::*;
use crate::loader::Loader;
use crate::model::MasterPlaylist;
use crate::resolve::Resolver;

fn text(bytes: bytes::Bytes) -> String {
    String::from_utf8(bytes.to_vec()).expect("playlist output is UTF-8")
}

fn expected_master() -> String {
    format!("#EXTM3U\n#EXT-X-VERSION:4\n{}\n0/playlist.m3u8\n", STREAM_INF)
}

#[test]
fn test_load_ts_master_playlist() {
    let loader = Loader::new(ts_master_playlist());
    let actual = loader.load_master_playlist().unwrap();

    assert_eq!(
        text(actual),
        "#EXTM3U\n\
         #EXT-X-VERSION:4\n\
         #EXT-X-STREAM-INF:AVERAGE-BANDWIDTH=2231539,BANDWIDTH=2984657,CODECS=\"avc1.64001F,mp4a.40.2\",RESOLUTION=1280x720\n\
         0/playlist.m3u8\n"
    );
}

#[test]
fn test_load_fmp4_master_playlist() {
    let loader = Loader::new(fmp4_master_playlist());
    assert_eq!(text(loader.load_master_playlist().unwrap()), expected_master());
}

#[test]
fn test_load_byte_range_master_playlist() {
    let loader = Loader::new(byte_range_master_playlist());
    assert_eq!(text(loader.load_master_playlist().unwrap()), expected_master());
}

#[test]
fn test_load_ts_media_playlist() {
    let loader = Loader::new(ts_master_playlist());
    let actual = text(loader.load_media_playlist(0).unwrap());

    assert_eq!(
        actual,
        "#EXTM3U\n\
         #EXT-X-VERSION:4\n\
         #EXT-X-PLAYLIST-TYPE:VOD\n\
         #EXT-X-INDEPENDENT-SEGMENTS\n\
         #EXT-X-TARGETDURATION:5\n\
         #EXT-X-MEDIA-SEQUENCE:0\n\
         #EXT-X-DISCONTINUITY-SEQUENCE:0\n\
         #EXTINF:3,\n\
         segment-0.ts\n\
         #EXTINF:4,\n\
         segment-1.ts\n\
         #EXTINF:5,\n\
         segment-2.ts\n\
         #EXT-X-ENDLIST\n"
    );
}

#[test]
fn test_load_byte_range_media_playlist() {
    let loader = Loader::new(byte_range_master_playlist());
    let actual = text(loader.load_media_playlist(0).unwrap());
    let body: Vec<&str> = actual.lines().skip(7).collect();

    assert_eq!(
        body,
        vec![
            "#EXTINF:3,",
            "#EXT-X-BYTERANGE:300000@100",
            "segment-0.mp4",
            "#EXTINF:4,",
            "#EXT-X-BYTERANGE:400000@300100",
            "segment-0.mp4",
            "#EXTINF:5,",
            "#EXT-X-BYTERANGE:500000@700100",
            "segment-0.mp4",
            "#EXT-X-ENDLIST",
        ]
    );
}

#[test]
fn test_byte_range_inconsistent_total_rejected() {
    let loader = Loader::new(byte_range_master_playlist_inconsistent_total());
    let err = loader.load_master_playlist().unwrap_err();

    let err = match err {
        HostingError::Validation(e) => e,
        other => panic!("expected a validation error, got {other}"),
    };
    assert_eq!(err.violations.len(), 1);
    assert_eq!(err.violations[0].entity, "media[0]");
    assert_eq!(
        err.violations[0].kind,
        ViolationKind::TotalDurationMismatch {
            declared: 36000,
            computed: 12000
        }
    );
}

#[test]
fn test_fixture_totals() {
    for master in [
        ts_master_playlist(),
        fmp4_master_playlist(),
        byte_range_master_playlist(),
    ] {
        for media in &master.media_playlists {
            let sum: u64 = media.segments.iter().map(|s| s.duration_ms).sum();
            assert_eq!(media.total_duration_ms, sum);
            assert_eq!(media.total_discontinuity_count, 0);
        }
    }
}

#[test]
fn test_multi_variant() {
    let loader = Loader::new(multi_variant_master_playlist());
    let master = text(loader.load_master_playlist().unwrap());
    let lines: Vec<&str> = master.lines().collect();

    assert_eq!(lines.len(), 6);
    assert_eq!(lines[3], "0/playlist.m3u8");
    assert!(lines[4].ends_with("RESOLUTION=640x360"));
    assert_eq!(lines[5], "1/playlist.m3u8");

    assert!(text(loader.load_media_playlist(1).unwrap()).contains("#EXT-X-BYTERANGE:400000@300100"));
}

#[test]
fn test_segment_references() {
    let loader = Loader::new(multi_variant_master_playlist());
    let refs = loader.segment_references().unwrap();

    let hosted: Vec<&str> = refs.iter().map(|r| r.hosting_path.as_str()).collect();
    assert_eq!(
        hosted,
        vec!["0/segment-0.ts", "0/segment-1.ts", "0/segment-2.ts", "1/segment-0.mp4"]
    );
    assert_eq!(refs[3].byte_ranges.len(), 3);
    assert_eq!(refs[3].byte_ranges[2].end(), 1200100);
}

#[test]
fn test_index_errors() {
    let loader = Loader::new(ts_master_playlist());
    for index in [1, 2, usize::MAX] {
        match loader.load_media_playlist(index) {
            Err(HostingError::Index(e)) => assert_eq!(e, IndexError { index, len: 1 }),
            other => panic!("unexpected result for {index}: {other:?}"),
        }
    }
}

#[test]
fn test_count_mismatch_rejected() {
    let mut master = ts_master_playlist();
    master.media_playlists[0].tags.retain(|t| t != "#EXTINF:5,");
    let loader = Loader::new(master);

    let err = loader.load_media_playlist(0).unwrap_err();
    let err = match err {
        HostingError::Validation(e) => e,
        other => panic!("expected a validation error, got {other}"),
    };
    assert!(err.contains(|k| *k
        == ViolationKind::ExtinfCountMismatch {
            tags: 2,
            segments: 3
        }));
}

#[test]
fn test_mixed_request_type_rejected() {
    let mut master = byte_range_master_playlist();
    let segment = &mut master.media_playlists[0].segments[1];
    segment.request_type = crate::model::RequestType::SegmentBySegment;
    segment.path = "segment-1.mp4".to_string();

    let err = Loader::new(master).load_master_playlist().unwrap_err();
    let err = match err {
        HostingError::Validation(e) => e,
        other => panic!("expected a validation error, got {other}"),
    };
    assert!(err.contains(|k| *k == ViolationKind::MixedRequestType));
    assert!(err.contains(|k| matches!(k, ViolationKind::ByteRangePathMismatch { .. })));
}

#[test]
fn test_path_climbing_rejected() {
    let mut master = ts_master_playlist();
    master.media_playlists[0].segments[2].path = "../../secret.ts".to_string();
    let loader = Loader::new(master);

    assert!(matches!(
        loader.load_master_playlist(),
        Err(HostingError::Path(_))
    ));
}

#[test]
fn test_round_trip_determinism() {
    let loader = Loader::new(multi_variant_master_playlist());
    assert_eq!(
        loader.load_master_playlist().unwrap(),
        loader.load_master_playlist().unwrap()
    );
    assert_eq!(
        loader.load_media_playlist(1).unwrap(),
        loader.load_media_playlist(1).unwrap()
    );

    let other = Loader::new(multi_variant_master_playlist());
    assert_eq!(
        loader.load_master_playlist().unwrap(),
        other.load_master_playlist().unwrap()
    );
}

#[test]
fn test_loader_leaves_input_untouched() {
    let master = ts_master_playlist();
    let loader = Loader::new(master.clone());
    loader.load_master_playlist().unwrap();
    loader.load_media_playlist(0).unwrap();
    assert_eq!(loader.master(), &master);
}

#[test]
fn test_hosting_root() {
    let loader = Loader::with_resolver(ts_master_playlist(), Resolver::new("vod/abc", "playlist.m3u8"));
    // References in the master stay relative to its own directory
    assert_eq!(text(loader.load_master_playlist().unwrap()), expected_master());

    let resolved = loader.resolve().unwrap();
    assert_eq!(resolved.hosting_path, "vod/abc/testMasterPlaylist.m3u8");
    assert_eq!(resolved.media_playlists[0].hosting_path, "vod/abc/0/playlist.m3u8");
}

#[test]
fn test_concurrent_loads() {
    let loader = Arc::new(Loader::new(multi_variant_master_playlist()));
    let expected_master = loader.load_master_playlist().unwrap();
    let expected_media = loader.load_media_playlist(1).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let loader = loader.clone();
            let (expected_master, expected_media) = (&expected_master, &expected_media);
            scope.spawn(move || {
                for _ in 0..50 {
                    assert_eq!(&loader.load_master_playlist().unwrap(), expected_master);
                    assert_eq!(&loader.load_media_playlist(1).unwrap(), expected_media);
                }
            });
        }
    });
}

#[test]
fn test_cached_loader_matches_loader() {
    let cache = Arc::new(PlaylistCache::default());
    let cached = CachedLoader::new(Loader::new(ts_master_playlist()), cache.clone());
    let plain = Loader::new(ts_master_playlist());

    for _ in 0..3 {
        assert_eq!(
            cached.load_master_playlist().unwrap(),
            plain.load_master_playlist().unwrap()
        );
    }
    assert_eq!(cache.len(), 1);
    assert!(cache.contains(&PlaylistCache::master_key(cached.namespace())));
}

#[test]
fn test_cached_loaders_with_shared_master_path() {
    // Every fixture is named testMasterPlaylist.m3u8
    let cache = Arc::new(PlaylistCache::default());
    let ts = CachedLoader::new(Loader::new(ts_master_playlist()), cache.clone());
    let multi = CachedLoader::new(Loader::new(multi_variant_master_playlist()), cache.clone());

    let ts_master = ts.load_master_playlist().unwrap();
    let multi_master = multi.load_master_playlist().unwrap();
    assert_eq!(text(ts_master), expected_master());
    assert_eq!(
        multi_master,
        Loader::new(multi_variant_master_playlist())
            .load_master_playlist()
            .unwrap()
    );
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_unpaired_byte_ranges_rejected() {
    let mut master = byte_range_master_playlist();
    let media = &mut master.media_playlists[0];
    let (ranges, rest): (Vec<String>, Vec<String>) = media
        .tags
        .drain(..)
        .partition(|t| t.starts_with("#EXT-X-BYTERANGE:"));
    media.tags = rest;
    let end = media.tags.len() - 1;
    media.tags.splice(end..end, ranges);

    let err = match Loader::new(master).load_media_playlist(0).unwrap_err() {
        HostingError::Validation(e) => e,
        other => panic!("expected a validation error, got {other}"),
    };
    assert!(err.contains(|k| matches!(k, ViolationKind::UnpairedByteRange { .. })));
}

#[test]
fn test_segment_named_like_media_playlist_rejected() {
    let mut master = ts_master_playlist();
    master.media_playlists[0].segments[1].path = "playlist.m3u8".to_string();

    assert!(matches!(
        Loader::new(master).load_media_playlist(0),
        Err(HostingError::Path(_))
    ));
}

#[test]
fn test_model_from_json() {
    let json = serde_json::to_string(&ts_master_playlist()).unwrap();
    assert!(json.contains("\"mediaPlaylists\""));
    assert!(json.contains("\"totalDurationMs\":12000"));

    let master: MasterPlaylist = serde_json::from_str(&json).unwrap();
    assert_eq!(
        text(Loader::new(master).load_master_playlist().unwrap()),
        expected_master()
    );
}
