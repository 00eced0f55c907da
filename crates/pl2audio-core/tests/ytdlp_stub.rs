//! Drives the yt-dlp wrapper against a shell stub standing in for yt-dlp.
//!
//! Kept as a single test: writing and then executing a script while other
//! threads fork can fail with ETXTBSY.

#![cfg(unix)]

use pl2audio_core::error::{FetchError, ResolutionError};
use pl2audio_core::fetch::{Fetcher, YtDlp};
use pl2audio_core::resolver::{ItemRef, PlaylistSource, ViewCount};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

const STUB: &str = r#"#!/bin/sh
dest=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-P" ]; then dest="$a"; fi
  prev="$a"
done
case "$*" in
  *list=PLbroken*)
    echo "ERROR: [youtube:tab] PLbroken: The playlist does not exist." >&2
    exit 1 ;;
  *list=PLslow*)
    exec sleep 10 ;;
  *--flat-playlist*)
    cat <<'JSON'
{"_type": "playlist", "title": "Stub List", "uploader": "Stub Owner", "playlist_count": 3,
 "view_count": "N/A",
 "entries": [
  {"id": "aaa", "url": "https://www.youtube.com/watch?v=aaa", "title": "Alpha"},
  {"id": "ppp", "url": "https://www.youtube.com/watch?v=ppp", "title": "[Private video]"},
  {"id": "bbb", "url": "https://www.youtube.com/watch?v=bbb", "title": "Beta"}
 ]}
JSON
    ;;
  *v=missing*)
    echo "ERROR: [youtube] missing: Video unavailable" >&2
    exit 1 ;;
  *)
    printf 'video-bytes' > "$dest/Stub Title.mp4"
    echo "$dest/Stub Title.mp4" ;;
esac
"#;

fn install_stub(dir: &Path) -> PathBuf {
    let path = dir.join("yt-dlp");
    fs::write(&path, STUB).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn ytdlp_wrapper_against_stub() {
    let bin_dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let ytdlp = YtDlp::new(install_stub(bin_dir.path()));

    // Resolution: metadata, filtering, best-effort view count.
    let playlist = ytdlp.resolve("PLstub").unwrap();
    assert_eq!(playlist.title, "Stub List");
    assert_eq!(playlist.owner, "Stub Owner");
    assert_eq!(playlist.item_count, 3);
    assert_eq!(playlist.view_count, ViewCount::Unavailable);
    let urls: Vec<&str> = playlist.items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "https://www.youtube.com/watch?v=aaa",
            "https://www.youtube.com/watch?v=bbb"
        ]
    );

    // Upstream rejection carries the diagnostic text.
    match ytdlp.resolve("PLbroken").unwrap_err() {
        ResolutionError::Upstream { diagnostic, .. } => {
            assert!(diagnostic.contains("does not exist"), "{diagnostic}")
        }
        other => panic!("unexpected {other}"),
    }

    // Fetch writes into the destination and reports the final path.
    let video = ytdlp
        .fetch(&ItemRef::new("https://www.youtube.com/watch?v=aaa"), out.path())
        .unwrap();
    assert_eq!(video, out.path().join("Stub Title.mp4"));
    assert_eq!(fs::read(&video).unwrap(), b"video-bytes");

    // Unavailable item is an upstream fetch error attributed to the item.
    let err = ytdlp
        .fetch(&ItemRef::new("https://www.youtube.com/watch?v=missing"), out.path())
        .unwrap_err();
    assert_eq!(err.item(), "https://www.youtube.com/watch?v=missing");
    assert!(matches!(err, FetchError::Upstream { .. }));
    assert!(err.to_string().contains("Video unavailable"));

    // A bounded listing surfaces as a timeout.
    let slow = ytdlp
        .clone()
        .with_resolve_timeout(Some(Duration::from_millis(300)));
    let err = slow.resolve("PLslow").unwrap_err();
    assert!(err.to_string().contains("timed out"), "{err}");
}
