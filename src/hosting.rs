//! Hosting tree writer
//!
//! Writes the rendered master and media playlists under an output
//! directory and copies the referenced segment files next to them. All
//! playlists are rendered before anything touches the filesystem.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::task::JoinSet;

use crate::error::{HostingError, PathError, PathErrorReason, Result};
use crate::loader::Loader;
use crate::resolve::normalize;
use crate::serialize::{render_master, render_media};

/// Summary of a written hosting tree
#[derive(Debug, Default, Clone)]
pub struct HostedTree {
    /// Playlist files written, master first
    pub playlists: Vec<PathBuf>,
    /// Segment files copied
    pub segments: Vec<PathBuf>,
    pub bytes_written: u64,
}

/// Write the hosting tree of `loader` into `out_dir`.
///
/// Segment sources are looked up relative to `source_root`, the directory
/// the master playlist's own path is relative to.
pub async fn write_tree(loader: &Loader, source_root: &Path, out_dir: &Path) -> Result<HostedTree> {
    let resolved = loader.resolve()?;

    let mut rendered: Vec<(PathBuf, Bytes)> = Vec::with_capacity(resolved.media_playlists.len() + 1);
    rendered.push((out_dir.join(&resolved.hosting_path), render_master(&resolved)));
    for media in &resolved.media_playlists {
        rendered.push((out_dir.join(&media.hosting_path), render_media(media)));
    }

    let playlist_paths: HashSet<String> = std::iter::once(&resolved.hosting_path)
        .chain(resolved.media_playlists.iter().map(|m| &m.hosting_path))
        .map(|p| normalize(p))
        .collect();

    let mut copies: Vec<(PathBuf, PathBuf)> = Vec::new();
    for reference in resolved.media_playlists.iter().flat_map(|m| m.segment_references()) {
        // A segment copied over a playlist would replace it
        if playlist_paths.contains(&normalize(&reference.hosting_path)) {
            return Err(PathError {
                reference: reference.reference,
                reason: PathErrorReason::Collides,
            }
            .into());
        }
        copies.push((
            source_root.join(&reference.source_path),
            out_dir.join(&reference.hosting_path),
        ));
    }

    let mut tree = HostedTree::default();
    for (path, data) in rendered {
        write_file(&path, &data).await?;
        tracing::info!("Wrote playlist {} ({} bytes)", path.display(), data.len());
        tree.bytes_written += data.len() as u64;
        tree.playlists.push(path);
    }

    let mut tasks = JoinSet::new();
    for (from, to) in copies {
        tasks.spawn(async move {
            let copied = copy_file(&from, &to).await?;
            Ok::<_, HostingError>((to, copied))
        });
    }
    while let Some(joined) = tasks.join_next().await {
        let (path, copied) = joined.map_err(|e| std::io::Error::other(e.to_string()))??;
        tracing::info!("Copied segment {} ({} bytes)", path.display(), copied);
        tree.bytes_written += copied;
        tree.segments.push(path);
    }
    // Completion order varies between runs
    tree.segments.sort();

    Ok(tree)
}

async fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, data).await?;
    Ok(())
}

async fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(from, to).await.map_err(|e| {
        tracing::warn!("Failed to copy segment {}: {}", from.display(), e);
        HostingError::Io(e)
    })
}
