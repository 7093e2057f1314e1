//! Concat playlist writer.
//!
//! Produces the text file consumed by ffmpeg's concat demuxer: one
//! `file '<path>'` line per rendered segment, each followed by a line for
//! the shared silence gap.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::models::RenderedSegment;
use crate::orchestrator::{StepError, StepResult};

/// Format one playlist line for `path`.
///
/// Single quotes are closed, escaped and reopened, as the concat demuxer
/// expects.
pub fn playlist_entry(path: &Path) -> String {
    let escaped = path.display().to_string().replace('\'', r"'\''");
    format!("file '{}'", escaped)
}

/// Write the playlist for `segments` to `playlist_path`.
///
/// Segments are written in the order given, one write per segment. With
/// `gap_path` set, every segment is followed by the gap. The file is
/// flushed and synced before returning.
pub fn write_playlist(
    playlist_path: &Path,
    segments: &[RenderedSegment],
    gap_path: Option<&Path>,
) -> StepResult<()> {
    write_entries(playlist_path, segments, gap_path).map_err(|source| StepError::PlaylistWrite {
        path: playlist_path.to_path_buf(),
        source,
    })
}

fn write_entries(
    playlist_path: &Path,
    segments: &[RenderedSegment],
    gap_path: Option<&Path>,
) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(playlist_path)?);
    let gap_entry = gap_path.map(playlist_entry);

    for segment in segments {
        let mut block = playlist_entry(&segment.file_path);
        block.push('\n');
        if let Some(ref gap) = gap_entry {
            block.push_str(gap);
            block.push('\n');
        }
        writer.write_all(block.as_bytes())?;
    }

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}
