use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{OffsetDateTime, format_description};

use crate::state::{
    FeatureLayer, FunctionCall, FunctionId, Observation, PlayerCounters, SelectedUnit, StepType,
};

/// Indices into the host's player counter vector
const PLAYER_SUPPLY_USED: usize = 3;
const PLAYER_SUPPLY_MAX: usize = 4;
const PLAYER_ARMY_SUPPLY: usize = 5;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("host connection failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed observation frame on line {line}: {source}")]
    Frame {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("layer {name} has {actual} values, expected {width}x{height}")]
    LayerSize {
        name: &'static str,
        width: usize,
        height: usize,
        actual: usize,
    },
    #[error("failed to encode command: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<i32>,
}

impl LayerFrame {
    fn to_layer(&self, name: &'static str) -> Result<FeatureLayer, BridgeError> {
        FeatureLayer::from_data(self.width, self.height, self.data.clone()).ok_or(
            BridgeError::LayerSize {
                name,
                width: self.width,
                height: self.height,
                actual: self.data.len(),
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenFrame {
    pub unit_type: LayerFrame,
    pub player_relative: LayerFrame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimapFrame {
    pub player_relative: LayerFrame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    First,
    #[default]
    Mid,
    Last,
}

/// One observation as sent by the host, one JSON document per line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationFrame {
    #[serde(default)]
    pub step_type: StepKind,
    #[serde(default)]
    pub reward: f64,
    pub screen: ScreenFrame,
    pub minimap: MinimapFrame,
    #[serde(default)]
    pub player: Vec<i32>,
    #[serde(default)]
    pub available_actions: Vec<String>,
    #[serde(default)]
    pub single_select: Vec<Vec<i32>>,
    #[serde(default)]
    pub multi_select: Vec<Vec<i32>>,
}

impl ObservationFrame {
    pub fn to_observation(&self) -> Result<Observation, BridgeError> {
        let step_type = match self.step_type {
            StepKind::First => StepType::First,
            StepKind::Mid => StepType::Mid,
            StepKind::Last => StepType::Last,
        };

        let counter = |index: usize| self.player.get(index).copied().unwrap_or(0);
        let player = PlayerCounters {
            supply_used: counter(PLAYER_SUPPLY_USED),
            supply_max: counter(PLAYER_SUPPLY_MAX),
            army_supply: counter(PLAYER_ARMY_SUPPLY),
        };

        // Functions this build does not know about cannot be issued anyway
        let available_actions: HashSet<FunctionId> = self
            .available_actions
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect();

        Ok(Observation {
            step_type,
            reward: self.reward,
            screen_unit_type: self.screen.unit_type.to_layer("screen.unit_type")?,
            screen_player_relative: self
                .screen
                .player_relative
                .to_layer("screen.player_relative")?,
            minimap_player_relative: self
                .minimap
                .player_relative
                .to_layer("minimap.player_relative")?,
            player,
            available_actions,
            single_select: selected_units(&self.single_select),
            multi_select: selected_units(&self.multi_select),
        })
    }
}

fn selected_units(rows: &[Vec<i32>]) -> Vec<SelectedUnit> {
    rows.iter()
        .filter_map(|row| row.first())
        .map(|&unit_type| SelectedUnit { unit_type })
        .collect()
}

/// JSON-lines connection to the host driving the episodes
pub struct HostConnection<R, W> {
    reader: R,
    writer: W,
    line: usize,
    replay_file: Option<ReplayFile>,
}

impl<R: BufRead, W: Write> HostConnection<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: 0,
            replay_file: None,
        }
    }

    /// Record every frame and command under `replays_folder`
    pub fn with_replays(mut self, replays_folder: &Path) -> Result<Self, BridgeError> {
        self.replay_file = Some(ReplayFile::new(replays_folder)?);
        Ok(self)
    }

    /// Next frame, or None once the host closes its end
    pub fn next_frame(&mut self) -> Result<Option<ObservationFrame>, BridgeError> {
        let mut buffer = String::new();
        loop {
            buffer.clear();
            if self.reader.read_line(&mut buffer)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            if buffer.trim().is_empty() {
                continue;
            }

            let frame = serde_json::from_str(buffer.trim()).map_err(|source| BridgeError::Frame {
                line: self.line,
                source,
            })?;
            return Ok(Some(frame));
        }
    }

    pub fn send(&mut self, frame: &ObservationFrame, command: &FunctionCall) -> Result<(), BridgeError> {
        serde_json::to_writer(&mut self.writer, command).map_err(BridgeError::Encode)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        if let Some(ref mut replay_file) = self.replay_file {
            replay_file.append(frame, command)?;
        }
        Ok(())
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[derive(Serialize)]
struct ReplayEntry<'a> {
    observation: &'a ObservationFrame,
    command: &'a FunctionCall,
}

struct ReplayFile {
    path: PathBuf,
    file: BufWriter<File>,
}

impl ReplayFile {
    fn new(replays_folder: &Path) -> Result<Self, BridgeError> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let date_time_str = format_description::parse("[year][month][day]-[hour][minute][second]")
            .ok()
            .and_then(|format| now.format(&format).ok())
            .unwrap_or_else(|| now.unix_timestamp().to_string());

        let path = replays_folder.join(format!("scbot - {}.jsonl", date_time_str));
        if !replays_folder.exists() {
            std::fs::create_dir_all(replays_folder)?;
        }

        let file = BufWriter::new(File::create(&path)?);
        tracing::info!("Recording replay to {}", path.display());
        Ok(Self { path, file })
    }

    fn append(&mut self, frame: &ObservationFrame, command: &FunctionCall) -> Result<(), BridgeError> {
        let entry = ReplayEntry {
            observation: frame,
            command,
        };
        serde_json::to_writer(&mut self.file, &entry).map_err(BridgeError::Encode)?;
        self.file.write_all(b"\n")?;
        self.file.flush()?;
        Ok(())
    }
}

impl Drop for ReplayFile {
    fn drop(&mut self) {
        if let Err(e) = self.file.flush() {
            tracing::warn!("Failed to flush replay {}: {}", self.path.display(), e);
        }
    }
}
