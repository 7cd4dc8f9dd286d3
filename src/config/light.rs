use crate::world::chunk_coord::Face;
use crate::world::field::LIGHT_LEVELS;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LightTableError {
    #[error("Failed to read light table: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse light table: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Converts discrete light levels to display intensity, plus the fixed
/// per-face-orientation ambient factors applied on top
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightTable {
    /// Display scalar per light level, monotonic; level 0 maps to 0
    pub curve: [f32; LIGHT_LEVELS],
    /// Baseline brightness by face orientation, indexed by Face
    pub ambient: [f32; 6],
    /// Average adjacent cells per vertex instead of flat per-face shading
    pub smooth: bool,
}

impl Default for LightTable {
    fn default() -> Self {
        let mut curve = [0.0f32; LIGHT_LEVELS];
        for (level, value) in curve.iter_mut().enumerate().skip(1) {
            *value = 0.8f32.powi((LIGHT_LEVELS - 1 - level) as i32);
        }
        Self {
            curve,
            // -X, +X, -Y (bottom), +Y (top), -Z, +Z
            ambient: [0.8, 0.8, 0.5, 1.0, 0.65, 0.65],
            smooth: true,
        }
    }
}

impl LightTable {
    pub fn curve_at(&self, level: u8) -> f32 {
        self.curve[(level as usize).min(LIGHT_LEVELS - 1)]
    }

    pub fn ambient_for(&self, face: Face) -> f32 {
        self.ambient[face.index()]
    }

    pub fn from_json(text: &str) -> Result<Self, LightTableError> {
        let table: LightTable = serde_json::from_str(text)?;
        if table.curve.windows(2).any(|pair| pair[1] < pair[0]) {
            warn!("light curve is not monotonic, shading will band");
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, LightTableError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
