use crate::world::chunk_coord::Face;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("Failed to read atlas table: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse atlas table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Atlas grid dimension must be at least 1")]
    ZeroGrid,
    #[error("Block {code}: entry needs either \"tile\" or \"faces\"")]
    MissingTiles { code: u8 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawAtlasEntry {
    code: u8,
    #[serde(default)]
    tile: Option<u16>,
    #[serde(default)]
    faces: Option<[u16; 6]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawAtlas {
    grid: u16,
    entries: Vec<RawAtlasEntry>,
}

/// Maps (block code, face direction) to a tile in a square texture atlas.
/// Tiles are indexed linearly, row-major from the top-left.
#[derive(Debug, Clone)]
pub struct TextureAtlas {
    grid: u16,
    tiles: Box<[[u16; 6]; 256]>,
}

impl Default for TextureAtlas {
    fn default() -> Self {
        let mut tiles = Box::new([[0u16; 6]; 256]);
        for (code, entry) in tiles.iter_mut().enumerate() {
            *entry = [code as u16; 6];
        }
        Self { grid: 16, tiles }
    }
}

impl TextureAtlas {
    pub fn grid(&self) -> u16 {
        self.grid
    }

    /// Width of one tile in normalized texture coordinates.
    pub fn step(&self) -> f32 {
        1.0 / self.grid as f32
    }

    pub fn tile(&self, code: u8, face: Face) -> u16 {
        self.tiles[code as usize][face.index()]
    }

    pub fn set_tiles(&mut self, code: u8, faces: [u16; 6]) {
        self.tiles[code as usize] = faces;
    }

    /// Top-left corner of a tile in normalized texture coordinates.
    pub fn uv(&self, tile: u16) -> [f32; 2] {
        let step = self.step();
        [
            (tile % self.grid) as f32 * step,
            (tile / self.grid) as f32 * step,
        ]
    }

    pub fn from_json(text: &str) -> Result<Self, AtlasError> {
        let raw: RawAtlas = serde_json::from_str(text)?;
        if raw.grid == 0 {
            return Err(AtlasError::ZeroGrid);
        }
        let mut atlas = Self::default();
        atlas.grid = raw.grid;
        for entry in raw.entries {
            let faces = match (entry.tile, entry.faces) {
                (_, Some(faces)) => faces,
                (Some(tile), None) => [tile; 6],
                (None, None) => return Err(AtlasError::MissingTiles { code: entry.code }),
            };
            atlas.set_tiles(entry.code, faces);
        }
        Ok(atlas)
    }

    pub fn load(path: &Path) -> Result<Self, AtlasError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
