use std::collections::HashMap;
use std::sync::Arc;

use crossbeam_channel::Sender;
use log::debug;
use parking_lot::RwLock;
use thiserror::Error;

use crate::config::ChunkTables;
use crate::lighting::batch::{BatchError, LightBatch};
use crate::world::chunk::Chunk;
use crate::world::chunk_coord::{ChunkCoord, Face};

#[derive(Error, Debug)]
pub enum ChunkMapError {
    #[error("Chunk {0:?} is already loaded")]
    AlreadyLoaded(ChunkCoord),
}

/// Addressable store of all loaded chunks, keyed by chunk coordinate.
/// The map is the only place neighbor links are created or severed.
pub struct ChunkMap {
    tables: Arc<ChunkTables>,
    chunks: RwLock<HashMap<ChunkCoord, Arc<Chunk>>>,
    notify: Option<Sender<ChunkCoord>>,
}

impl ChunkMap {
    pub fn new(tables: Arc<ChunkTables>) -> Self {
        Self {
            tables,
            chunks: RwLock::new(HashMap::new()),
            notify: None,
        }
    }

    /// Every chunk created by this map reports queued block changes on `tx`
    pub fn with_change_notifier(tables: Arc<ChunkTables>, tx: Sender<ChunkCoord>) -> Self {
        Self {
            tables,
            chunks: RwLock::new(HashMap::new()),
            notify: Some(tx),
        }
    }

    pub fn tables(&self) -> &Arc<ChunkTables> {
        &self.tables
    }

    /// Creates a chunk at `coord` and wires it to its present neighbors
    pub fn insert(&self, coord: ChunkCoord) -> Result<Arc<Chunk>, ChunkMapError> {
        let mut chunks = self.chunks.write();
        if chunks.contains_key(&coord) {
            return Err(ChunkMapError::AlreadyLoaded(coord));
        }
        let chunk = Chunk::new(coord, self.tables.clone());
        if let Some(tx) = &self.notify {
            chunk.set_change_notifier(tx.clone());
        }
        for face in Face::ALL {
            if let Some(adjacent) = chunks.get(&coord.step(face)) {
                chunk.link_neighbor(face, adjacent);
                adjacent.link_neighbor(face.opposite(), &chunk);
            }
        }
        chunks.insert(coord, chunk.clone());
        debug!("loaded chunk {coord:?}");
        Ok(chunk)
    }

    /// Unloads the chunk at `coord`, severing every back-link pointing at it
    pub fn remove(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        let mut chunks = self.chunks.write();
        let chunk = chunks.remove(&coord)?;
        for face in Face::ALL {
            if let Some(adjacent) = chunks.get(&coord.step(face)) {
                adjacent.unlink_neighbor(face.opposite());
            }
        }
        debug!("unloaded chunk {coord:?}");
        Some(chunk)
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        self.chunks.read().get(&coord).cloned()
    }

    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.read().is_empty()
    }

    /// Claims every listed chunk for one lighting update; fails without
    /// side effects if any is missing or already claimed
    pub fn checkout_batch(&self, coords: &[ChunkCoord]) -> Result<LightBatch, BatchError> {
        let chunks = self.chunks.read();
        let mut members = Vec::with_capacity(coords.len());
        for &coord in coords {
            match chunks.get(&coord) {
                Some(chunk) => members.push(chunk.clone()),
                None => return Err(BatchError::Missing(coord)),
            }
        }
        drop(chunks);
        LightBatch::claim(members)
    }
}
