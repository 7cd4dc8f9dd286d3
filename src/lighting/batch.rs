use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::world::chunk::Chunk;
use crate::world::chunk_coord::ChunkCoord;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Chunk {0:?} is not loaded")]
    Missing(ChunkCoord),
    #[error("Chunk {0:?} is already claimed by another lighting batch")]
    AlreadyClaimed(ChunkCoord),
}

/// Exclusive ownership token over the set of chunks participating in one
/// multi-chunk lighting update. Each chunk can belong to at most one live
/// batch; claims are released when the batch is dropped.
pub struct LightBatch {
    members: HashMap<ChunkCoord, Arc<Chunk>>,
}

impl LightBatch {
    pub(crate) fn claim(chunks: Vec<Arc<Chunk>>) -> Result<Self, BatchError> {
        let mut members: HashMap<ChunkCoord, Arc<Chunk>> = HashMap::with_capacity(chunks.len());
        for chunk in chunks {
            if members.contains_key(&chunk.coord()) {
                continue;
            }
            if !chunk.try_claim() {
                let coord = chunk.coord();
                for held in members.values() {
                    held.release_claim();
                }
                return Err(BatchError::AlreadyClaimed(coord));
            }
            members.insert(chunk.coord(), chunk);
        }
        Ok(Self { members })
    }

    pub fn contains(&self, chunk: &Chunk) -> bool {
        self.members.contains_key(&chunk.coord())
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&Arc<Chunk>> {
        self.members.get(&coord)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Chunk>> {
        self.members.values()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Drop for LightBatch {
    fn drop(&mut self) {
        for chunk in self.members.values() {
            chunk.release_claim();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkTables;

    fn chunk_at(x: i32) -> Arc<Chunk> {
        Chunk::new(ChunkCoord::new(x, 0, 0), Arc::new(ChunkTables::default()))
    }

    #[test]
    fn test_claims_are_exclusive() {
        let a = chunk_at(0);
        let b = chunk_at(1);

        let first = LightBatch::claim(vec![a.clone(), b.clone()]).unwrap();
        assert_eq!(first.len(), 2);
        assert!(first.contains(&a));

        let second = LightBatch::claim(vec![b.clone()]);
        assert!(matches!(
            second,
            Err(BatchError::AlreadyClaimed(coord)) if coord == b.coord()
        ));

        drop(first);
        let third = LightBatch::claim(vec![a, b]).unwrap();
        assert_eq!(third.len(), 2);
    }

    #[test]
    fn test_failed_claim_releases_partial_holds() {
        let a = chunk_at(0);
        let b = chunk_at(1);

        let held = LightBatch::claim(vec![b.clone()]).unwrap();
        assert!(LightBatch::claim(vec![a.clone(), b.clone()]).is_err());
        drop(held);

        // The failed checkout must not have left a claimed behind.
        let retry = LightBatch::claim(vec![a, b]).unwrap();
        assert_eq!(retry.len(), 2);
    }

    #[test]
    fn test_duplicate_coords_collapse() {
        let a = chunk_at(0);
        let batch = LightBatch::claim(vec![a.clone(), a.clone()]).unwrap();
        assert_eq!(batch.len(), 1);
    }
}
