pub mod batch;

pub use batch::{BatchError, LightBatch};

use std::collections::VecDeque;
use std::sync::Arc;

use glam::IVec3;
use log::debug;

use crate::world::chunk::Chunk;
use crate::world::chunk_coord::Face;

struct LightNode {
    chunk: Arc<Chunk>,
    pos: IVec3,
    level: u8,
    emitter: bool,
}

/// Flood-fill illumination engine over an explicit worklist. The
/// brighter-only write rule makes the result independent of processing
/// order, so a plain FIFO suffices.
pub(crate) struct LightSolver<'a> {
    queue: VecDeque<LightNode>,
    batch: Option<&'a LightBatch>,
}

impl<'a> LightSolver<'a> {
    /// A solver restricted to `batch` refuses to carry light into any
    /// chunk outside it; with `None` it follows neighbor links freely
    pub(crate) fn new(batch: Option<&'a LightBatch>) -> Self {
        Self {
            queue: VecDeque::with_capacity(64),
            batch,
        }
    }

    pub(crate) fn seed(&mut self, chunk: Arc<Chunk>, pos: IVec3, level: u8, emitter: bool) {
        self.queue.push_back(LightNode {
            chunk,
            pos,
            level,
            emitter,
        });
    }

    // Each accepted cell relays level - cost to its six neighbors, so
    // intensity strictly decreases along every path and the fill terminates
    pub(crate) fn run(&mut self) {
        let mut visited = 0usize;
        while let Some(node) = self.queue.pop_front() {
            visited += 1;
            let catalog = &node.chunk.tables().blocks;
            let cost;
            if node.emitter {
                // Emitters are written regardless of transparency and relay
                // unconditionally, but still only ever brighten the cell
                node.chunk.raise_light(node.pos, node.level);
                cost = catalog.attenuation(node.chunk.block_local(node.pos));
            } else {
                if node.level == 0 {
                    continue;
                }
                let code = node.chunk.block_local(node.pos);
                if catalog.is_solid(code) {
                    continue;
                }
                if !node.chunk.raise_light(node.pos, node.level) {
                    // A brighter value got here first, nothing new to relay
                    continue;
                }
                cost = catalog.attenuation(code);
            }

            let carried = node.level.saturating_sub(cost);
            if carried == 0 {
                continue;
            }
            let dims = node.chunk.tables().dims.to_array();
            for face in Face::ALL {
                let mut p = (node.pos + face.offset()).to_array();
                let axis = face.axis();
                let target = if p[axis] >= 0 && p[axis] < dims[axis] {
                    node.chunk.clone()
                } else {
                    p[axis] = if p[axis] < 0 {
                        p[axis] + dims[axis]
                    } else {
                        p[axis] - dims[axis]
                    };
                    let Some(next) = node.chunk.neighbor(face) else {
                        continue;
                    };
                    if let Some(batch) = self.batch {
                        if !Arc::ptr_eq(&next, &node.chunk) && !batch.contains(&next) {
                            continue;
                        }
                    }
                    next
                };
                self.queue.push_back(LightNode {
                    chunk: target,
                    pos: IVec3::from_array(p),
                    level: carried,
                    emitter: false,
                });
            }
        }
        debug!("light fill settled after {visited} nodes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::blocks::BlockProps;
    use crate::config::ChunkTables;
    use crate::world::chunk_coord::ChunkCoord;
    use crate::world::map::ChunkMap;

    fn costly_air_tables() -> Arc<ChunkTables> {
        let mut tables = ChunkTables::default();
        tables
            .blocks
            .define(
                0,
                BlockProps {
                    solid: false,
                    attenuation: 2,
                },
            )
            .unwrap();
        Arc::new(tables)
    }

    #[test]
    fn test_attenuation_gradient() {
        let chunk = Chunk::new(ChunkCoord::new(0, 0, 0), costly_air_tables());
        chunk.add_light(IVec3::new(8, 8, 8), 9);
        chunk.calculate_primary_lighting();

        // Along a straight unobstructed line the value drops by the cell
        // cost per step until it runs out.
        assert_eq!(chunk.get_light_at(IVec3::new(8, 8, 8)), 9);
        assert_eq!(chunk.get_light_at(IVec3::new(9, 8, 8)), 7);
        assert_eq!(chunk.get_light_at(IVec3::new(10, 8, 8)), 5);
        assert_eq!(chunk.get_light_at(IVec3::new(12, 8, 8)), 1);
        assert_eq!(chunk.get_light_at(IVec3::new(13, 8, 8)), 0);

        // Manhattan distance governs, not per-axis distance.
        assert_eq!(chunk.get_light_at(IVec3::new(9, 9, 8)), 5);
        assert_eq!(chunk.get_light_at(IVec3::new(9, 9, 9)), 3);
    }

    #[test]
    fn test_primary_pass_resets() {
        let chunk = Chunk::new(ChunkCoord::new(0, 0, 0), Arc::new(ChunkTables::default()));
        chunk.add_light(IVec3::new(2, 2, 2), 6);
        chunk.calculate_primary_lighting();
        assert!(chunk.get_light_at(IVec3::new(2, 2, 2)) > 0);

        chunk.clear_lights();
        chunk.add_light(IVec3::new(12, 12, 12), 6);
        chunk.calculate_primary_lighting();
        assert_eq!(chunk.get_light_at(IVec3::new(2, 2, 2)), 0);
        assert_eq!(chunk.get_light_at(IVec3::new(12, 12, 12)), 6);
    }

    #[test]
    fn test_solid_cells_block_light() {
        let tables = Arc::new(ChunkTables::default());
        let chunk = Chunk::new(ChunkCoord::new(0, 0, 0), tables);
        // Wall across x = 6 next to the emitter at x = 5.
        for y in 0..16 {
            for z in 0..16 {
                chunk.change_block(IVec3::new(6, y, z), 1);
            }
        }
        assert!(chunk.apply_changes());
        chunk.add_light(IVec3::new(5, 8, 8), 5);
        chunk.calculate_primary_lighting();

        assert_eq!(chunk.get_light_at(IVec3::new(5, 8, 8)), 5);
        assert_eq!(chunk.get_light_at(IVec3::new(6, 8, 8)), 0);
        assert_eq!(chunk.get_light_at(IVec3::new(7, 8, 8)), 0);
    }

    #[test]
    fn test_cross_chunk_propagation() {
        let map = ChunkMap::new(Arc::new(ChunkTables::default()));
        let a = map.insert(ChunkCoord::new(0, 0, 0)).unwrap();
        let b = map.insert(ChunkCoord::new(1, 0, 0)).unwrap();

        a.add_light(IVec3::new(15, 8, 8), 5);
        a.calculate_primary_lighting();

        assert_eq!(a.get_light_at(IVec3::new(15, 8, 8)), 5);
        assert_eq!(b.get_light_at(IVec3::new(0, 8, 8)), 4);
        assert_eq!(b.get_light_at(IVec3::new(2, 8, 8)), 2);
    }

    #[test]
    fn test_batch_boundary_refused() {
        let map = ChunkMap::new(Arc::new(ChunkTables::default()));
        let a = map.insert(ChunkCoord::new(0, 0, 0)).unwrap();
        let b = map.insert(ChunkCoord::new(1, 0, 0)).unwrap();

        a.add_light(IVec3::new(15, 8, 8), 5);
        {
            let batch = map.checkout_batch(&[ChunkCoord::new(0, 0, 0)]).unwrap();
            a.calculate_lighting(&batch, false);
        }
        assert_eq!(a.get_light_at(IVec3::new(15, 8, 8)), 5);
        assert_eq!(a.get_light_at(IVec3::new(14, 8, 8)), 4);
        // B was not in the batch; its grid is untouched even though it is a
        // direct neighbor.
        assert_eq!(b.light_local(IVec3::new(0, 8, 8)), 0);

        let batch = map
            .checkout_batch(&[ChunkCoord::new(0, 0, 0), ChunkCoord::new(1, 0, 0)])
            .unwrap();
        a.calculate_lighting(&batch, false);
        assert_eq!(b.light_local(IVec3::new(0, 8, 8)), 4);
    }

    #[test]
    fn test_secondary_gathers_border_light() {
        let map = ChunkMap::new(Arc::new(ChunkTables::default()));
        let a = map.insert(ChunkCoord::new(0, 0, 0)).unwrap();
        let b = map.insert(ChunkCoord::new(1, 0, 0)).unwrap();

        // Light B alone first; primary does not run on A, so A stays dark.
        b.add_light(IVec3::new(0, 8, 8), 6);
        {
            let batch = map.checkout_batch(&[ChunkCoord::new(1, 0, 0)]).unwrap();
            b.calculate_lighting(&batch, false);
        }
        assert_eq!(a.get_light_at(IVec3::new(15, 8, 8)), 0);

        // Secondary on A absorbs B's converged border values.
        a.calculate_secondary_lighting();
        assert_eq!(a.get_light_at(IVec3::new(15, 8, 8)), 5);
        assert_eq!(a.get_light_at(IVec3::new(14, 8, 8)), 4);
    }

    #[test]
    fn test_batch_secondary_skips_members() {
        let map = ChunkMap::new(Arc::new(ChunkTables::default()));
        let a = map.insert(ChunkCoord::new(0, 0, 0)).unwrap();
        let b = map.insert(ChunkCoord::new(1, 0, 0)).unwrap();
        let c = map.insert(ChunkCoord::new(-1, 0, 0)).unwrap();

        // C holds converged light from an earlier pass; B is mid-update.
        c.add_light(IVec3::new(15, 8, 8), 6);
        c.calculate_primary_lighting();
        b.add_light(IVec3::new(8, 8, 8), 3);
        b.calculate_primary_lighting();
        a.clear_lighting();

        let batch = map
            .checkout_batch(&[ChunkCoord::new(0, 0, 0), ChunkCoord::new(1, 0, 0)])
            .unwrap();
        a.calculate_lighting(&batch, true);

        // Border light was gathered from C (outside the batch) but not from
        // B (a member, which reseeds itself in its own pass).
        assert_eq!(a.get_light_at(IVec3::new(0, 8, 8)), 5);
        assert_eq!(a.get_light_at(IVec3::new(15, 8, 8)), 0);
    }
}
