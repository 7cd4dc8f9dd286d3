pub mod atlas;
pub mod blocks;
pub mod light;

pub use atlas::TextureAtlas;
pub use blocks::BlockCatalog;
pub use light::LightTable;

use glam::IVec3;

/// Lookup tables shared by every chunk in a world, passed in at chunk
/// construction rather than read from process-wide statics
#[derive(Debug, Clone)]
pub struct ChunkTables {
    /// Grid dimensions of every chunk, in cells per axis
    pub dims: IVec3,
    pub blocks: BlockCatalog,
    pub atlas: TextureAtlas,
    pub light: LightTable,
}

impl Default for ChunkTables {
    fn default() -> Self {
        Self {
            dims: IVec3::splat(16),
            blocks: BlockCatalog::default(),
            atlas: TextureAtlas::default(),
            light: LightTable::default(),
        }
    }
}

impl ChunkTables {
    pub fn with_dims(dims: IVec3) -> Self {
        assert!(dims.min_element() > 0, "chunk dimensions must be positive");
        Self {
            dims,
            ..Self::default()
        }
    }
}
