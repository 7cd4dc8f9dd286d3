pub mod chunk;
pub mod chunk_coord;
pub mod field;
pub mod map;

// Re-export commonly used types
pub use chunk::Chunk;
pub use chunk_coord::{ChunkCoord, Face};
pub use field::VoxelField;
pub use map::ChunkMap;
