pub mod config;
pub mod lighting;
pub mod mesh;
pub mod world;

// Re-export commonly used types
pub use config::atlas::{AtlasError, TextureAtlas};
pub use config::blocks::{BlockCatalog, BlockProps, CatalogError};
pub use config::light::{LightTable, LightTableError};
pub use config::ChunkTables;
pub use lighting::batch::{BatchError, LightBatch};
pub use mesh::MeshData;
pub use world::chunk::Chunk;
pub use world::chunk_coord::{ChunkCoord, Face};
pub use world::field::{VoxelField, LIGHT_LEVELS, MAX_LIGHT};
pub use world::map::{ChunkMap, ChunkMapError};
