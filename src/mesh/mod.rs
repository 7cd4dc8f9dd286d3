use glam::IVec3;
use log::debug;

use crate::world::chunk::Chunk;
use crate::world::chunk_coord::Face;
use crate::world::field::VoxelField;

/// Output buffers for one chunk's renderable surface: xyz positions, uv
/// texcoords, rgba diffuse, and a triangle index list
#[derive(Debug, Default, Clone)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub texcoords: Vec<f32>,
    pub diffuse: Vec<f32>,
    pub indices: Vec<u32>,
    pub vertex_count: usize,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.texcoords.clear();
        self.diffuse.clear();
        self.indices.clear();
        self.vertex_count = 0;
    }

    /// Drops only the lighting channel, keeping geometry
    pub fn clear_lighting(&mut self) {
        self.diffuse.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    pub fn quad_count(&self) -> usize {
        self.vertex_count / 6
    }
}

// Two triangles per quad, as six vertices over the four corners
const QUAD_PATTERN: [usize; 6] = [0, 1, 2, 2, 3, 0];

const TEX_CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

// Quad corners per face, on the unit cell, wound to face back into the
// open cell the quad is emitted from. Indexed by Face.
const FACE_CORNERS: [[[i32; 3]; 4]; 6] = [
    [[0, 0, 0], [0, 1, 0], [0, 1, 1], [0, 0, 1]], // -X
    [[1, 0, 0], [1, 0, 1], [1, 1, 1], [1, 1, 0]], // +X
    [[0, 0, 0], [0, 0, 1], [1, 0, 1], [1, 0, 0]], // -Y
    [[0, 1, 0], [1, 1, 0], [1, 1, 1], [0, 1, 1]], // +Y
    [[0, 0, 0], [1, 0, 0], [1, 1, 0], [0, 1, 0]], // -Z
    [[0, 0, 1], [0, 1, 1], [1, 1, 1], [1, 0, 1]], // +Z
];

// The two in-plane directions a quad corner touches, for smooth-light
// sampling
fn corner_edges(face: Face, corner: [i32; 3]) -> (Face, Face) {
    let axis = face.axis();
    let mut edges = [face; 2];
    let mut found = 0;
    for a in 0..3 {
        if a == axis {
            continue;
        }
        edges[found] = if corner[a] == 0 {
            Face::negative(a)
        } else {
            Face::positive(a)
        };
        found += 1;
    }
    (edges[0], edges[1])
}

/// Regenerates `mesh` from the given block and light snapshots. Quads are
/// enumerated from the open cells: every face of an open cell whose
/// adjacent cell is solid shows that solid block's surface.
pub(crate) fn build_into(
    chunk: &Chunk,
    blocks: &VoxelField,
    light: &VoxelField,
    mesh: &mut MeshData,
    full: bool,
) {
    let tables = chunk.tables();
    let catalog = &tables.blocks;
    let atlas = &tables.atlas;
    let shading = &tables.light;
    let dims = tables.dims;

    if full {
        mesh.clear();
    } else {
        mesh.clear_lighting();
    }

    let sample_block = |pos: IVec3| -> u8 {
        if blocks.in_bounds(pos) {
            blocks.get(pos)
        } else {
            chunk.get_block_at(pos)
        }
    };
    let sample_light = |pos: IVec3| -> u8 {
        if light.in_bounds(pos) {
            light.get(pos)
        } else {
            chunk.get_light_at(pos)
        }
    };

    for x in 0..dims.x {
        for y in 0..dims.y {
            for z in 0..dims.z {
                let cell = IVec3::new(x, y, z);
                if catalog.is_solid(blocks.get(cell)) {
                    continue;
                }

                let mut open = [false; 6];
                for face in Face::ALL {
                    open[face.index()] = !catalog.is_solid(sample_block(cell + face.offset()));
                }
                // A sealed 1x1x1 void can never be seen into, skip it
                if open == [false; 6] {
                    continue;
                }

                let own = light.get(cell);
                let mut around = [0u8; 6];
                for face in Face::ALL {
                    if open[face.index()] {
                        around[face.index()] = sample_light(cell + face.offset());
                    }
                }

                for face in Face::ALL {
                    if open[face.index()] {
                        continue;
                    }
                    // The quad shows the adjacent solid block's surface,
                    // drawn on this cell's side of the shared face
                    let facing = sample_block(cell + face.offset());
                    let tile = atlas.tile(facing, face.opposite());
                    let origin = atlas.uv(tile);
                    let step = atlas.step();
                    let base = shading.curve_at(own) * shading.ambient_for(face);
                    let corners = &FACE_CORNERS[face.index()];

                    for &ci in &QUAD_PATTERN {
                        let corner = corners[ci];
                        if full {
                            mesh.positions.extend([
                                (x + corner[0]) as f32,
                                (y + corner[1]) as f32,
                                (z + corner[2]) as f32,
                            ]);
                            mesh.texcoords.extend([
                                origin[0] + TEX_CORNERS[ci][0] * step,
                                origin[1] + TEX_CORNERS[ci][1] * step,
                            ]);
                            mesh.indices.push(mesh.vertex_count as u32);
                            mesh.vertex_count += 1;
                        }

                        let value = if shading.smooth {
                            let (d1, d2) = corner_edges(face, corner);
                            let mut sum = base
                                + shading.curve_at(around[d1.index()])
                                + shading.curve_at(around[d2.index()]);
                            if open[d1.index()] || open[d2.index()] {
                                let diagonal = cell + d1.offset() + d2.offset();
                                sum += shading.curve_at(sample_light(diagonal));
                            }
                            sum / 4.0
                        } else {
                            base
                        };
                        // Warm falloff across the tint components
                        mesh.diffuse
                            .extend([value, value / 1.2, value / 1.4, 1.0]);
                    }
                }
            }
        }
    }

    debug!(
        "chunk {:?}: {} mesh pass, {} quads",
        chunk.coord(),
        if full { "full" } else { "lighting" },
        mesh.quad_count()
    );
}
