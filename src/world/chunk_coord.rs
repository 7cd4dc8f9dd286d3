use glam::IVec3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Position of a chunk in the world grid, in chunk units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkCoord(pub IVec3);

impl Serialize for ChunkCoord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (self.0.x, self.0.y, self.0.z).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChunkCoord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (x, y, z) = <(i32, i32, i32)>::deserialize(deserializer)?;
        Ok(ChunkCoord(IVec3::new(x, y, z)))
    }
}

impl ChunkCoord {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self(IVec3::new(x, y, z))
    }

    /// The coordinate of the adjacent chunk across `face`.
    pub fn step(&self, face: Face) -> Self {
        Self(self.0 + face.offset())
    }
}

/// One of the six axis-aligned directions, in the fixed order
/// -X, +X, -Y, +Y, -Z, +Z. Doubles as the index into per-face tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    NegX = 0,
    PosX = 1,
    NegY = 2,
    PosY = 3,
    NegZ = 4,
    PosZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::NegX,
        Face::PosX,
        Face::NegY,
        Face::PosY,
        Face::NegZ,
        Face::PosZ,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn axis(self) -> usize {
        self.index() / 2
    }

    pub fn is_positive(self) -> bool {
        self.index() % 2 == 1
    }

    pub fn opposite(self) -> Face {
        Self::ALL[self.index() ^ 1]
    }

    pub fn negative(axis: usize) -> Face {
        Self::ALL[axis * 2]
    }

    pub fn positive(axis: usize) -> Face {
        Self::ALL[axis * 2 + 1]
    }

    /// Unit offset to the adjacent cell in this direction.
    pub fn offset(self) -> IVec3 {
        match self {
            Face::NegX => IVec3::NEG_X,
            Face::PosX => IVec3::X,
            Face::NegY => IVec3::NEG_Y,
            Face::PosY => IVec3::Y,
            Face::NegZ => IVec3::NEG_Z,
            Face::PosZ => IVec3::Z,
        }
    }
}
