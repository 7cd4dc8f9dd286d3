use glam::IVec3;

/// Number of discrete light levels a cell can hold.
pub const LIGHT_LEVELS: usize = 16;
/// Brightest storable light value.
pub const MAX_LIGHT: u8 = (LIGHT_LEVELS - 1) as u8;

/// Dense 8-bit per-cell storage for one chunk-sized grid. Used for both the
/// block codes and the light values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelField {
    dims: IVec3,
    data: Vec<u8>,
}

impl VoxelField {
    pub fn new(dims: IVec3) -> Self {
        assert!(dims.min_element() > 0, "field dimensions must be positive");
        Self {
            dims,
            data: vec![0; (dims.x * dims.y * dims.z) as usize],
        }
    }

    pub fn dims(&self) -> IVec3 {
        self.dims
    }

    pub fn in_bounds(&self, pos: IVec3) -> bool {
        pos.cmpge(IVec3::ZERO).all() && pos.cmplt(self.dims).all()
    }

    fn index(&self, pos: IVec3) -> usize {
        debug_assert!(self.in_bounds(pos));
        (pos.x + pos.y * self.dims.x + pos.z * self.dims.x * self.dims.y) as usize
    }

    pub fn get(&self, pos: IVec3) -> u8 {
        self.data[self.index(pos)]
    }

    pub fn set(&mut self, pos: IVec3, value: u8) {
        let index = self.index(pos);
        self.data[index] = value;
    }

    /// Brighter-only write: stores `value` only if it exceeds the current
    /// value, and reports whether the store happened.
    pub fn raise(&mut self, pos: IVec3, value: u8) -> bool {
        let index = self.index(pos);
        if self.data[index] >= value {
            false
        } else {
            self.data[index] = value;
            true
        }
    }

    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brighter_only() {
        let mut field = VoxelField::new(IVec3::splat(4));
        let pos = IVec3::new(1, 2, 3);
        assert!(field.raise(pos, 5));
        assert!(!field.raise(pos, 5));
        assert!(!field.raise(pos, 3));
        assert_eq!(field.get(pos), 5);
        assert!(field.raise(pos, 9));
        assert_eq!(field.get(pos), 9);
    }

    #[test]
    fn test_bounds() {
        let field = VoxelField::new(IVec3::new(4, 8, 2));
        assert!(field.in_bounds(IVec3::ZERO));
        assert!(field.in_bounds(IVec3::new(3, 7, 1)));
        assert!(!field.in_bounds(IVec3::new(4, 0, 0)));
        assert!(!field.in_bounds(IVec3::new(0, -1, 0)));
        assert!(!field.in_bounds(IVec3::new(0, 0, 2)));
    }

    #[test]
    fn test_fill() {
        let mut field = VoxelField::new(IVec3::splat(2));
        field.set(IVec3::new(1, 1, 1), 7);
        field.fill(0);
        assert_eq!(field.get(IVec3::new(1, 1, 1)), 0);
    }
}
