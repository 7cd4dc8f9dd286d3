use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crossbeam_channel::Sender;
use glam::IVec3;
use log::{debug, warn};
use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::config::ChunkTables;
use crate::lighting::batch::LightBatch;
use crate::lighting::LightSolver;
use crate::mesh::{self, MeshData};
use crate::world::chunk_coord::{ChunkCoord, Face};
use crate::world::field::{VoxelField, MAX_LIGHT};

struct BlockStore {
    blocks: VoxelField,
    pending: Vec<(IVec3, u8)>,
}

struct LightStore {
    field: VoxelField,
    dirty: bool,
}

/// One fixed-size cubic partition of the voxel world
pub struct Chunk {
    coord: ChunkCoord,
    tables: Arc<ChunkTables>,
    // Block data and light data sit behind separate locks so relighting
    // does not stall block reads
    store: Mutex<BlockStore>,
    light: Mutex<LightStore>,
    neighbors: RwLock<[Option<Weak<Chunk>>; 6]>,
    emitters: Mutex<HashMap<IVec3, u8>>,
    mesh: Mutex<MeshData>,
    active: AtomicBool,
    claimed: AtomicBool,
    notify: Mutex<Option<Sender<ChunkCoord>>>,
    this: Weak<Chunk>,
}

impl Chunk {
    pub fn new(coord: ChunkCoord, tables: Arc<ChunkTables>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            coord,
            store: Mutex::new(BlockStore {
                blocks: VoxelField::new(tables.dims),
                pending: Vec::new(),
            }),
            light: Mutex::new(LightStore {
                field: VoxelField::new(tables.dims),
                dirty: false,
            }),
            neighbors: RwLock::new(std::array::from_fn(|_| None)),
            emitters: Mutex::new(HashMap::new()),
            mesh: Mutex::new(MeshData::new()),
            active: AtomicBool::new(false),
            claimed: AtomicBool::new(false),
            notify: Mutex::new(None),
            this: this.clone(),
            tables,
        })
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub(crate) fn tables(&self) -> &ChunkTables {
        &self.tables
    }

    fn handle(&self) -> Arc<Chunk> {
        self.this.upgrade().expect("chunk outlived its Arc")
    }

    /// Installs the channel on which block-change notifications are sent
    pub fn set_change_notifier(&self, tx: Sender<ChunkCoord>) {
        *self.notify.lock() = Some(tx);
    }

    pub(crate) fn link_neighbor(&self, face: Face, other: &Arc<Chunk>) {
        self.neighbors.write()[face.index()] = Some(Arc::downgrade(other));
    }

    pub(crate) fn unlink_neighbor(&self, face: Face) {
        self.neighbors.write()[face.index()] = None;
    }

    pub fn neighbor(&self, face: Face) -> Option<Arc<Chunk>> {
        self.neighbors.read()[face.index()].as_ref()?.upgrade()
    }

    // Follows neighbor links until pos is a legal local coordinate; None
    // means the walk ran off the edge of the loaded world
    fn resolve(&self, pos: IVec3) -> Option<(Arc<Chunk>, IVec3)> {
        let dims = self.tables.dims.to_array();
        let mut current = self.handle();
        let mut p = pos.to_array();
        for axis in 0..3 {
            while p[axis] < 0 {
                p[axis] += dims[axis];
                current = current.neighbor(Face::negative(axis))?;
            }
            while p[axis] >= dims[axis] {
                p[axis] -= dims[axis];
                current = current.neighbor(Face::positive(axis))?;
            }
        }
        Some((current, IVec3::from_array(p)))
    }

    /// Block code at a position, redirecting through neighbor links when
    /// it falls outside this chunk; missing neighbors read as air
    pub fn get_block_at(&self, pos: IVec3) -> u8 {
        match self.resolve(pos) {
            Some((chunk, local)) => chunk.block_local(local),
            None => 0,
        }
    }

    /// Light value at a position, with the same neighbor redirection
    pub fn get_light_at(&self, pos: IVec3) -> u8 {
        match self.resolve(pos) {
            Some((chunk, local)) => chunk.light_local(local),
            None => 0,
        }
    }

    pub(crate) fn block_local(&self, pos: IVec3) -> u8 {
        self.store.lock().blocks.get(pos)
    }

    pub(crate) fn light_local(&self, pos: IVec3) -> u8 {
        self.light.lock().field.get(pos)
    }

    /// Brighter-only light write; marks the chunk light-dirty on success
    pub(crate) fn raise_light(&self, pos: IVec3, value: u8) -> bool {
        let mut light = self.light.lock();
        if light.field.raise(pos, value) {
            light.dirty = true;
            true
        } else {
            false
        }
    }

    pub(crate) fn blocks_snapshot(&self) -> VoxelField {
        self.store.lock().blocks.clone()
    }

    pub(crate) fn light_snapshot(&self) -> VoxelField {
        self.light.lock().field.clone()
    }

    /// Queues a block edit, to land when a worker calls `apply_changes`
    pub fn change_block(&self, pos: IVec3, code: u8) {
        {
            let mut store = self.store.lock();
            store.pending.push((pos, code));
        }
        // Carefully scope the lock above: the listener may re-enter this
        // chunk while draining its queue
        let tx = self.notify.lock().clone();
        if let Some(tx) = tx {
            if tx.send(self.coord).is_err() {
                debug!("chunk {:?}: change listener disconnected", self.coord);
            }
        }
    }

    /// Drains pending edits into the block grid, returning whether any
    /// cell actually changed value
    pub fn apply_changes(&self) -> bool {
        let mut store = self.store.lock();
        let pending = std::mem::take(&mut store.pending);
        let mut changed = false;
        for (pos, code) in pending {
            if !store.blocks.in_bounds(pos) {
                continue;
            }
            if store.blocks.get(pos) != code {
                store.blocks.set(pos, code);
                changed = true;
            }
        }
        changed
    }

    /// Blacks out all lighting, used prior to a lighting update
    pub fn clear_lighting(&self) {
        let mut light = self.light.lock();
        light.field.fill(0);
        light.dirty = true;
    }

    /// Adds a light emitting block
    pub fn add_light(&self, pos: IVec3, strength: u8) {
        if !self.store.lock().blocks.in_bounds(pos) {
            warn!("chunk {:?}: light at {pos} ignored, out of range", self.coord);
            return;
        }
        self.emitters.lock().insert(pos, strength.min(MAX_LIGHT));
    }

    /// Clears extra light emitting blocks
    pub fn clear_lights(&self) {
        self.emitters.lock().clear();
    }

    fn seed_emitters(&self, solver: &mut LightSolver<'_>) {
        let this = self.handle();
        let seeds: Vec<(IVec3, u8)> = self
            .emitters
            .lock()
            .iter()
            .map(|(&pos, &strength)| (pos, strength))
            .collect();
        for (pos, strength) in seeds {
            solver.seed(this.clone(), pos, strength, true);
        }
    }

    // Seeds inward propagation from the light sitting on each present
    // neighbor's border plane; neighbors in `skip` run their own pass
    fn seed_border_light(&self, solver: &mut LightSolver<'_>, skip: Option<&LightBatch>) {
        let dims = self.tables.dims.to_array();
        let this = self.handle();
        for face in Face::ALL {
            let Some(neighbor) = self.neighbor(face) else {
                continue;
            };
            if let Some(batch) = skip {
                if batch.contains(&neighbor) {
                    continue;
                }
            }
            let border = neighbor.light_snapshot();
            let axis = face.axis();
            let (u_axis, v_axis) = ((axis + 1) % 3, (axis + 2) % 3);
            let src = if face.is_positive() { 0 } else { dims[axis] - 1 };
            let dst = if face.is_positive() { dims[axis] - 1 } else { 0 };
            for u in 0..dims[u_axis] {
                for v in 0..dims[v_axis] {
                    let mut p = [0i32; 3];
                    p[axis] = src;
                    p[u_axis] = u;
                    p[v_axis] = v;
                    let value = border.get(IVec3::from_array(p));
                    if value > 1 {
                        p[axis] = dst;
                        solver.seed(this.clone(), IVec3::from_array(p), value - 1, false);
                    }
                }
            }
        }
    }

    /// Resets the light grid and refloods it from this chunk's declared
    /// emitters, following neighbor links without restriction
    pub fn calculate_primary_lighting(&self) {
        self.clear_lighting();
        let mut solver = LightSolver::new(None);
        self.seed_emitters(&mut solver);
        solver.run();
    }

    /// Gathers light bleeding in across each present neighbor's border
    /// on top of whatever the grid already holds
    pub fn calculate_secondary_lighting(&self) {
        let mut solver = LightSolver::new(None);
        self.seed_border_light(&mut solver, None);
        solver.run();
    }

    /// Batch-aware lighting pass: local emitters always seed, and with
    /// `secondary` set border light is gathered from neighbors outside the
    /// batch. Propagation never crosses into a chunk that is not a batch
    /// member.
    pub fn calculate_lighting(&self, batch: &LightBatch, secondary: bool) {
        let mut solver = LightSolver::new(Some(batch));
        self.seed_emitters(&mut solver);
        if secondary {
            self.seed_border_light(&mut solver, Some(batch));
        }
        solver.run();
    }

    pub fn is_light_dirty(&self) -> bool {
        self.light.lock().dirty
    }

    /// Clears and returns the light-dirty flag
    pub fn take_light_dirty(&self) -> bool {
        let mut light = self.light.lock();
        std::mem::take(&mut light.dirty)
    }

    /// Explicitly mark for relight (mainly used for external light updates)
    pub fn needs_relight(&self) {
        self.light.lock().dirty = true;
    }

    pub(crate) fn try_claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::Acquire)
    }

    pub(crate) fn release_claim(&self) {
        self.claimed.store(false, Ordering::Release);
    }

    /// Does either a full build or lighting only
    pub fn build(&self, full: bool) {
        // Copied out once so cross-chunk reads during the build never nest
        // another chunk's lock under ours
        let blocks = self.blocks_snapshot();
        let light = self.light_snapshot();
        let mut mesh = self.mesh.lock();
        mesh::build_into(self, &blocks, &light, &mut mesh, full);
    }

    /// Current mesh buffers; renderers read these between builds
    pub fn mesh(&self) -> MutexGuard<'_, MeshData> {
        self.mesh.lock()
    }

    /// Marks the chunk active, returning true when this call changed the
    /// state
    pub fn activate(&self) -> bool {
        !self.active.swap(true, Ordering::AcqRel)
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}
