//! Patch Structure
//!
//! A patch is one cell of the city tessellation: the atomic unit of land that
//! receives a ward.

use crate::geom::Polygon;
use crate::vertex::{Outline, VertexArena, VertexId};
use crate::ward::Ward;

/// Handle of a patch in a [`Patches`] store
///
/// Ids are never reused: a patch that is split or discarded keeps its slot,
/// and its replacements get fresh ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchId(pub usize);

/// A single patch of the city
///
/// # Lifecycle
///
/// Created once from the tessellation, its shape may be edited by junction
/// merging and by a gate split of the wall, and its ward is assigned exactly
/// once during district assignment.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    /// Boundary of the patch as shared vertex ids
    pub shape: Outline,

    /// The patch belongs to the city (as opposed to the countryside)
    pub within_city: bool,

    /// The patch lies inside the curtain wall
    pub within_walls: bool,

    /// District assigned to the patch
    pub ward: Option<Ward>,
}

impl Patch {
    /// Create a countryside patch from its outline
    pub fn new(shape: Outline) -> Self {
        Self {
            shape,
            ..Default::default()
        }
    }

    /// Resolved shape of the patch
    #[inline]
    pub fn polygon(&self, arena: &VertexArena) -> Polygon {
        self.shape.resolve(arena)
    }
}

/// All patches of a model, in tessellation order
///
/// Storage is a slab indexed by [`PatchId`]; the ordered list of live patches
/// is kept separately so that splitting and filtering preserve the order the
/// rest of the pipeline iterates in.
#[derive(Debug, Clone, Default)]
pub struct Patches {
    slab: Vec<Patch>,
    alive: Vec<PatchId>,
}

impl Patches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a patch at the end of the live list
    pub fn push(&mut self, patch: Patch) -> PatchId {
        let id = PatchId(self.slab.len());
        self.slab.push(patch);
        self.alive.push(id);
        id
    }

    #[inline]
    pub fn get(&self, id: PatchId) -> &Patch {
        &self.slab[id.0]
    }

    #[inline]
    pub fn get_mut(&mut self, id: PatchId) -> &mut Patch {
        &mut self.slab[id.0]
    }

    /// Live patch ids in order
    #[inline]
    pub fn ids(&self) -> &[PatchId] {
        &self.alive
    }

    /// Number of live patches
    #[inline]
    pub fn len(&self) -> usize {
        self.alive.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    /// Iterate over live patches in order
    pub fn iter(&self) -> impl Iterator<Item = (PatchId, &Patch)> + '_ {
        self.alive.iter().map(move |&id| (id, &self.slab[id.0]))
    }

    /// Whether `id` is still a live patch
    pub fn is_alive(&self, id: PatchId) -> bool {
        self.alive.contains(&id)
    }

    /// Live patches having `v` as a vertex
    pub fn by_vertex(&self, v: VertexId) -> Vec<PatchId> {
        self.iter()
            .filter(|(_, p)| p.shape.contains(v))
            .map(|(id, _)| id)
            .collect()
    }

    /// Replace a live patch by `parts`, at the same position in the live list
    pub fn replace(&mut self, id: PatchId, parts: Vec<Patch>) -> Vec<PatchId> {
        let Some(pos) = self.alive.iter().position(|&p| p == id) else {
            return Vec::new();
        };

        let new_ids: Vec<PatchId> = parts
            .into_iter()
            .map(|patch| {
                let new_id = PatchId(self.slab.len());
                self.slab.push(patch);
                new_id
            })
            .collect();

        self.alive.splice(pos..=pos, new_ids.iter().copied());
        new_ids
    }

    /// Keep only the live patches matching `f`
    pub fn retain(&mut self, mut f: impl FnMut(&Patch) -> bool) {
        let slab = &self.slab;
        self.alive.retain(|id| f(&slab[id.0]));
    }
}

impl std::ops::Index<PatchId> for Patches {
    type Output = Patch;

    fn index(&self, id: PatchId) -> &Patch {
        self.get(id)
    }
}

impl std::ops::IndexMut<PatchId> for Patches {
    fn index_mut(&mut self, id: PatchId) -> &mut Patch {
        self.get_mut(id)
    }
}
