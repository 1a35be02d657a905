//! The city model and its generation pipeline
//!
//! A run goes through six stages, each reading what the previous ones built:
//!
//! 1. patches: tessellate the plane and pick the city, plaza and citadel
//! 2. junctions: merge vertices that ended up too close together
//! 3. walls: the city border (a real wall or not), its gates and the castle
//! 4. streets: A* routes from the gates inwards, merged into arteries
//! 5. wards: one district per patch
//! 6. geometry: building footprints for every district
//!
//! Everything random is drawn from one [`Random`] stream in a fixed order, so
//! a configuration always yields the same city.

use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::config::{CityConfig, CityConfigBuilder, CitySize};
use crate::error::{CityError, Result};
use crate::generation::generate_patch_shapes;
use crate::geom::{with_length, Point, Polygon};
use crate::patch::{Patch, PatchId, Patches};
use crate::random::{Random, MAX_SEED};
use crate::topology::{Street, Topology};
use crate::vertex::{VertexArena, VertexId};
use crate::wall::CurtainWall;
use crate::ward::{rate_location, Ward, WardKind, WardType};

/// Attempts at a tessellation with a round enough citadel
const MAX_PATCH_ATTEMPTS: usize = 10;

/// Minimum compactness of the citadel patch
pub const MIN_CITADEL_COMPACTNESS: f64 = 0.75;

/// Adjacent vertices closer than this are merged
const JUNCTION_DISTANCE: f64 = 8.0;

/// Distance of the point a country road is routed from
const ROAD_ORIGIN_DISTANCE: f64 = 1000.0;

/// Chance that a patch next to a gate becomes a gate district
const GATE_WARD_CHANCE_WALLED: f64 = 0.5;
const GATE_WARD_CHANCE_OPEN: f64 = 0.2;

/// Chance that a compact patch outside the city becomes a farm
const FARM_CHANCE: f64 = 0.2;
const MIN_FARM_COMPACTNESS: f64 = 0.7;

/// District mix of the city, in placement order before shuffling
///
/// Once it runs out every remaining patch becomes a slum.
const WARDS: [WardType; 36] = [
    WardType::Craftsmen,
    WardType::Craftsmen,
    WardType::Merchant,
    WardType::Craftsmen,
    WardType::Craftsmen,
    WardType::Cathedral,
    WardType::Craftsmen,
    WardType::Craftsmen,
    WardType::Craftsmen,
    WardType::Craftsmen,
    WardType::Craftsmen,
    WardType::Craftsmen,
    WardType::Craftsmen,
    WardType::Craftsmen,
    WardType::Administration,
    WardType::Craftsmen,
    WardType::Slum,
    WardType::Craftsmen,
    WardType::Slum,
    WardType::Patriciate,
    WardType::Market,
    WardType::Slum,
    WardType::Craftsmen,
    WardType::Craftsmen,
    WardType::Craftsmen,
    WardType::Slum,
    WardType::Craftsmen,
    WardType::Craftsmen,
    WardType::Craftsmen,
    WardType::Military,
    WardType::Slum,
    WardType::Craftsmen,
    WardType::Park,
    WardType::Patriciate,
    WardType::Market,
    WardType::Merchant,
];

/// Kind of route that could not be built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// From a gate to the plaza or the center
    Street,
    /// From the countryside to a gate
    Road,
}

/// A route the pathfinder could not find
///
/// The run completes without it; the city just has one street fewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteFailure {
    pub kind: RouteKind,
    pub gate: VertexId,
}

/// A generated city
///
/// # Example
///
/// ```
/// use rust_voronoi_city::*;
///
/// let config = CityConfigBuilder::new()
///     .seed(7)
///     .unwrap()
///     .citadel(false)
///     .build()
///     .unwrap();
/// let model = Model::generate(config).unwrap();
///
/// assert_eq!(model.inner().len(), 15);
/// assert!(!model.gates().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    config: CityConfig,

    plaza_needed: bool,
    citadel_needed: bool,
    walls_needed: bool,

    pub(crate) arena: VertexArena,
    pub(crate) patches: Patches,
    pub(crate) inner: Vec<PatchId>,
    pub(crate) plaza: Option<PatchId>,
    pub(crate) citadel: Option<PatchId>,
    pub(crate) center: VertexId,

    pub(crate) border: CurtainWall,
    pub(crate) gates: Vec<VertexId>,

    pub(crate) streets: Vec<Street>,
    pub(crate) roads: Vec<Street>,
    pub(crate) arteries: Vec<Street>,
    route_failures: Vec<RouteFailure>,

    city_radius: f64,
}

/// Generate a city of `patch_count` patches from `seed`
///
/// Shorthand for [`Model::generate`] with every feature left to the random
/// stream.
///
/// # Errors
///
/// `InvalidConfig` for fewer than 3 patches or a seed outside
/// `1..=2147483646`, `BadCitadelShape` if the castle wall deformed the
/// citadel too much.
pub fn generate(patch_count: usize, seed: u32) -> Result<Model> {
    let config = CityConfigBuilder::new()
        .seed(seed)?
        .size(CitySize::Custom { patches: patch_count })
        .build()?;
    Model::generate(config)
}

impl Model {
    /// Generate a city from a configuration
    ///
    /// # Errors
    ///
    /// * `InvalidConfig` - fewer than 3 patches, or a seed out of range
    /// * `BadCitadelShape` - the citadel lost its round shape while its wall
    ///   was built; another seed usually works
    /// * `Tessellation` - the triangulation rejected the seed points
    pub fn generate(config: CityConfig) -> Result<Self> {
        validate(&config)?;
        let started = Instant::now();
        let mut rng = Random::new(config.seed);

        // The three draws always happen, overridden or not
        let plaza = rng.bool(0.5);
        let citadel = rng.bool(0.5);
        let walls = rng.bool(0.5);
        let plaza_needed = config.plaza.unwrap_or(plaza);
        let citadel_needed = config.citadel.unwrap_or(citadel);
        let walls_needed = config.walls.unwrap_or(walls);
        debug!(
            seed = config.seed,
            patches = config.patch_count(),
            plaza_needed,
            citadel_needed,
            walls_needed,
            "generating city"
        );

        let mut model = Self::build_patches(config, plaza_needed, citadel_needed, walls_needed, &mut rng)?;
        model.optimize_junctions();
        model.build_walls(&mut rng)?;
        model.build_streets();
        model.create_wards(&mut rng);
        model.build_geometry(&mut rng);

        debug!(
            seed = config.seed,
            patches = model.patches.len(),
            gates = model.gates.len(),
            arteries = model.arteries.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "city generated"
        );
        Ok(model)
    }

    fn build_patches(
        config: CityConfig,
        plaza_needed: bool,
        citadel_needed: bool,
        walls_needed: bool,
        rng: &mut Random,
    ) -> Result<Self> {
        let n = config.patch_count();

        let mut attempt = 0;
        loop {
            attempt += 1;
            let shapes = generate_patch_shapes(n, config.relax_iterations, rng)?;

            let mut arena = VertexArena::new();
            let mut patches = Patches::new();
            let mut inner = Vec::with_capacity(n);
            let mut plaza = None;
            let mut citadel = None;
            let mut center = None;

            for (i, shape) in shapes.iter().enumerate() {
                let outline = arena.intern_polygon(shape);

                if i == 0 {
                    let mut best = f64::INFINITY;
                    for v in outline.iter() {
                        let d = arena.get(v).length();
                        if d < best {
                            best = d;
                            center = Some(v);
                        }
                    }
                }

                let mut patch = Patch::new(outline);
                let is_citadel = i == n && citadel_needed;
                if is_citadel || i < n {
                    patch.within_city = true;
                }
                if i < n {
                    patch.within_walls = walls_needed;
                }

                let id = patches.push(patch);
                if i == 0 && plaza_needed {
                    plaza = Some(id);
                }
                if is_citadel {
                    citadel = Some(id);
                }
                if i < n {
                    inner.push(id);
                }
            }

            let center = center.ok_or_else(|| CityError::Tessellation("the central patch has no vertices".into()))?;

            let compactness = citadel.map(|c| patches[c].polygon(&arena).compactness());
            trace!(attempt, ?compactness, "patch layout");

            let round_enough = compactness.map_or(true, |c| c >= MIN_CITADEL_COMPACTNESS);
            if round_enough || attempt >= MAX_PATCH_ATTEMPTS {
                if !round_enough {
                    warn!(
                        attempts = attempt,
                        ?compactness,
                        "no round citadel found, keeping the last layout"
                    );
                }
                return Ok(Self {
                    config,
                    plaza_needed,
                    citadel_needed,
                    walls_needed,
                    arena,
                    patches,
                    inner,
                    plaza,
                    citadel,
                    center,
                    border: CurtainWall::default(),
                    gates: Vec::new(),
                    streets: Vec::new(),
                    roads: Vec::new(),
                    arteries: Vec::new(),
                    route_failures: Vec::new(),
                    city_radius: 0.0,
                });
            }
        }
    }

    /// Merge adjacent vertices of city patches that are too close together
    ///
    /// The surviving vertex moves to the midpoint; every other patch using
    /// the dropped vertex is rewired to the survivor.
    fn optimize_junctions(&mut self) {
        let mut targets = self.inner.clone();
        targets.extend(self.citadel);

        let mut to_clean = Vec::new();
        let mut merged = 0usize;
        for &id in &targets {
            let mut index = 0;
            while index < self.patches[id].shape.len() {
                let shape = &self.patches[id].shape;
                let len = shape.len();
                let v0 = shape.at(index);
                let v1 = shape.at((index + 1) % len);

                let p0 = self.arena.get(v0);
                let p1 = self.arena.get(v1);
                if v0 != v1 && len > 3 && p0.distance(p1) < JUNCTION_DISTANCE {
                    for other in self.patches.by_vertex(v1) {
                        if other != id && self.patches[other].shape.replace(v1, v0) {
                            to_clean.push(other);
                        }
                    }
                    self.arena.set(v0, (p0 + p1) / 2.0);
                    self.patches[id].shape.remove(v1);
                    merged += 1;
                }
                index += 1;
            }
        }

        for id in to_clean {
            self.patches[id].shape.dedup_ids();
        }
        debug!(merged, "junctions optimized");
    }

    fn build_walls(&mut self, rng: &mut Random) -> Result<()> {
        let reserved: Vec<VertexId> = self
            .citadel
            .map(|c| self.patches[c].shape.ids().to_vec())
            .unwrap_or_default();

        let inner = self.inner.clone();
        let mut border = CurtainWall::new(
            self.walls_needed,
            &inner,
            &reserved,
            &mut self.patches,
            &mut self.arena,
            rng,
        );
        if self.walls_needed {
            border.build_towers();
        }

        // Drop the far countryside
        let radius = border.radius(&self.arena);
        let center = self.center();
        let arena = &self.arena;
        self.patches
            .retain(|patch| patch.polygon(arena).distance(center) < radius * 3.0);

        self.gates = border.gates.clone();
        self.border = border;

        if let Some(citadel) = self.citadel {
            let castle_reserved: Vec<VertexId> = self.patches[citadel]
                .shape
                .iter()
                .filter(|&v| {
                    self.patches
                        .by_vertex(v)
                        .iter()
                        .any(|&p| !self.patches[p].within_city)
                })
                .collect();

            let mut castle = CurtainWall::new(
                true,
                &[citadel],
                &castle_reserved,
                &mut self.patches,
                &mut self.arena,
                rng,
            );
            castle.build_towers();

            let compactness = self.polygon(citadel).compactness();
            if compactness < MIN_CITADEL_COMPACTNESS {
                return Err(CityError::BadCitadelShape {
                    compactness,
                    min: MIN_CITADEL_COMPACTNESS,
                });
            }

            self.gates.extend(castle.gates.iter().copied());
            self.patches[citadel].ward = Some(Ward::new(WardKind::Castle(Box::new(castle))));
        }

        debug!(
            real = self.border.is_real(),
            radius,
            gates = self.gates.len(),
            patches = self.patches.len(),
            "walls built"
        );
        Ok(())
    }

    fn build_streets(&mut self) {
        let mut blocked: Vec<VertexId> = self
            .citadel
            .map(|c| self.patches[c].shape.ids().to_vec())
            .unwrap_or_default();
        if self.walls_needed {
            blocked.extend(self.border.shape.iter());
        }
        blocked.retain(|v| !self.gates.contains(v));

        let topology = Topology::new(&self.patches, &self.arena, &self.border.shape, &blocked);

        for gate in self.gates.clone() {
            let end = self.street_end(gate);

            let Some(street) = topology.build_path(gate, end, &topology.outer) else {
                warn!(gate = gate.0, "no street from gate to the center");
                self.route_failures.push(RouteFailure {
                    kind: RouteKind::Street,
                    gate,
                });
                continue;
            };
            self.streets.push(street);

            if self.border.gates.contains(&gate) {
                let origin = with_length(self.arena.get(gate), ROAD_ORIGIN_DISTANCE);
                let road = topology
                    .nearest_vertex(origin)
                    .and_then(|start| topology.build_path(start, gate, &topology.inner));
                match road {
                    Some(road) => self.roads.push(road),
                    None => {
                        warn!(gate = gate.0, "no road from the countryside to gate");
                        self.route_failures.push(RouteFailure {
                            kind: RouteKind::Road,
                            gate,
                        });
                    }
                }
            }
        }

        self.tidy_up_roads();

        for artery in &self.arteries {
            let line = Polygon::new(self.arena.resolve(artery));
            let smoothed = line.smooth_vertex_eq(3.0);
            for i in 1..artery.len().saturating_sub(1) {
                self.arena.set(artery[i], smoothed.at(i));
            }
        }

        debug!(
            streets = self.streets.len(),
            roads = self.roads.len(),
            arteries = self.arteries.len(),
            failures = self.route_failures.len(),
            "streets built"
        );
    }

    /// Vertex a street from `gate` leads to: the closest plaza corner, or the
    /// center of the city
    fn street_end(&self, gate: VertexId) -> VertexId {
        let Some(plaza) = self.plaza else {
            return self.center;
        };
        let p = self.arena.get(gate);
        let mut best = self.center;
        let mut best_dist = f64::INFINITY;
        for v in self.patches[plaza].shape.iter() {
            let d = self.arena.get(v).distance(p);
            if d < best_dist {
                best_dist = d;
                best = v;
            }
        }
        best
    }

    /// Merge streets and roads into arteries
    ///
    /// Shared segments are kept once and segments across the plaza are
    /// dropped; the rest is chained end to end.
    fn tidy_up_roads(&mut self) {
        let plaza = self.plaza.map(|p| &self.patches[p].shape);

        let mut segments: Vec<(VertexId, VertexId)> = Vec::new();
        for street in self.streets.iter().chain(&self.roads) {
            for pair in street.windows(2) {
                let (v0, v1) = (pair[0], pair[1]);
                if plaza.is_some_and(|s| s.contains(v0) && s.contains(v1)) {
                    continue;
                }
                if !segments.contains(&(v0, v1)) {
                    segments.push((v0, v1));
                }
            }
        }

        let mut arteries: Vec<Street> = Vec::new();
        while let Some((start, end)) = segments.pop() {
            let mut attached = false;
            for artery in &mut arteries {
                if artery.first() == Some(&end) {
                    artery.insert(0, start);
                    attached = true;
                    break;
                } else if artery.last() == Some(&start) {
                    artery.push(end);
                    attached = true;
                    break;
                }
            }
            if !attached {
                arteries.push(vec![start, end]);
            }
        }

        self.arteries = arteries;
    }

    fn create_wards(&mut self, rng: &mut Random) {
        let mut unassigned = self.inner.clone();

        if let Some(plaza) = self.plaza {
            self.patches[plaza].ward = Some(Ward::new(WardKind::Market));
            unassigned.retain(|&id| id != plaza);
        }

        // Gate districts
        let chance = if self.walls_needed {
            GATE_WARD_CHANCE_WALLED
        } else {
            GATE_WARD_CHANCE_OPEN
        };
        for gate in self.border.gates.clone() {
            for id in self.patches.by_vertex(gate) {
                let patch = &self.patches[id];
                if patch.within_city && patch.ward.is_none() && rng.bool(chance) {
                    self.patches[id].ward = WardKind::draw(WardType::Gate, rng).map(Ward::new);
                    unassigned.retain(|&p| p != id);
                }
            }
        }

        // Fisher-Yates
        let mut wards = WARDS.to_vec();
        for i in (1..wards.len()).rev() {
            let j = rng.index(i + 1);
            wards.swap(i, j);
        }
        let mut queue = wards.into_iter();

        while !unassigned.is_empty() {
            let ward_type = queue.next().unwrap_or(WardType::Slum);

            let rates: Option<Vec<f64>> = unassigned
                .iter()
                .map(|&id| rate_location(ward_type, self, id))
                .collect();
            let index = match rates {
                None => rng.index(unassigned.len()),
                Some(rates) => {
                    let mut best = 0;
                    let mut best_rate = f64::INFINITY;
                    for (i, &rate) in rates.iter().enumerate() {
                        if rate < best_rate {
                            best_rate = rate;
                            best = i;
                        }
                    }
                    best
                }
            };

            let id = unassigned.remove(index);
            self.patches[id].ward = WardKind::draw(ward_type, rng).map(Ward::new);
        }

        // Countryside
        let mut city_radius: f64 = 0.0;
        for id in self.patches.ids().to_vec() {
            let patch = &self.patches[id];
            if patch.within_city {
                for v in patch.shape.iter() {
                    city_radius = city_radius.max(self.arena.get(v).length());
                }
            } else if patch.ward.is_none() {
                let farm = rng.bool(FARM_CHANCE) && self.polygon(id).compactness() >= MIN_FARM_COMPACTNESS;
                let kind = if farm { WardKind::Farm } else { WardKind::Plain };
                self.patches[id].ward = Some(Ward::new(kind));
            }
        }
        self.city_radius = city_radius;

        if tracing::enabled!(tracing::Level::DEBUG) {
            let mut tally: Vec<(&'static str, usize)> = Vec::new();
            for (_, patch) in self.patches.iter() {
                let Some(ward) = &patch.ward else { continue };
                let name = ward.ward_type().name();
                match tally.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, count)) => *count += 1,
                    None => tally.push((name, 1)),
                }
            }
            debug!(?tally, city_radius, "wards created");
        }
    }

    fn build_geometry(&mut self, rng: &mut Random) {
        let mut results = Vec::new();
        for (id, patch) in self.patches.iter() {
            if let Some(ward) = &patch.ward {
                results.push((id, ward.create_geometry(self, id, rng)));
            }
        }

        let mut buildings = 0;
        for (id, (geometry, landmark)) in results {
            if let Some(ward) = self.patches[id].ward.as_mut() {
                buildings += geometry.len();
                ward.geometry = geometry;
                ward.landmark = landmark;
            }
        }
        debug!(buildings, "geometry built");
    }

    /// Get the configuration this city was generated from
    #[inline]
    pub fn config(&self) -> &CityConfig {
        &self.config
    }

    /// Whether the city got a central plaza
    #[inline]
    pub fn plaza_needed(&self) -> bool {
        self.plaza_needed
    }

    /// Whether the city got a citadel
    #[inline]
    pub fn citadel_needed(&self) -> bool {
        self.citadel_needed
    }

    /// Whether the city is walled
    #[inline]
    pub fn walls_needed(&self) -> bool {
        self.walls_needed
    }

    /// Vertex positions shared by every patch
    #[inline]
    pub fn arena(&self) -> &VertexArena {
        &self.arena
    }

    /// Every patch left after the far countryside was dropped
    #[inline]
    pub fn patches(&self) -> &Patches {
        &self.patches
    }

    /// Patches inside the city, without the citadel
    #[inline]
    pub fn inner(&self) -> &[PatchId] {
        &self.inner
    }

    #[inline]
    pub fn plaza(&self) -> Option<PatchId> {
        self.plaza
    }

    #[inline]
    pub fn citadel(&self) -> Option<PatchId> {
        self.citadel
    }

    /// Vertex of the central patch closest to the origin
    #[inline]
    pub fn center_vertex(&self) -> VertexId {
        self.center
    }

    /// Position of the center vertex
    #[inline]
    pub fn center(&self) -> Point {
        self.arena.get(self.center)
    }

    /// Border of the city, real wall or not
    #[inline]
    pub fn border(&self) -> &CurtainWall {
        &self.border
    }

    /// The city wall, if the city is walled
    pub fn wall(&self) -> Option<&CurtainWall> {
        self.walls_needed.then_some(&self.border)
    }

    /// The castle wall around the citadel
    pub fn citadel_wall(&self) -> Option<&CurtainWall> {
        self.citadel
            .and_then(|c| self.patches[c].ward.as_ref())
            .and_then(Ward::castle_wall)
    }

    /// Gates of the city border followed by the castle gates
    #[inline]
    pub fn gates(&self) -> &[VertexId] {
        &self.gates
    }

    /// Streets from the gates to the plaza or the center
    #[inline]
    pub fn streets(&self) -> &[Street] {
        &self.streets
    }

    /// Roads from the countryside to the city gates
    #[inline]
    pub fn roads(&self) -> &[Street] {
        &self.roads
    }

    /// Streets and roads merged into continuous polylines
    #[inline]
    pub fn arteries(&self) -> &[Street] {
        &self.arteries
    }

    /// Routes the pathfinder could not build
    #[inline]
    pub fn route_failures(&self) -> &[RouteFailure] {
        &self.route_failures
    }

    /// Distance from the origin to the farthest vertex of the city
    #[inline]
    pub fn city_radius(&self) -> f64 {
        self.city_radius
    }

    /// Current shape of patch `id`
    pub fn polygon(&self, id: PatchId) -> Polygon {
        self.patches[id].polygon(&self.arena)
    }

    /// Positions of a vertex list
    pub fn resolve(&self, ids: &[VertexId]) -> Vec<Point> {
        self.arena.resolve(ids)
    }

    /// Patches having `v` as a vertex
    pub fn patch_by_vertex(&self, v: VertexId) -> Vec<PatchId> {
        self.patches.by_vertex(v)
    }

    /// Patch across the edge of `id` that starts at `v`
    pub fn get_neighbour(&self, id: PatchId, v: VertexId) -> Option<PatchId> {
        let next = self.patches[id].shape.next(v)?;
        self.patches
            .iter()
            .find(|(_, patch)| patch.shape.find_edge(next, v).is_some())
            .map(|(other, _)| other)
    }

    /// Patches sharing an edge with `id`
    pub fn get_neighbours(&self, id: PatchId) -> Vec<PatchId> {
        let shape = &self.patches[id].shape;
        self.patches
            .iter()
            .filter(|&(other, patch)| other != id && patch.shape.borders(shape))
            .map(|(other, _)| other)
            .collect()
    }

    /// Whether patch `id` is surrounded by the city
    pub fn is_enclosed(&self, id: PatchId) -> bool {
        let patch = &self.patches[id];
        patch.within_city
            && (patch.within_walls
                || self
                    .get_neighbours(id)
                    .iter()
                    .all(|&n| self.patches[n].within_city))
    }
}

fn validate(config: &CityConfig) -> Result<()> {
    if config.seed == 0 || config.seed > MAX_SEED {
        return Err(CityError::InvalidConfig(format!(
            "seed must be in 1..={} (got {})",
            MAX_SEED, config.seed
        )));
    }
    if config.patch_count() < 3 {
        return Err(CityError::InvalidConfig(format!(
            "a city needs at least 3 patches (got {})",
            config.patch_count()
        )));
    }
    Ok(())
}

/// A small city that generates without error
#[cfg(test)]
pub(crate) fn sample_model() -> Model {
    (1..=60)
        .find_map(|seed| generate(15, seed).ok())
        .expect("some seed builds a city")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn no_citadel(seed: u32) -> CityConfig {
        CityConfigBuilder::new()
            .seed(seed)
            .unwrap()
            .citadel(false)
            .build()
            .unwrap()
    }

    #[test]
    fn test_generate_seed_one() {
        match generate(15, 1) {
            Ok(model) => {
                let city = model.patches().iter().filter(|(_, p)| p.within_city).count();
                assert_eq!(city, 15 + usize::from(model.citadel().is_some()));
                assert_eq!(model.inner().len(), 15);
                assert!(!model.gates().is_empty());
            }
            Err(CityError::BadCitadelShape { compactness, min }) => assert!(compactness < min),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_most_seeds_succeed() {
        let ok = (1..=30).filter(|&seed| generate(15, seed).is_ok()).count();
        assert!(ok >= 15, "only {ok} of 30 seeds built a city");
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(generate(2, 1), Err(CityError::InvalidConfig(_))));
        assert!(matches!(generate(15, 0), Err(CityError::InvalidConfig(_))));

        let mut config = no_citadel(5);
        config.seed = 0;
        assert!(matches!(Model::generate(config), Err(CityError::InvalidConfig(_))));
    }

    #[test]
    fn test_determinism() {
        let a = Model::generate(no_citadel(12)).unwrap();
        let b = Model::generate(no_citadel(12)).unwrap();

        assert_eq!(a.patches().ids(), b.patches().ids());
        for &id in a.patches().ids() {
            assert_eq!(a.polygon(id), b.polygon(id));
            let wa = a.patches()[id].ward.as_ref().unwrap();
            let wb = b.patches()[id].ward.as_ref().unwrap();
            assert_eq!(wa.ward_type(), wb.ward_type());
            assert_eq!(wa.geometry, wb.geometry);
        }
        assert_eq!(a.gates(), b.gates());
        assert_eq!(a.arteries(), b.arteries());
    }

    #[test]
    fn test_feature_overrides() {
        let config = CityConfigBuilder::new()
            .seed(3)
            .unwrap()
            .plaza(false)
            .citadel(false)
            .walls(true)
            .build()
            .unwrap();
        let model = Model::generate(config).unwrap();

        assert!(model.plaza().is_none());
        assert!(model.citadel().is_none());
        assert!(model.wall().is_some_and(|w| w.is_real()));
        assert!(model.inner().iter().all(|&id| model.patches()[id].within_walls));

        let config = CityConfigBuilder::new()
            .seed(3)
            .unwrap()
            .plaza(true)
            .citadel(false)
            .walls(false)
            .build()
            .unwrap();
        let model = Model::generate(config).unwrap();

        assert_eq!(model.plaza(), Some(model.inner()[0]));
        assert!(model.wall().is_none());
        assert!(!model.border().is_real());
        let market = model.patches()[model.inner()[0]].ward.as_ref().unwrap();
        assert_eq!(market.ward_type(), WardType::Market);
    }

    #[test]
    fn test_every_patch_has_one_ward() {
        let model = sample_model();
        for (id, patch) in model.patches().iter() {
            let ward = patch.ward.as_ref().unwrap();
            if patch.within_city {
                assert!(!matches!(ward.ward_type(), WardType::Farm | WardType::Plain));
            } else {
                assert!(
                    matches!(ward.ward_type(), WardType::Farm | WardType::Plain),
                    "{:?} outside the city is {:?}",
                    id,
                    ward.ward_type()
                );
            }
        }
        if let Some(citadel) = model.citadel() {
            assert_eq!(model.patches()[citadel].ward.as_ref().unwrap().ward_type(), WardType::Castle);
            assert!(model.citadel_wall().is_some());
        }
    }

    #[test]
    fn test_patch_shapes_have_no_repeated_vertex() {
        let model = sample_model();
        for (_, patch) in model.patches().iter() {
            let ids = patch.shape.ids();
            let unique: HashSet<_> = ids.iter().collect();
            assert_eq!(unique.len(), ids.len());
        }
    }

    fn bare_model(arena: VertexArena, patches: Patches, inner: Vec<PatchId>, center: VertexId) -> Model {
        Model {
            config: no_citadel(1),
            plaza_needed: false,
            citadel_needed: false,
            walls_needed: false,
            arena,
            patches,
            inner,
            plaza: None,
            citadel: None,
            center,
            border: CurtainWall::default(),
            gates: Vec::new(),
            streets: Vec::new(),
            roads: Vec::new(),
            arteries: Vec::new(),
            route_failures: Vec::new(),
            city_radius: 0.0,
        }
    }

    #[test]
    fn test_junctions_are_merged() {
        let mut arena = VertexArena::new();
        let a0 = arena.intern(Point::new(0.0, 0.0));
        let a1 = arena.intern(Point::new(20.0, 0.0));
        let a2 = arena.intern(Point::new(20.0, 20.0));
        let a3 = arena.intern(Point::new(0.0, 20.0));
        let a4 = arena.intern(Point::new(0.0, 17.0));
        let b0 = arena.intern(Point::new(-20.0, 20.0));
        let b1 = arena.intern(Point::new(-20.0, 0.0));

        let mut patches = Patches::new();
        let a = patches.push(Patch::new(vec![a0, a1, a2, a3, a4].into()));
        let b = patches.push(Patch::new(vec![b1, a0, a4, a3, b0].into()));

        let mut model = bare_model(arena, patches, vec![a], a0);
        model.optimize_junctions();

        assert_eq!(model.patches()[a].shape.ids(), &[a0, a1, a2, a3]);
        assert_eq!(model.patches()[b].shape.ids(), &[b1, a0, a3, b0]);
        assert_eq!(model.arena().get(a3), Point::new(0.0, 18.5));
    }

    #[test]
    fn test_junction_merge_keeps_triangles() {
        let mut arena = VertexArena::new();
        let ids: Vec<VertexId> = [(0.0, 0.0), (3.0, 0.0), (0.0, 3.0)]
            .into_iter()
            .map(|(x, y)| arena.intern(Point::new(x, y)))
            .collect();

        let mut patches = Patches::new();
        let a = patches.push(Patch::new(ids.clone().into()));
        let mut model = bare_model(arena, patches, vec![a], ids[0]);
        model.optimize_junctions();

        assert_eq!(model.patches()[a].shape.ids(), ids.as_slice());
    }

    #[test]
    fn test_tidy_up_roads() {
        let mut arena = VertexArena::new();
        let [r, g, x, y] = [0.0, 10.0, 20.0, 30.0].map(|px| arena.intern(Point::new(px, 0.0)));

        let mut model = bare_model(arena, Patches::new(), Vec::new(), g);
        model.streets = vec![vec![g, x, y], vec![g, x]];
        model.roads = vec![vec![r, g]];
        model.tidy_up_roads();

        // The duplicate segment is dropped; chaining only extends at the ends
        assert_eq!(model.arteries(), &[vec![r, g, x], vec![x, y]]);
    }

    #[test]
    fn test_streets_lead_from_gates() {
        let model = sample_model();
        for street in model.streets() {
            assert!(street.len() >= 2);
            assert!(model.gates().contains(&street[0]));
        }
        for road in model.roads() {
            assert!(model.border().gates.contains(road.last().unwrap()));
        }
        assert_eq!(
            model.streets().len() + model.route_failures().iter().filter(|f| f.kind == RouteKind::Street).count(),
            model.gates().len()
        );
    }

    #[test]
    fn test_arteries_have_no_shared_segments() {
        let model = sample_model();
        let mut seen = HashSet::new();
        for artery in model.arteries() {
            assert!(artery.len() >= 2);
            for pair in artery.windows(2) {
                assert!(seen.insert((pair[0], pair[1])), "segment listed twice");
            }
        }
    }

    #[test]
    fn test_neighbour_queries() {
        let model = sample_model();
        for &id in model.inner() {
            for n in model.get_neighbours(id) {
                assert!(model.get_neighbours(n).contains(&id));
            }
            if model.is_enclosed(id) {
                assert!(model.patches()[id].within_city);
            }
            for v in model.patches()[id].shape.iter() {
                if let Some(n) = model.get_neighbour(id, v) {
                    assert_ne!(n, id);
                    assert!(model.get_neighbours(id).contains(&n));
                }
            }
        }
    }

    #[test]
    fn test_city_radius() {
        let model = sample_model();
        assert!(model.city_radius() > 0.0);
        for &id in model.inner() {
            for v in model.patches()[id].shape.iter() {
                assert!(model.arena().get(v).length() <= model.city_radius() + 1e-9);
            }
        }
    }

    #[test]
    fn test_buildings_are_valid_polygons() {
        let model = sample_model();
        let mut total = 0;
        for (_, patch) in model.patches().iter() {
            for building in &patch.ward.as_ref().unwrap().geometry {
                assert!(building.len() >= 3);
                assert!(building.square().abs() > 0.0);
                total += 1;
            }
        }
        assert!(total > 0);
    }
}
