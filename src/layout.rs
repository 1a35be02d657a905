//! Engine-agnostic city layout
//!
//! [`CityLayout`] flattens a [`Model`] into plain polygons and polylines for
//! renderers and exporters. [`generate_layout`] is the named-option front
//! end: a size preset, a seed string and feature toggles that filter the
//! produced layout.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{CityConfigBuilder, CitySize};
use crate::error::Result;
use crate::geom::{Point, Polygon};
use crate::model::Model;
use crate::topology::Street;
use crate::wall::CurtainWall;
use crate::ward::{Landmark, WardType};

/// Tag of the footprint of a market well
pub const WELL_TAG: &str = "well";

/// A building footprint
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    /// `bldg_{tag}_{x}_{y}`, from the first vertex
    pub id: String,
    /// District type name, or `well` for a market well
    pub tag: String,
    pub polygon: Polygon,
    /// Representative door position: the first vertex
    pub entry_point: Point,
}

/// A street or road polyline
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub id: String,
    pub points: Vec<Point>,
}

/// A curtain wall resolved to coordinates
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct WallLayout {
    pub shape: Polygon,
    pub gates: Vec<Point>,
    pub towers: Vec<Point>,
}

impl WallLayout {
    fn new(model: &Model, wall: &CurtainWall) -> Self {
        Self {
            shape: wall.shape.resolve(model.arena()),
            gates: model.resolve(&wall.gates),
            towers: model.resolve(&wall.towers),
        }
    }
}

/// A patch outline with the name of its district
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PatchLayout {
    pub shape: Polygon,
    pub tag: String,
    pub within_city: bool,
}

/// Everything a renderer needs to draw a city
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CityLayout {
    pub seed: u32,
    pub buildings: Vec<Building>,
    /// Streets from the gates to the plaza or the center
    pub streets: Vec<Route>,
    /// Roads from the countryside to the gates
    pub roads: Vec<Route>,
    pub arteries: Vec<Vec<Point>>,
    /// City wall, if the city is walled
    pub wall: Option<WallLayout>,
    pub citadel_wall: Option<WallLayout>,
    pub patches: Vec<PatchLayout>,
}

impl CityLayout {
    /// Flatten a generated city
    ///
    /// # Example
    ///
    /// ```
    /// use rust_voronoi_city::*;
    ///
    /// let config = CityConfigBuilder::new()
    ///     .seed(9)
    ///     .unwrap()
    ///     .citadel(false)
    ///     .build()
    ///     .unwrap();
    /// let model = Model::generate(config).unwrap();
    /// let layout = CityLayout::from_model(&model);
    ///
    /// assert_eq!(layout.seed, 9);
    /// assert!(!layout.buildings.is_empty());
    /// ```
    pub fn from_model(model: &Model) -> Self {
        let mut buildings = Vec::new();
        let mut patches = Vec::with_capacity(model.patches().len());

        for (id, patch) in model.patches().iter() {
            let Some(ward) = &patch.ward else { continue };
            let ward_type = ward.ward_type();

            patches.push(PatchLayout {
                shape: model.polygon(id),
                tag: ward_type.name().to_string(),
                within_city: patch.within_city,
            });

            let tag = if ward_type == WardType::Market && ward.landmark == Some(Landmark::Well) {
                WELL_TAG
            } else {
                ward_type.name()
            };
            for polygon in &ward.geometry {
                let Some(&entry_point) = polygon.vertices.first() else { continue };
                buildings.push(Building {
                    id: format!("bldg_{}_{}_{}", tag, entry_point.x, entry_point.y),
                    tag: tag.to_string(),
                    polygon: polygon.clone(),
                    entry_point,
                });
            }
        }

        let routes = |prefix: &str, streets: &[Street]| -> Vec<Route> {
            streets
                .iter()
                .map(|street| {
                    let points = model.resolve(street);
                    let id = match points.first() {
                        Some(p) => format!("{}_{}_{}", prefix, p.x, p.y),
                        None => prefix.to_string(),
                    };
                    Route { id, points }
                })
                .collect()
        };

        Self {
            seed: model.config().seed,
            buildings,
            streets: routes("street", model.streets()),
            roads: routes("road", model.roads()),
            arteries: model.arteries().iter().map(|a| model.resolve(a)).collect(),
            wall: model.wall().map(|w| WallLayout::new(model, w)),
            citadel_wall: model.citadel_wall().map(|w| WallLayout::new(model, w)),
            patches,
        }
    }

    /// Buildings carrying `tag`
    pub fn buildings_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Building> + 'a {
        self.buildings.iter().filter(move |b| b.tag == tag)
    }
}

/// Named options of [`generate_layout`]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    pub size: CitySize,
    /// Any string; see [`seed_from_str`](crate::config::seed_from_str)
    pub seed: String,
    pub include_farmland: bool,
    pub include_market: bool,
    /// Without walls both the city wall and the castle wall are dropped
    pub include_walls: bool,
    pub include_wells: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            size: CitySize::Small,
            seed: String::from("1"),
            include_farmland: true,
            include_market: true,
            include_walls: true,
            include_wells: true,
        }
    }
}

/// Generate a city and flatten it, filtered by the options' toggles
///
/// The toggles only filter the finished layout: turning one off never
/// changes the rest of the city.
///
/// # Errors
///
/// Same as [`Model::generate`].
///
/// # Example
///
/// ```
/// use rust_voronoi_city::*;
///
/// let options = LayoutOptions {
///     seed: "Harrowgate".into(),
///     include_farmland: false,
///     ..LayoutOptions::default()
/// };
/// if let Ok(layout) = generate_layout(&options) {
///     assert!(layout.buildings.iter().all(|b| b.tag != "farm"));
/// }
/// ```
pub fn generate_layout(options: &LayoutOptions) -> Result<CityLayout> {
    let config = CityConfigBuilder::new()
        .seed_str(&options.seed)
        .size(options.size)
        .build()?;
    let model = Model::generate(config)?;
    let mut layout = CityLayout::from_model(&model);

    let farm = WardType::Farm.name();
    let market = WardType::Market.name();
    layout.buildings.retain(|b| {
        (options.include_farmland || b.tag != farm)
            && (options.include_market || b.tag != market)
            && (options.include_wells || b.tag != WELL_TAG)
    });
    if !options.include_walls {
        layout.wall = None;
        layout.citadel_wall = None;
    }

    Ok(layout)
}
