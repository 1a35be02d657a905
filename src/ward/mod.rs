//! Wards: the districts of a city
//!
//! Every patch is eventually assigned a ward. The ward decides how the
//! patch's buildable block is turned into building footprints, how desirable
//! a patch is for that kind of district, and how the district is labelled.

mod block;
mod rate;
mod subdivide;

pub use block::{city_block, filter_outskirts};
pub use rate::rate_location;
pub use subdivide::{create_alleys, create_ortho_building};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f64::consts::PI;

use crate::geom::cutter;
use crate::geom::Polygon;
use crate::model::Model;
use crate::patch::PatchId;
use crate::random::Random;
use crate::wall::CurtainWall;

/// Width of a main street (wall ring, plaza front, arteries)
pub const MAIN_STREET: f64 = 2.0;

/// Width of an ordinary street between patches inside the walls
pub const REGULAR_STREET: f64 = 1.0;

/// Width of an alley between buildings
pub const ALLEY: f64 = 0.6;

/// Kind of district, without parameters
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WardType {
    Craftsmen,
    Merchant,
    Gate,
    Patriciate,
    Slum,
    Castle,
    Cathedral,
    Farm,
    Market,
    Military,
    Park,
    Administration,
    /// Countryside without any embellishment
    Plain,
}

impl WardType {
    /// Lowercase tag, used for building ids and layout tags
    pub fn name(self) -> &'static str {
        match self {
            WardType::Craftsmen => "craftsmen",
            WardType::Merchant => "merchant",
            WardType::Gate => "gate",
            WardType::Patriciate => "patriciate",
            WardType::Slum => "slum",
            WardType::Castle => "castle",
            WardType::Cathedral => "cathedral",
            WardType::Farm => "farm",
            WardType::Market => "market",
            WardType::Military => "military",
            WardType::Park => "park",
            WardType::Administration => "administration",
            WardType::Plain => "plain",
        }
    }

    /// Display label; the plain countryside has none
    pub fn label(self) -> Option<&'static str> {
        match self {
            WardType::Craftsmen => Some("Craftsmen"),
            WardType::Merchant => Some("Merchant"),
            WardType::Gate => Some("Gate"),
            WardType::Patriciate => Some("Patriciate"),
            WardType::Slum => Some("Slum"),
            WardType::Castle => Some("Castle"),
            WardType::Cathedral => Some("Temple"),
            WardType::Farm => Some("Farm"),
            WardType::Market => Some("Market"),
            WardType::Military => Some("Military"),
            WardType::Park => Some("Park"),
            WardType::Administration => Some("Administration"),
            WardType::Plain => None,
        }
    }
}

/// Parameters of the alley-subdivided districts
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommonParams {
    /// Typical building area
    pub min_sq: f64,

    /// How far cuts stray from the middle and from the perpendicular
    pub grid_chaos: f64,

    /// How much building sizes vary around `min_sq`
    pub size_chaos: f64,

    /// Probability of leaving a lot empty
    pub empty_prob: f64,
}

impl CommonParams {
    /// Draw the parameters of a common district type
    ///
    /// Returns `None` for district types that are not alley-subdivided.
    pub fn draw(ward_type: WardType, rng: &mut Random) -> Option<Self> {
        let (base, spread, chaos_base, chaos_spread, size_chaos, empty_prob) = match ward_type {
            WardType::Craftsmen => (10.0, 80.0, 0.5, 0.2, 0.6, 0.04),
            WardType::Gate => (10.0, 50.0, 0.5, 0.3, 0.7, 0.04),
            WardType::Merchant => (50.0, 60.0, 0.5, 0.3, 0.7, 0.15),
            WardType::Patriciate => (80.0, 30.0, 0.5, 0.3, 0.8, 0.2),
            WardType::Slum => (10.0, 30.0, 0.6, 0.4, 0.8, 0.03),
            _ => return None,
        };

        let min_sq = base + spread * rng.float() * rng.float();
        let grid_chaos = chaos_base + rng.float() * chaos_spread;
        Some(Self {
            min_sq,
            grid_chaos,
            size_chaos,
            empty_prob,
        })
    }
}

/// District together with the parameters it was drawn with
#[derive(Debug, Clone)]
pub enum WardKind {
    Craftsmen(CommonParams),
    Merchant(CommonParams),
    Gate(CommonParams),
    Patriciate(CommonParams),
    Slum(CommonParams),
    /// Citadel, with its own wall
    Castle(Box<CurtainWall>),
    Cathedral,
    Farm,
    Market,
    Military,
    Park,
    Administration,
    Plain,
}

impl WardKind {
    /// Draw a district of the given type
    ///
    /// A castle needs its wall and cannot be drawn; `None` is returned for it.
    pub fn draw(ward_type: WardType, rng: &mut Random) -> Option<Self> {
        let kind = match ward_type {
            WardType::Craftsmen => WardKind::Craftsmen(CommonParams::draw(ward_type, rng)?),
            WardType::Merchant => WardKind::Merchant(CommonParams::draw(ward_type, rng)?),
            WardType::Gate => WardKind::Gate(CommonParams::draw(ward_type, rng)?),
            WardType::Patriciate => WardKind::Patriciate(CommonParams::draw(ward_type, rng)?),
            WardType::Slum => WardKind::Slum(CommonParams::draw(ward_type, rng)?),
            WardType::Castle => return None,
            WardType::Cathedral => WardKind::Cathedral,
            WardType::Farm => WardKind::Farm,
            WardType::Market => WardKind::Market,
            WardType::Military => WardKind::Military,
            WardType::Park => WardKind::Park,
            WardType::Administration => WardKind::Administration,
            WardType::Plain => WardKind::Plain,
        };
        Some(kind)
    }

    pub fn ward_type(&self) -> WardType {
        match self {
            WardKind::Craftsmen(_) => WardType::Craftsmen,
            WardKind::Merchant(_) => WardType::Merchant,
            WardKind::Gate(_) => WardType::Gate,
            WardKind::Patriciate(_) => WardType::Patriciate,
            WardKind::Slum(_) => WardType::Slum,
            WardKind::Castle(_) => WardType::Castle,
            WardKind::Cathedral => WardType::Cathedral,
            WardKind::Farm => WardType::Farm,
            WardKind::Market => WardType::Market,
            WardKind::Military => WardType::Military,
            WardKind::Park => WardType::Park,
            WardKind::Administration => WardType::Administration,
            WardKind::Plain => WardType::Plain,
        }
    }

    /// Parameters of the alley-subdivided districts
    pub fn common_params(&self) -> Option<&CommonParams> {
        match self {
            WardKind::Craftsmen(p)
            | WardKind::Merchant(p)
            | WardKind::Gate(p)
            | WardKind::Patriciate(p)
            | WardKind::Slum(p) => Some(p),
            _ => None,
        }
    }
}

/// Notable object placed on a market square
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landmark {
    Statue,
    Well,
}

/// Ward assigned to a patch, with its generated footprints
#[derive(Debug, Clone)]
pub struct Ward {
    kind: WardKind,

    /// Building footprints
    pub geometry: Vec<Polygon>,

    /// Object placed on a market square
    pub landmark: Option<Landmark>,
}

impl Ward {
    pub fn new(kind: WardKind) -> Self {
        Self {
            kind,
            geometry: Vec::new(),
            landmark: None,
        }
    }

    #[inline]
    pub fn kind(&self) -> &WardKind {
        &self.kind
    }

    #[inline]
    pub fn ward_type(&self) -> WardType {
        self.kind.ward_type()
    }

    #[inline]
    pub fn label(&self) -> Option<&'static str> {
        self.ward_type().label()
    }

    /// Wall of a castle
    pub fn castle_wall(&self) -> Option<&CurtainWall> {
        match &self.kind {
            WardKind::Castle(wall) => Some(wall),
            _ => None,
        }
    }

    /// Generate the footprints of the ward on patch `id`
    ///
    /// Returns the footprints and, for a market, the object placed on it.
    /// Degenerate polygons never make it into the result.
    pub fn create_geometry(&self, model: &Model, id: PatchId, rng: &mut Random) -> (Vec<Polygon>, Option<Landmark>) {
        let mut landmark = None;

        let geometry = match &self.kind {
            WardKind::Craftsmen(params)
            | WardKind::Merchant(params)
            | WardKind::Gate(params)
            | WardKind::Patriciate(params)
            | WardKind::Slum(params) => {
                let block = city_block(model, id);
                let buildings = create_alleys(
                    &block,
                    params.min_sq,
                    params.grid_chaos,
                    params.size_chaos,
                    params.empty_prob,
                    true,
                    rng,
                );
                if model.is_enclosed(id) {
                    buildings
                } else {
                    filter_outskirts(model, id, buildings, rng)
                }
            }

            WardKind::Castle(_) => {
                let block = model.polygon(id).shrink_eq(MAIN_STREET * 2.0);
                let min_sq = block.square().max(0.0).sqrt() * 4.0;
                create_ortho_building(&block, min_sq, 0.6, rng)
            }

            WardKind::Cathedral => {
                let block = city_block(model, id);
                if rng.bool(0.4) {
                    cutter::ring(&block, 2.0 + rng.float() * 4.0)
                } else {
                    create_ortho_building(&block, 50.0, 0.8, rng)
                }
            }

            WardKind::Farm => {
                let shape = model.polygon(id);
                if shape.is_empty() {
                    Vec::new()
                } else {
                    let corner = shape.vertices[rng.index(shape.len())];
                    let pos = corner.lerp(shape.centroid(), 0.3 + rng.float() * 0.4);

                    let mut housing = Polygon::rect(4.0, 4.0);
                    housing.rotate(rng.float() * PI);
                    housing.offset(pos);
                    create_ortho_building(&housing, 8.0, 0.5, rng)
                }
            }

            WardKind::Market => {
                let shape = model.polygon(id);
                let statue = rng.bool(0.6);
                let offset = statue || rng.bool(0.3);

                let edge = if statue || offset {
                    shape.longest_edge().map(|i| (shape.at(i), shape.at(i + 1)))
                } else {
                    None
                };

                let mut object = if statue {
                    landmark = Some(Landmark::Statue);
                    let mut rect = Polygon::rect(1.0 + rng.float(), 1.0 + rng.float());
                    if let Some((v0, v1)) = edge {
                        rect.rotate((v1.y - v0.y).atan2(v1.x - v0.x));
                    }
                    rect
                } else {
                    landmark = Some(Landmark::Well);
                    Polygon::circle(1.0 + rng.float())
                };

                let centroid = shape.centroid();
                match edge.filter(|_| offset) {
                    Some((v0, v1)) => {
                        let gravity = v0.lerp(v1, 0.5);
                        object.offset(centroid.lerp(gravity, 0.2 + rng.float() * 0.4));
                    }
                    None => object.offset(centroid),
                }
                vec![object]
            }

            WardKind::Military => {
                let block = city_block(model, id);
                let min_sq = block.square().max(0.0).sqrt() * (1.0 + rng.float());
                let grid_chaos = 0.1 + rng.float() * 0.3;
                create_alleys(&block, min_sq, grid_chaos, 0.3, 0.25, true, rng)
            }

            WardKind::Park => {
                let block = city_block(model, id);
                if block.compactness() >= 0.7 {
                    cutter::radial(&block, None, ALLEY)
                } else {
                    cutter::semi_radial(&block, None, ALLEY)
                }
            }

            WardKind::Administration | WardKind::Plain => Vec::new(),
        };

        (sanitize(geometry), landmark)
    }
}

/// Drop polygons that cannot be drawn as a footprint
fn sanitize(mut geometry: Vec<Polygon>) -> Vec<Polygon> {
    geometry.retain(|p| p.len() >= 3 && p.square().abs() > 1e-9);
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;

    #[test]
    fn test_common_params_ranges() {
        let mut rng = Random::new(77);
        for _ in 0..50 {
            let p = CommonParams::draw(WardType::Craftsmen, &mut rng).unwrap();
            assert!((10.0..90.0).contains(&p.min_sq));
            assert!((0.5..0.7).contains(&p.grid_chaos));
            assert_eq!(p.size_chaos, 0.6);
            assert_eq!(p.empty_prob, 0.04);

            let p = CommonParams::draw(WardType::Slum, &mut rng).unwrap();
            assert!((10.0..40.0).contains(&p.min_sq));
            assert!((0.6..1.0).contains(&p.grid_chaos));
            assert_eq!(p.empty_prob, 0.03);
        }
        assert!(CommonParams::draw(WardType::Park, &mut rng).is_none());
    }

    #[test]
    fn test_common_params_draw_order() {
        let mut a = Random::new(5);
        let p = CommonParams::draw(WardType::Merchant, &mut a).unwrap();

        let mut b = Random::new(5);
        let (f1, f2, f3) = (b.float(), b.float(), b.float());
        assert_eq!(p.min_sq, 50.0 + 60.0 * f1 * f2);
        assert_eq!(p.grid_chaos, 0.5 + f3 * 0.3);
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_draw_kinds() {
        let mut rng = Random::new(1);
        for t in [
            WardType::Craftsmen,
            WardType::Merchant,
            WardType::Gate,
            WardType::Patriciate,
            WardType::Slum,
            WardType::Cathedral,
            WardType::Farm,
            WardType::Market,
            WardType::Military,
            WardType::Park,
            WardType::Administration,
            WardType::Plain,
        ] {
            let kind = WardKind::draw(t, &mut rng).unwrap();
            assert_eq!(kind.ward_type(), t);
        }
        assert!(WardKind::draw(WardType::Castle, &mut rng).is_none());
    }

    #[test]
    fn test_labels() {
        assert_eq!(WardType::Cathedral.label(), Some("Temple"));
        assert_eq!(WardType::Plain.label(), None);
        assert_eq!(Ward::new(WardKind::Park).label(), Some("Park"));
        assert_eq!(WardType::Administration.name(), "administration");
    }

    #[test]
    fn test_sanitize_drops_degenerate() {
        let good = Polygon::rect(2.0, 2.0);
        let flat = Polygon::new(vec![Point::ZERO, Point::new(1.0, 0.0), Point::new(2.0, 0.0)]);
        let short = Polygon::new(vec![Point::ZERO, Point::new(1.0, 0.0)]);
        assert_eq!(sanitize(vec![good.clone(), flat, short]), vec![good]);
    }
}
