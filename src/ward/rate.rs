//! Location preferences of the districts
//!
//! A rating scores how well a patch suits a district type; lower is better.
//! District types without a preference are placed at random.

use crate::model::Model;
use crate::patch::PatchId;

use super::WardType;

/// Score of patch `id` for a district of type `ward_type`
///
/// `None` means the district type has no preference.
pub fn rate_location(ward_type: WardType, model: &Model, id: PatchId) -> Option<f64> {
    let patches = model.patches();
    let patch = &patches[id];
    let shape = model.polygon(id);
    let area = shape.square();

    let plaza = model.plaza();
    let hub = match plaza {
        Some(plaza) => model.polygon(plaza).center(),
        None => model.center(),
    };

    let rate = match ward_type {
        WardType::Castle => {
            if area > 400.0 && area < 900.0 {
                1.0
            } else {
                0.0
            }
        }

        WardType::Cathedral => match plaza {
            Some(plaza) if patch.shape.borders(&patches[plaza].shape) => -1.0 / area,
            _ => shape.distance(hub) * area,
        },

        WardType::Market => {
            let market_nearby = model.inner().iter().any(|&p| {
                patches[p]
                    .ward
                    .as_ref()
                    .is_some_and(|w| w.ward_type() == WardType::Market)
                    && patches[p].shape.borders(&patch.shape)
            });
            if market_nearby {
                f64::INFINITY
            } else {
                match plaza {
                    Some(plaza) => area / model.polygon(plaza).square(),
                    None => shape.distance(model.center()),
                }
            }
        }

        WardType::Merchant => shape.distance(hub),

        WardType::Military => {
            let citadel = model.citadel();
            let wall = model.wall();
            if citadel.is_some_and(|c| patches[c].shape.borders(&patch.shape)) {
                0.0
            } else if wall.is_some_and(|w| w.borders(id, patch)) {
                1.0
            } else if citadel.is_none() && wall.is_none() {
                0.0
            } else {
                f64::INFINITY
            }
        }

        WardType::Patriciate => {
            let mut rate = 0.0;
            for (_, other) in patches.iter() {
                let Some(ward) = &other.ward else { continue };
                if other.shape.borders(&patch.shape) {
                    match ward.ward_type() {
                        WardType::Park => rate -= 1.0,
                        WardType::Slum => rate += 1.0,
                        _ => {}
                    }
                }
            }
            rate
        }

        WardType::Slum => -shape.distance(hub),

        WardType::Administration => match plaza {
            Some(plaza) if patch.shape.borders(&patches[plaza].shape) => 0.0,
            Some(_) => shape.distance(hub),
            None => shape.distance(model.center()),
        },

        WardType::Craftsmen | WardType::Gate | WardType::Farm | WardType::Park | WardType::Plain => {
            return None;
        }
    };

    Some(rate)
}
