//! Voronoi-based medieval city generation
//!
//! A standalone library that grows a city layout from a numeric seed: patch
//! tessellation, curtain walls and gates, A* street routing and per-district
//! building footprints. The output is plain geometry, suitable for any
//! renderer or game engine.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rust_voronoi_city::*;
//!
//! // Generate a city
//! let config = CityConfigBuilder::new()
//!     .seed(42).unwrap()
//!     .size(CitySize::Medium)
//!     .walls(true)
//!     .build().unwrap();
//!
//! let model = Model::generate(config).unwrap();
//!
//! // Flatten it for drawing
//! let layout = CityLayout::from_model(&model);
//! println!("Generated {} buildings", layout.buildings.len());
//! ```
//!
//! Generation is deterministic: the same configuration always yields the
//! same city. A run may fail with [`CityError::BadCitadelShape`] when the
//! castle wall deforms the citadel; retrying with another seed is the usual
//! answer.
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) nearest-vertex lookups using KD-tree
//! - `serde`: Enables serialization support for configuration, polygons and layouts

// Modules
pub mod error;
pub mod config;
pub mod random;
pub mod geom;
pub mod generation;
pub mod vertex;
pub mod patch;
pub mod wall;
pub mod topology;
pub mod ward;
pub mod model;
pub mod layout;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{CityError, Result};
pub use config::{seed_from_str, CityConfig, CityConfigBuilder, CitySize};
pub use random::Random;
pub use geom::{Point, Polygon};
pub use vertex::{Outline, VertexArena, VertexId};
pub use patch::{Patch, PatchId, Patches};
pub use wall::CurtainWall;
pub use topology::{Street, Topology};
pub use ward::{Landmark, Ward, WardKind, WardType};
pub use model::{generate, Model, RouteFailure, RouteKind};
pub use layout::{generate_layout, Building, CityLayout, LayoutOptions, Route, WallLayout};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;
