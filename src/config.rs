//! City Configuration and Builder
//!
//! This module provides configuration types for deterministic city generation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CityError, Result};
use crate::random::MAX_SEED;

/// Maximum number of Lloyd relaxation passes accepted by the builder
pub const MAX_RELAX_ITERATIONS: usize = 20;

/// City size presets
///
/// Each size maps to the number of patches inside the city; the countryside
/// around it is generated on top of that count.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CitySize {
    /// Village: 15 patches
    #[default]
    Small,
    /// Town: 24 patches
    Medium,
    /// City: 40 patches
    Large,
    /// Custom patch count
    Custom {
        /// Number of patches inside the city
        patches: usize,
    },
}

impl CitySize {
    /// Number of patches inside the city for this size
    pub fn patch_count(self) -> usize {
        match self {
            CitySize::Small => 15,
            CitySize::Medium => 24,
            CitySize::Large => 40,
            CitySize::Custom { patches } => patches,
        }
    }

    /// Human-readable name for this size
    pub fn name(self) -> &'static str {
        match self {
            CitySize::Small => "Small",
            CitySize::Medium => "Medium",
            CitySize::Large => "Large",
            CitySize::Custom { .. } => "Custom",
        }
    }
}

/// Configuration for deterministic city generation
///
/// The same configuration always produces the identical city: every random
/// decision is drawn from a single stream seeded with `seed`.
///
/// # Feature overrides
///
/// `plaza`, `citadel` and `walls` force a feature on or off. The random draw
/// for each feature still happens (plaza, then citadel, then walls), so
/// overriding one of them leaves the rest of the city unchanged wherever the
/// feature itself does not reach.
///
/// # Example
///
/// ```rust
/// use rust_voronoi_city::*;
///
/// let config = CityConfigBuilder::new()
///     .seed(42)
///     .unwrap()
///     .size(CitySize::Medium)
///     .walls(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.patch_count(), 24);
///
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: CityConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityConfig {
    /// Seed of the random stream, in `1..=2147483646`
    pub seed: u32,

    /// Size preset (determines the number of city patches)
    pub size: CitySize,

    /// Lloyd relaxation passes applied to the central seeds
    ///
    /// - 0: the raw spiral seed cloud (default)
    /// - 1-3: rounder plaza and citadel cells
    pub relax_iterations: usize,

    /// Force a central plaza on or off
    pub plaza: Option<bool>,

    /// Force a citadel on or off
    pub citadel: Option<bool>,

    /// Force curtain walls on or off
    pub walls: Option<bool>,
}

impl CityConfig {
    /// Number of patches inside the city
    #[inline]
    pub fn patch_count(&self) -> usize {
        self.size.patch_count()
    }
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            seed: rand::random::<u32>() % MAX_SEED + 1,
            size: CitySize::default(),
            relax_iterations: 0,
            plaza: None,
            citadel: None,
            walls: None,
        }
    }
}

/// Builder for creating CityConfig with validation
///
/// # Example
///
/// ```rust
/// use rust_voronoi_city::*;
///
/// // Use defaults (random seed, small city)
/// let config = CityConfigBuilder::new().build().unwrap();
///
/// // Customize
/// let config = CityConfigBuilder::new()
///     .seed_str("Riverbend")
///     .size(CitySize::Custom { patches: 30 })
///     .relax_iterations(2)
///     .unwrap()
///     .citadel(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct CityConfigBuilder {
    seed: Option<u32>,
    size: CitySize,
    relax_iterations: usize,
    plaza: Option<bool>,
    citadel: Option<bool>,
    walls: Option<bool>,
}

impl CityConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random (generated from thread_rng)
    /// - size: Small (15 patches)
    /// - relax_iterations: 0
    /// - plaza, citadel, walls: decided by the random stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the seed of the random stream
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the seed is outside `1..=2147483646`
    pub fn seed(mut self, seed: u32) -> Result<Self> {
        if seed == 0 || seed > MAX_SEED {
            return Err(CityError::InvalidConfig(format!(
                "seed must be in 1..={} (got {})",
                MAX_SEED, seed
            )));
        }
        self.seed = Some(seed);
        Ok(self)
    }

    /// Derive the seed from a string
    ///
    /// See [`seed_from_str`] for the mapping.
    pub fn seed_str(mut self, seed: &str) -> Self {
        self.seed = Some(seed_from_str(seed));
        self
    }

    /// Set the size preset
    pub fn size(mut self, size: CitySize) -> Self {
        self.size = size;
        self
    }

    /// Set the number of Lloyd relaxation passes
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if iterations > 20
    pub fn relax_iterations(mut self, iterations: usize) -> Result<Self> {
        if iterations > MAX_RELAX_ITERATIONS {
            return Err(CityError::InvalidConfig(format!(
                "relax iterations must be <= {} (got {})",
                MAX_RELAX_ITERATIONS, iterations
            )));
        }
        self.relax_iterations = iterations;
        Ok(self)
    }

    /// Force the central plaza on or off
    pub fn plaza(mut self, enabled: bool) -> Self {
        self.plaza = Some(enabled);
        self
    }

    /// Force the citadel on or off
    pub fn citadel(mut self, enabled: bool) -> Self {
        self.citadel = Some(enabled);
        self
    }

    /// Force the curtain walls on or off
    pub fn walls(mut self, enabled: bool) -> Self {
        self.walls = Some(enabled);
        self
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random seed using thread_rng.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the size has fewer than 3 patches
    pub fn build(self) -> Result<CityConfig> {
        let patches = self.size.patch_count();
        if patches < 3 {
            return Err(CityError::InvalidConfig(format!(
                "a city needs at least 3 patches (got {})",
                patches
            )));
        }

        let seed = self
            .seed
            .unwrap_or_else(|| rand::random::<u32>() % MAX_SEED + 1);

        Ok(CityConfig {
            seed,
            size: self.size,
            relax_iterations: self.relax_iterations,
            plaza: self.plaza,
            citadel: self.citadel,
            walls: self.walls,
        })
    }
}

/// Map a seed string to a numeric seed
///
/// Decimal strings that are valid seeds are used as-is, so `"1234"` and
/// `1234` name the same city. Anything else is hashed with 32-bit FNV-1a and
/// folded into the valid seed range.
pub fn seed_from_str(seed: &str) -> u32 {
    if let Ok(n) = seed.trim().parse::<u32>() {
        if (1..=MAX_SEED).contains(&n) {
            return n;
        }
    }

    let mut hash: u32 = 0x811c_9dc5;
    for byte in seed.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash % MAX_SEED + 1
}
