//! Feature synthesis from a crop profile.
//!
//! Each profiled feature is drawn independently and uniformly from its closed
//! range, rounded (pH to two decimals, everything else to one) and clamped
//! back into the range. Organic carbon is drawn from a fixed range, and soil
//! moisture is a fixed fraction of the sampled humidity.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    features::{Feature, FeatureSet, round_to},
    profile::{Bounds, CropProfile},
};

pub const ORGANIC_CARBON: Bounds = Bounds::new(0.3, 0.8);
pub const SOIL_MOISTURE_PER_HUMIDITY: f64 = 0.45;

pub fn synthesize<R: Rng + ?Sized>(profile: &CropProfile, rng: &mut R) -> FeatureSet {
    let mut features = FeatureSet::default();
    for feature in Feature::PROFILED {
        if let Some(bounds) = profile.bounds(feature) {
            features.set(feature, sample(rng, bounds, feature.decimals()));
        }
    }
    features.organic_carbon = round_to(
        rng.gen_range(ORGANIC_CARBON.min..=ORGANIC_CARBON.max),
        Feature::OrganicCarbon.decimals(),
    );
    features.soil_moisture = soil_moisture_for(features.humidity);
    features
}

/// Soil moisture implied by a humidity reading.
pub fn soil_moisture_for(humidity: f64) -> f64 {
    round_to(humidity * SOIL_MOISTURE_PER_HUMIDITY, 1)
}

fn sample<R: Rng + ?Sized>(rng: &mut R, bounds: Bounds, decimals: u32) -> f64 {
    let raw = rng.gen_range(bounds.min..=bounds.max);
    bounds.clamp(round_to(raw, decimals))
}

/// Generator for one dataset row, seeded from the run seed plus the row
/// index so every row draws the same values whichever thread processes it.
pub fn row_rng(seed: u64, row: usize) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(row as u64))
}
