//! The nine soil and weather features shared by the dataset, the profile
//! table, and the downstream classifier.
//!
//! [`Feature::ALL`] is the column order a classifier is trained and scored
//! on; the corrected dataset is written with exactly these column names.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Feature {
    Nitrogen,
    Phosphorus,
    Potassium,
    Ph,
    OrganicCarbon,
    SoilMoisture,
    Temperature,
    Humidity,
    Rainfall,
}

impl Feature {
    /// Downstream classifier order.
    pub const ALL: [Feature; 9] = [
        Feature::Nitrogen,
        Feature::Phosphorus,
        Feature::Potassium,
        Feature::Ph,
        Feature::OrganicCarbon,
        Feature::SoilMoisture,
        Feature::Temperature,
        Feature::Humidity,
        Feature::Rainfall,
    ];

    /// Features carried by a crop profile, in sampling order.
    pub const PROFILED: [Feature; 7] = [
        Feature::Nitrogen,
        Feature::Phosphorus,
        Feature::Potassium,
        Feature::Temperature,
        Feature::Humidity,
        Feature::Ph,
        Feature::Rainfall,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Feature::Nitrogen => "N",
            Feature::Phosphorus => "P",
            Feature::Potassium => "K",
            Feature::Ph => "pH",
            Feature::OrganicCarbon => "organic_carbon",
            Feature::SoilMoisture => "soil_moisture",
            Feature::Temperature => "temperature_c",
            Feature::Humidity => "humidity_pct",
            Feature::Rainfall => "rainfall_mm",
        }
    }

    pub fn from_column(name: &str) -> Option<Feature> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.column() == name)
    }

    /// Position within [`Feature::ALL`].
    pub fn index(self) -> usize {
        match self {
            Feature::Nitrogen => 0,
            Feature::Phosphorus => 1,
            Feature::Potassium => 2,
            Feature::Ph => 3,
            Feature::OrganicCarbon => 4,
            Feature::SoilMoisture => 5,
            Feature::Temperature => 6,
            Feature::Humidity => 7,
            Feature::Rainfall => 8,
        }
    }

    /// Decimal places kept when a value for this feature is synthesized.
    pub fn decimals(self) -> u32 {
        match self {
            Feature::Ph | Feature::OrganicCarbon => 2,
            _ => 1,
        }
    }

    pub fn is_profiled(self) -> bool {
        !matches!(self, Feature::OrganicCarbon | Feature::SoilMoisture)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One concrete value per feature.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureSet {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub ph: f64,
    pub organic_carbon: f64,
    pub soil_moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
}

impl FeatureSet {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Nitrogen => self.nitrogen,
            Feature::Phosphorus => self.phosphorus,
            Feature::Potassium => self.potassium,
            Feature::Ph => self.ph,
            Feature::OrganicCarbon => self.organic_carbon,
            Feature::SoilMoisture => self.soil_moisture,
            Feature::Temperature => self.temperature,
            Feature::Humidity => self.humidity,
            Feature::Rainfall => self.rainfall,
        }
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        let slot = match feature {
            Feature::Nitrogen => &mut self.nitrogen,
            Feature::Phosphorus => &mut self.phosphorus,
            Feature::Potassium => &mut self.potassium,
            Feature::Ph => &mut self.ph,
            Feature::OrganicCarbon => &mut self.organic_carbon,
            Feature::SoilMoisture => &mut self.soil_moisture,
            Feature::Temperature => &mut self.temperature,
            Feature::Humidity => &mut self.humidity,
            Feature::Rainfall => &mut self.rainfall,
        };
        *slot = value;
    }

    /// Values in [`Feature::ALL`] order.
    pub fn to_vector(&self) -> [f64; 9] {
        Feature::ALL.map(|feature| self.get(feature))
    }

    pub fn from_vector(values: [f64; 9]) -> Self {
        let mut set = FeatureSet::default();
        for (feature, value) in Feature::ALL.into_iter().zip(values) {
            set.set(feature, value);
        }
        set
    }
}

/// Rounds half-to-even on the exact decimal expansion of `value`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    match Decimal::from_f64_retain(value) {
        Some(exact) => exact
            .round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven)
            .to_f64()
            .unwrap_or(value),
        None => value,
    }
}

/// Text written to a dataset cell; whole numbers keep one decimal (`60.0`).
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_follow_classifier_order() {
        let columns = Feature::ALL.map(Feature::column);
        assert_eq!(
            columns,
            [
                "N",
                "P",
                "K",
                "pH",
                "organic_carbon",
                "soil_moisture",
                "temperature_c",
                "humidity_pct",
                "rainfall_mm"
            ]
        );
        for (idx, feature) in Feature::ALL.into_iter().enumerate() {
            assert_eq!(feature.index(), idx);
            assert_eq!(Feature::from_column(feature.column()), Some(feature));
        }
        assert_eq!(Feature::from_column("ph"), None);
    }

    #[test]
    fn round_to_matches_decimal_reading() {
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(2.675, 2), 2.67);
        assert_eq!(round_to(84.25, 1), 84.2);
        assert_eq!(round_to(84.26, 1), 84.3);
        assert_eq!(round_to(-3.25, 1), -3.2);
        assert_eq!(round_to(-3.45, 1), -3.5);
    }

    #[test]
    fn format_value_keeps_one_decimal_for_whole_numbers() {
        assert_eq!(format_value(60.0), "60.0");
        assert_eq!(format_value(6.45), "6.45");
        assert_eq!(format_value(37.8), "37.8");
    }

    #[test]
    fn vector_round_trip_preserves_positions() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let set = FeatureSet::from_vector(values);
        assert_eq!(set.ph, 4.0);
        assert_eq!(set.humidity, 8.0);
        assert_eq!(set.to_vector(), values);
    }
}
