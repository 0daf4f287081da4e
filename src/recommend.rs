//! Crop recommendation from a single set of soil and weather readings.
//!
//! [`Classifier`] is the seam a trained model plugs into: it scores the nine
//! features in [`Feature::ALL`] order and returns one probability per label.
//! [`ProfileClassifier`] is a model-free stand-in that scores how close the
//! readings sit to the centre of each crop profile.

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    cli::RecommendArgs,
    error::RecommendError,
    features::{Feature, FeatureSet},
    profile::{self, Bounds, ProfileTable},
    table,
};

/// Accepted range of each reading on the recommendation path.
pub fn input_limits(feature: Feature) -> Bounds {
    match feature {
        Feature::Nitrogen | Feature::Phosphorus | Feature::Potassium => Bounds::new(0.0, 500.0),
        Feature::Ph => Bounds::new(0.0, 14.0),
        Feature::OrganicCarbon | Feature::SoilMoisture | Feature::Humidity => {
            Bounds::new(0.0, 100.0)
        }
        Feature::Temperature => Bounds::new(-10.0, 60.0),
        Feature::Rainfall => Bounds::new(0.0, 2000.0),
    }
}

pub fn validate_input(features: &FeatureSet) -> Result<(), RecommendError> {
    for feature in Feature::ALL {
        let value = features.get(feature);
        if !value.is_finite() {
            return Err(RecommendError::NonFinite { feature });
        }
        let limits = input_limits(feature);
        if !limits.contains(value) {
            return Err(RecommendError::OutOfRange {
                feature,
                value,
                min: limits.min,
                max: limits.max,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked {
    pub label: String,
    pub probability: f64,
}

/// Labels ranked by descending probability; ties keep label order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    ranked: Vec<Ranked>,
}

impl Prediction {
    pub fn new(labels: &[String], probabilities: Vec<f64>) -> Result<Self, RecommendError> {
        if labels.is_empty() {
            return Err(RecommendError::NoLabels);
        }
        if labels.len() != probabilities.len() {
            return Err(RecommendError::LabelMismatch {
                labels: labels.len(),
                probabilities: probabilities.len(),
            });
        }
        let mut ranked: Vec<Ranked> = labels
            .iter()
            .zip(probabilities)
            .map(|(label, probability)| Ranked {
                label: label.clone(),
                probability,
            })
            .collect();
        ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        Ok(Prediction { ranked })
    }

    /// Recommended crop.
    pub fn label(&self) -> &str {
        &self.ranked[0].label
    }

    pub fn top(&self, k: usize) -> &[Ranked] {
        &self.ranked[..k.min(self.ranked.len())]
    }

    pub fn ranked(&self) -> &[Ranked] {
        &self.ranked
    }
}

pub trait Classifier: Send + Sync {
    fn labels(&self) -> &[String];

    /// One probability per entry of [`Classifier::labels`].
    fn predict_proba(&self, features: &FeatureSet) -> Result<Vec<f64>, RecommendError>;

    fn predict(&self, features: &FeatureSet) -> Result<Prediction, RecommendError> {
        let probabilities = self.predict_proba(features)?;
        Prediction::new(self.labels(), probabilities)
    }
}

/// Scores crops by the squared distance of each profiled reading from the
/// profile midpoint, measured in half-widths, then applies a softmax.
/// Organic carbon and soil moisture carry no profile and do not contribute.
pub struct ProfileClassifier<'a> {
    table: &'a ProfileTable,
    labels: Vec<String>,
    temperature: f64,
}

impl<'a> ProfileClassifier<'a> {
    pub const DEFAULT_TEMPERATURE: f64 = 2.0;

    pub fn new(table: &'a ProfileTable) -> Self {
        let labels = table
            .entries()
            .iter()
            .map(|entry| entry.name.clone())
            .collect();
        ProfileClassifier {
            table,
            labels,
            temperature: Self::DEFAULT_TEMPERATURE,
        }
    }

    /// Softmax temperature; larger values flatten the distribution.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature.max(f64::EPSILON);
        self
    }

    fn distance(&self, features: &FeatureSet, idx: usize) -> f64 {
        let profile = &self.table.entries()[idx].profile;
        Feature::PROFILED
            .into_iter()
            .filter_map(|feature| profile.bounds(feature).map(|b| (feature, b)))
            .map(|(feature, bounds)| {
                let half_width = (bounds.width() / 2.0).max(1e-6);
                let z = (features.get(feature) - bounds.midpoint()) / half_width;
                z * z
            })
            .sum()
    }
}

impl Classifier for ProfileClassifier<'_> {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict_proba(&self, features: &FeatureSet) -> Result<Vec<f64>, RecommendError> {
        if self.labels.is_empty() {
            return Err(RecommendError::NoLabels);
        }
        let scores: Vec<f64> = (0..self.labels.len())
            .map(|idx| -self.distance(features, idx) / self.temperature)
            .collect();
        let peak = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = scores.iter().map(|score| (score - peak).exp()).collect();
        let total: f64 = weights.iter().sum();
        Ok(weights.into_iter().map(|weight| weight / total).collect())
    }
}

/// Validates `features` and asks `classifier` for a ranked prediction.
pub fn recommend(
    classifier: &dyn Classifier,
    features: &FeatureSet,
) -> Result<Prediction, RecommendError> {
    validate_input(features)?;
    classifier.predict(features)
}

#[derive(Debug, Serialize)]
struct RecommendationOutput<'a> {
    recommended: &'a str,
    top: &'a [Ranked],
    features: FeatureSet,
}

pub fn execute(args: &RecommendArgs) -> Result<()> {
    let profiles = profile::load_or_builtin(args.profiles.as_deref())?;
    let classifier = ProfileClassifier::new(&profiles);
    let features = FeatureSet {
        nitrogen: args.nitrogen,
        phosphorus: args.phosphorus,
        potassium: args.potassium,
        ph: args.ph,
        organic_carbon: args.organic_carbon,
        soil_moisture: args.soil_moisture,
        temperature: args.temperature,
        humidity: args.humidity,
        rainfall: args.rainfall,
    };
    let prediction =
        recommend(&classifier, &features).context("An error occurred during prediction")?;
    let top = prediction.top(args.top);

    if args.json {
        let output = RecommendationOutput {
            recommended: prediction.label(),
            top,
            features,
        };
        let rendered =
            serde_json::to_string_pretty(&output).context("Serializing prediction to JSON")?;
        println!("{rendered}");
    } else {
        println!("Recommended crop: {}", prediction.label());
        if !top.is_empty() {
            let headers = vec!["rank".to_string(), "crop".to_string(), "probability".to_string()];
            let rows: Vec<Vec<String>> = top
                .iter()
                .enumerate()
                .map(|(idx, ranked)| {
                    vec![
                        (idx + 1).to_string(),
                        ranked.label.clone(),
                        format!("{:.1}%", ranked.probability * 100.0),
                    ]
                })
                .collect();
            table::print_table(&headers, &rows);
        }
    }
    info!(
        "Scored {} crop profile(s); recommended '{}'",
        classifier.labels().len(),
        prediction.label()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centre_of(table: &ProfileTable, crop: &str) -> FeatureSet {
        let profile = table.get(crop).expect("crop");
        let mut features = FeatureSet {
            organic_carbon: 0.5,
            ..FeatureSet::default()
        };
        for feature in Feature::PROFILED {
            features.set(feature, profile.bounds(feature).unwrap().midpoint());
        }
        features.soil_moisture = features.humidity * 0.45;
        features
    }

    #[test]
    fn profile_centre_ranks_its_crop_first() {
        let table = ProfileTable::builtin();
        let classifier = ProfileClassifier::new(table);
        for crop in ["Rice", "Bajra", "Cotton", "Coconut", "Potato"] {
            let prediction = recommend(&classifier, &centre_of(table, crop)).expect("predict");
            assert_eq!(prediction.label(), crop);
        }
    }

    #[test]
    fn top_k_is_sorted_and_bounded() {
        let table = ProfileTable::builtin();
        let classifier = ProfileClassifier::new(table);
        let prediction = classifier.predict(&centre_of(table, "Wheat")).unwrap();
        let top = prediction.top(3);
        assert_eq!(top.len(), 3);
        assert!(top.windows(2).all(|w| w[0].probability >= w[1].probability));
        let total: f64 = prediction.ranked().iter().map(|r| r.probability).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(prediction.top(100).len(), 23);
    }

    #[test]
    fn out_of_range_input_is_rejected() {
        let classifier = ProfileClassifier::new(ProfileTable::builtin());
        let mut features = centre_of(ProfileTable::builtin(), "Rice");
        features.ph = 15.0;
        let err = recommend(&classifier, &features).unwrap_err();
        assert_eq!(
            err,
            RecommendError::OutOfRange {
                feature: Feature::Ph,
                value: 15.0,
                min: 0.0,
                max: 14.0
            }
        );
        features.ph = f64::NAN;
        assert_eq!(
            recommend(&classifier, &features).unwrap_err(),
            RecommendError::NonFinite {
                feature: Feature::Ph
            }
        );
    }

    #[test]
    fn mismatched_probabilities_are_reported() {
        let labels = vec!["Rice".to_string(), "Maize".to_string()];
        let err = Prediction::new(&labels, vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            RecommendError::LabelMismatch {
                labels: 2,
                probabilities: 1
            }
        );
        let prediction = Prediction::new(&labels, vec![0.5, 0.5]).unwrap();
        assert_eq!(prediction.label(), "Rice");
    }
}
