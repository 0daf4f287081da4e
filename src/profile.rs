//! Per-crop agronomic profiles and crop label resolution.
//!
//! A [`ProfileTable`] maps crop names to the seven `[min, max]` ranges a
//! realistic record for that crop falls into, plus a default profile used
//! when a label matches nothing. The reference table covers 23 Indian crops
//! and is built once per process; alternative tables can be loaded from YAML.
//!
//! Resolution trims the label, tries an exact match, then a case-insensitive
//! match (first crop in table order wins), then falls back to the default.
//! Both lookups go through maps prepared when the table is built.

use std::{
    borrow::Cow,
    collections::{HashMap, hash_map::Entry},
    fs::File,
    io::BufReader,
    path::Path,
    sync::LazyLock,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{error::ProfileError, features::Feature};

/// Closed numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Bounds { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

impl From<[f64; 2]> for Bounds {
    fn from(pair: [f64; 2]) -> Self {
        Bounds::new(pair[0], pair[1])
    }
}

impl From<Bounds> for [f64; 2] {
    fn from(bounds: Bounds) -> Self {
        [bounds.min, bounds.max]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub nitrogen: Bounds,
    pub phosphorus: Bounds,
    pub potassium: Bounds,
    pub temperature: Bounds,
    pub humidity: Bounds,
    pub ph: Bounds,
    pub rainfall: Bounds,
}

impl CropProfile {
    /// Builds a profile from the flat
    /// `[N, P, K, temperature, humidity, pH, rainfall]` min/max pairs.
    pub const fn from_row(row: [f64; 14]) -> Self {
        CropProfile {
            nitrogen: Bounds::new(row[0], row[1]),
            phosphorus: Bounds::new(row[2], row[3]),
            potassium: Bounds::new(row[4], row[5]),
            temperature: Bounds::new(row[6], row[7]),
            humidity: Bounds::new(row[8], row[9]),
            ph: Bounds::new(row[10], row[11]),
            rainfall: Bounds::new(row[12], row[13]),
        }
    }

    /// Range for a profiled feature; `None` for the derived features.
    pub fn bounds(&self, feature: Feature) -> Option<Bounds> {
        match feature {
            Feature::Nitrogen => Some(self.nitrogen),
            Feature::Phosphorus => Some(self.phosphorus),
            Feature::Potassium => Some(self.potassium),
            Feature::Temperature => Some(self.temperature),
            Feature::Humidity => Some(self.humidity),
            Feature::Ph => Some(self.ph),
            Feature::Rainfall => Some(self.rainfall),
            Feature::OrganicCarbon | Feature::SoilMoisture => None,
        }
    }

    pub fn validate(&self, crop: &str) -> Result<(), ProfileError> {
        for feature in Feature::PROFILED {
            let Some(bounds) = self.bounds(feature) else {
                continue;
            };
            if !bounds.min.is_finite() || !bounds.max.is_finite() {
                return Err(ProfileError::NonFiniteBound {
                    crop: crop.to_string(),
                    feature,
                });
            }
            if bounds.min > bounds.max {
                return Err(ProfileError::InvertedBounds {
                    crop: crop.to_string(),
                    feature,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
            if !bounds.width().is_finite() {
                return Err(ProfileError::UnboundedRange {
                    crop: crop.to_string(),
                    feature,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
            // Temperature is the only range allowed below zero.
            if feature != Feature::Temperature && bounds.min < 0.0 {
                return Err(ProfileError::NegativeBound {
                    crop: crop.to_string(),
                    feature,
                    value: bounds.min,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedProfile {
    pub name: String,
    #[serde(flatten)]
    pub profile: CropProfile,
}

/// On-disk layout of a profile table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileFile {
    pub default: CropProfile,
    pub crops: Vec<NamedProfile>,
}

/// How a label was matched against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    Exact,
    CaseInsensitive,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<'a> {
    pub kind: MatchKind,
    /// Canonical crop name, absent when the default profile was used.
    pub crop: Option<&'a str>,
    pub profile: &'a CropProfile,
}

#[derive(Debug, Clone)]
pub struct ProfileTable {
    entries: Vec<NamedProfile>,
    default: CropProfile,
    exact: HashMap<String, usize>,
    folded: HashMap<String, usize>,
}

// [N_min, N_max, P_min, P_max, K_min, K_max, T_min, T_max, H_min, H_max,
//  pH_min, pH_max, R_min, R_max]
const REFERENCE_PROFILES: &[(&str, [f64; 14])] = &[
    // Heavy rainfall / monsoon
    ("Rice", [60., 90., 35., 60., 35., 45., 20., 27., 80., 89., 5.5, 7.0, 180., 300.]),
    ("Coconut", [20., 40., 15., 30., 25., 35., 25., 29., 90., 99., 5.0, 6.5, 130., 230.]),
    ("Sugarcane", [90., 120., 50., 70., 40., 60., 25., 35., 80., 90., 6.0, 7.5, 150., 220.]),
    // Heavy feeders
    ("Cotton", [100., 140., 40., 60., 20., 30., 22., 29., 70., 85., 6.0, 7.5, 60., 110.]),
    ("Maize", [60., 90., 40., 60., 18., 25., 18., 27., 55., 70., 5.5, 7.0, 60., 100.]),
    ("Banana", [90., 110., 70., 90., 45., 55., 25., 30., 75., 85., 5.8, 6.8, 90., 120.]),
    // Rabi
    ("Wheat", [30., 50., 50., 70., 30., 45., 15., 23., 50., 70., 6.0, 7.0, 40., 80.]),
    ("Mustard", [20., 40., 45., 60., 20., 30., 10., 20., 30., 50., 5.5, 7.0, 30., 60.]),
    ("Potato", [50., 70., 40., 60., 40., 55., 12., 22., 50., 65., 5.0, 6.0, 40., 70.]),
    // Pulses
    ("Bengal Gram", [20., 40., 55., 75., 35., 45., 18., 25., 20., 40., 6.0, 7.5, 30., 60.]),
    ("Toor", [25., 45., 55., 75., 25., 35., 25., 30., 40., 60., 5.5, 7.0, 60., 90.]),
    ("Moong", [15., 30., 45., 65., 20., 30., 25., 32., 50., 70., 6.0, 7.2, 40., 70.]),
    ("Urad", [15., 30., 50., 70., 20., 30., 25., 32., 55., 75., 6.0, 7.5, 40., 75.]),
    ("Soybean", [30., 50., 60., 80., 35., 45., 20., 30., 40., 70., 6.0, 7.0, 50., 100.]),
    // Dryland
    ("Bajra", [10., 30., 20., 40., 10., 20., 25., 35., 20., 40., 6.0, 7.5, 20., 45.]),
    ("Sorghum", [30., 50., 30., 50., 25., 35., 26., 34., 30., 50., 6.0, 7.0, 35., 65.]),
    ("Ragi", [10., 30., 20., 40., 15., 25., 26., 34., 20., 40., 5.0, 7.0, 30., 60.]),
    ("Groundnut", [30., 50., 40., 60., 40., 50., 24., 32., 40., 60., 5.5, 7.0, 50., 90.]),
    // Cash, spice and vegetable
    ("Tobacco", [40., 60., 30., 50., 30., 50., 22., 28., 50., 70., 5.5, 6.5, 60., 90.]),
    ("Mirchi", [35., 55., 50., 70., 40., 60., 20., 30., 40., 65., 5.5, 6.8, 50., 90.]),
    ("Tomato", [40., 60., 45., 65., 50., 70., 18., 26., 60., 80., 6.0, 7.0, 40., 90.]),
    ("Onion", [50., 70., 40., 60., 50., 70., 15., 25., 50., 70., 6.0, 7.0, 30., 60.]),
    ("Sunflower", [50., 70., 50., 70., 35., 45., 25., 30., 40., 60., 6.0, 7.5, 40., 75.]),
];

pub const DEFAULT_PROFILE: CropProfile = CropProfile::from_row([
    40., 60., 40., 60., 40., 60., 20., 30., 50., 70., 6.0, 7.0, 100., 200.,
]);

static BUILTIN: LazyLock<ProfileTable> = LazyLock::new(|| {
    let entries = REFERENCE_PROFILES
        .iter()
        .map(|(name, row)| NamedProfile {
            name: (*name).to_string(),
            profile: CropProfile::from_row(*row),
        })
        .collect();
    ProfileTable::new(entries, DEFAULT_PROFILE).expect("reference profiles are valid")
});

impl ProfileTable {
    pub fn new(entries: Vec<NamedProfile>, default: CropProfile) -> Result<Self, ProfileError> {
        default.validate("(default)")?;
        let mut exact = HashMap::with_capacity(entries.len());
        let mut folded = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if entry.name.is_empty() {
                return Err(ProfileError::EmptyName);
            }
            if entry.name.trim() != entry.name {
                return Err(ProfileError::UntrimmedName(entry.name.clone()));
            }
            entry.profile.validate(&entry.name)?;
            match exact.entry(entry.name.clone()) {
                Entry::Occupied(_) => return Err(ProfileError::DuplicateName(entry.name.clone())),
                Entry::Vacant(slot) => {
                    slot.insert(idx);
                }
            }
            folded.entry(entry.name.to_lowercase()).or_insert(idx);
        }
        Ok(ProfileTable {
            entries,
            default,
            exact,
            folded,
        })
    }

    /// The 23-crop reference table.
    pub fn builtin() -> &'static ProfileTable {
        &BUILTIN
    }

    pub fn from_file(file: ProfileFile) -> Result<Self, ProfileError> {
        ProfileTable::new(file.crops, file.default)
    }

    pub fn to_file(&self) -> ProfileFile {
        ProfileFile {
            default: self.default,
            crops: self.entries.clone(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening profile file {path:?}"))?;
        let reader = BufReader::new(file);
        let parsed: ProfileFile =
            serde_yaml::from_reader(reader).context("Parsing profile YAML")?;
        let table = ProfileTable::from_file(parsed)
            .with_context(|| format!("Validating profiles in {path:?}"))?;
        Ok(table)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating profile file {path:?}"))?;
        serde_yaml::to_writer(file, &self.to_file()).context("Writing profile YAML")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Crops in table order.
    pub fn entries(&self) -> &[NamedProfile] {
        &self.entries
    }

    pub fn default_profile(&self) -> &CropProfile {
        &self.default
    }

    pub fn get(&self, crop: &str) -> Option<&CropProfile> {
        self.exact.get(crop).map(|&idx| &self.entries[idx].profile)
    }

    pub fn resolve(&self, label: &str) -> &CropProfile {
        self.lookup(label).profile
    }

    pub fn lookup(&self, label: &str) -> Resolved<'_> {
        let trimmed = label.trim();
        if let Some(&idx) = self.exact.get(trimmed) {
            return self.resolved(MatchKind::Exact, idx);
        }
        if let Some(&idx) = self.folded.get(&trimmed.to_lowercase()) {
            return self.resolved(MatchKind::CaseInsensitive, idx);
        }
        Resolved {
            kind: MatchKind::Fallback,
            crop: None,
            profile: &self.default,
        }
    }

    fn resolved(&self, kind: MatchKind, idx: usize) -> Resolved<'_> {
        let entry = &self.entries[idx];
        Resolved {
            kind,
            crop: Some(entry.name.as_str()),
            profile: &entry.profile,
        }
    }
}

/// The table from `path`, or the reference table when no path is given.
pub fn load_or_builtin(path: Option<&Path>) -> Result<Cow<'static, ProfileTable>> {
    match path {
        Some(path) => Ok(Cow::Owned(ProfileTable::load(path)?)),
        None => Ok(Cow::Borrowed(ProfileTable::builtin())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, profile: CropProfile) -> NamedProfile {
        NamedProfile {
            name: name.to_string(),
            profile,
        }
    }

    #[test]
    fn builtin_table_has_reference_crops() {
        let table = ProfileTable::builtin();
        assert_eq!(table.len(), 23);
        assert_eq!(table.entries()[0].name, "Rice");
        assert_eq!(table.entries()[22].name, "Sunflower");
        let rice = table.get("Rice").expect("rice profile");
        assert_eq!(rice.nitrogen, Bounds::new(60.0, 90.0));
        assert_eq!(rice.ph, Bounds::new(5.5, 7.0));
        assert_eq!(rice.rainfall, Bounds::new(180.0, 300.0));
        assert_eq!(*table.default_profile(), DEFAULT_PROFILE);
    }

    #[test]
    fn resolve_ignores_padding_and_case() {
        let table = ProfileTable::builtin();
        let rice = table.get("Rice").unwrap();
        assert_eq!(table.resolve(" rice "), rice);
        assert_eq!(table.resolve("RICE"), rice);
        assert_eq!(table.resolve("Rice"), rice);
        assert_eq!(table.lookup("Rice").kind, MatchKind::Exact);
        assert_eq!(table.lookup("\tRice\n").kind, MatchKind::Exact);
        let folded = table.lookup(" bengal GRAM ");
        assert_eq!(folded.kind, MatchKind::CaseInsensitive);
        assert_eq!(folded.crop, Some("Bengal Gram"));
    }

    #[test]
    fn unknown_label_falls_back_to_default() {
        let table = ProfileTable::builtin();
        let resolved = table.lookup("Quinoa");
        assert_eq!(resolved.kind, MatchKind::Fallback);
        assert_eq!(resolved.crop, None);
        assert_eq!(resolved.profile, table.default_profile());
        assert_eq!(table.resolve(""), table.default_profile());
    }

    #[test]
    fn case_insensitive_collision_prefers_table_order() {
        let first = CropProfile::from_row([1., 2., 1., 2., 1., 2., 1., 2., 1., 2., 1., 2., 1., 2.]);
        let second = CropProfile::from_row([3., 4., 3., 4., 3., 4., 3., 4., 3., 4., 3., 4., 3., 4.]);
        let table = ProfileTable::new(
            vec![named("Millet", first), named("MILLET", second)],
            DEFAULT_PROFILE,
        )
        .expect("valid table");
        assert_eq!(table.resolve("millet"), &first);
        assert_eq!(table.resolve("MILLET"), &second);
    }

    #[test]
    fn validation_rejects_inverted_and_negative_bounds() {
        let mut inverted = DEFAULT_PROFILE;
        inverted.humidity = Bounds::new(80.0, 70.0);
        let err = ProfileTable::new(vec![named("Bad", inverted)], DEFAULT_PROFILE).unwrap_err();
        assert!(matches!(
            err,
            ProfileError::InvertedBounds {
                feature: Feature::Humidity,
                ..
            }
        ));

        let mut negative = DEFAULT_PROFILE;
        negative.rainfall = Bounds::new(-1.0, 10.0);
        let err = ProfileTable::new(vec![named("Dry", negative)], DEFAULT_PROFILE).unwrap_err();
        assert!(matches!(err, ProfileError::NegativeBound { .. }));

        let mut vast = DEFAULT_PROFILE;
        vast.temperature = Bounds::new(-1e308, 1e308);
        let err = ProfileTable::new(vec![named("Vast", vast)], DEFAULT_PROFILE).unwrap_err();
        assert_eq!(
            err,
            ProfileError::UnboundedRange {
                crop: "Vast".into(),
                feature: Feature::Temperature,
                min: -1e308,
                max: 1e308
            }
        );

        let mut frosty = DEFAULT_PROFILE;
        frosty.temperature = Bounds::new(-5.0, 10.0);
        assert!(ProfileTable::new(vec![named("Frosty", frosty)], DEFAULT_PROFILE).is_ok());
    }

    #[test]
    fn validation_rejects_bad_names() {
        let err = ProfileTable::new(
            vec![named("Rice", DEFAULT_PROFILE), named("Rice", DEFAULT_PROFILE)],
            DEFAULT_PROFILE,
        )
        .unwrap_err();
        assert_eq!(err, ProfileError::DuplicateName("Rice".into()));

        let err = ProfileTable::new(vec![named(" Rice", DEFAULT_PROFILE)], DEFAULT_PROFILE)
            .unwrap_err();
        assert_eq!(err, ProfileError::UntrimmedName(" Rice".into()));

        let err = ProfileTable::new(vec![named("", DEFAULT_PROFILE)], DEFAULT_PROFILE).unwrap_err();
        assert_eq!(err, ProfileError::EmptyName);
    }

    #[test]
    fn yaml_profiles_use_min_max_pairs() {
        let yaml = r#"
default:
  nitrogen: [40, 60]
  phosphorus: [40, 60]
  potassium: [40, 60]
  temperature: [20, 30]
  humidity: [50, 70]
  ph: [6.0, 7.0]
  rainfall: [100, 200]
crops:
  - name: Barley
    nitrogen: [20, 40]
    phosphorus: [30, 50]
    potassium: [20, 30]
    temperature: [-2, 18]
    humidity: [40, 60]
    ph: [6.0, 7.5]
    rainfall: [30, 60]
"#;
        let file: ProfileFile = serde_yaml::from_str(yaml).expect("parse yaml");
        let table = ProfileTable::from_file(file).expect("valid table");
        assert_eq!(table.len(), 1);
        let barley = table.resolve("barley");
        assert_eq!(barley.temperature, Bounds::new(-2.0, 18.0));
        assert_eq!(table.resolve("Rice"), &DEFAULT_PROFILE);
    }
}
