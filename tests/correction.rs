use crop_advisor::{
    correct::{Corrector, correct},
    dataset::Dataset,
    features::Feature,
    profile::{MatchKind, ProfileTable},
    synth::{ORGANIC_CARBON, row_rng, soil_moisture_for, synthesize},
    verify::check_dataset,
};
use proptest::prelude::*;

fn headers() -> Vec<String> {
    let mut headers = vec!["crop".to_string()];
    headers.extend(Feature::ALL.iter().map(|f| f.column().to_string()));
    headers
}

fn dataset_of(labels: &[String]) -> Dataset {
    let rows = labels
        .iter()
        .map(|label| {
            let mut row = vec![label.clone()];
            row.extend(std::iter::repeat_n("-1".to_string(), 9));
            row
        })
        .collect();
    Dataset::from_rows(headers(), rows).expect("dataset")
}

fn crop_name() -> impl Strategy<Value = String> {
    let names: Vec<String> = ProfileTable::builtin()
        .entries()
        .iter()
        .map(|entry| entry.name.clone())
        .collect();
    proptest::sample::select(names)
}

#[test]
fn every_reference_crop_corrects_cleanly() {
    let table = ProfileTable::builtin();
    let labels: Vec<String> = table.entries().iter().map(|e| e.name.clone()).collect();
    let source = dataset_of(&labels);
    let corrected = Corrector::new(table, 99).correct(&source).expect("correct");
    assert_eq!(corrected.report.exact, labels.len());
    assert!(corrected.report.unresolved.is_empty());
    assert!(check_dataset(table, &corrected.dataset).is_empty());
}

#[test]
fn row_streams_do_not_depend_on_neighbours() {
    let table = ProfileTable::builtin();
    let short = dataset_of(&["Rice".into(), "Wheat".into()]);
    let long = dataset_of(&["Rice".into(), "Wheat".into(), "Cotton".into()]);
    let a = correct(&short, table, 5);
    let b = correct(&long, table, 5);
    assert_eq!(a.records()[..2], b.records()[..2]);
}

proptest! {
    #[test]
    fn resolution_ignores_padding_and_case(
        crop in crop_name(),
        left in "[ \t]{0,3}",
        right in "[ \t]{0,3}",
        upper in any::<bool>(),
    ) {
        let table = ProfileTable::builtin();
        let cased = if upper { crop.to_uppercase() } else { crop.to_lowercase() };
        let label = format!("{left}{cased}{right}");
        let resolved = table.lookup(&label);
        prop_assert_ne!(resolved.kind, MatchKind::Fallback);
        prop_assert_eq!(resolved.crop, Some(crop.as_str()));
        prop_assert_eq!(resolved.profile, table.get(&crop).unwrap());
    }

    #[test]
    fn synthesized_values_stay_inside_profile(crop in crop_name(), seed in any::<u64>(), row in 0usize..10_000) {
        let profile = ProfileTable::builtin().get(&crop).unwrap();
        let mut rng = row_rng(seed, row);
        let features = synthesize(profile, &mut rng);
        for feature in Feature::PROFILED {
            let bounds = profile.bounds(feature).unwrap();
            prop_assert!(bounds.contains(features.get(feature)));
        }
        prop_assert!(ORGANIC_CARBON.contains(features.organic_carbon));
        prop_assert_eq!(features.soil_moisture, soil_moisture_for(features.humidity));
    }

    #[test]
    fn parallel_matches_sequential(
        labels in proptest::collection::vec(crop_name(), 1..40),
        seed in any::<u64>(),
    ) {
        let table = ProfileTable::builtin();
        let source = dataset_of(&labels);
        let sequential = Corrector::new(table, seed).correct(&source).unwrap();
        let parallel = Corrector::new(table, seed).parallel(true).correct(&source).unwrap();
        prop_assert_eq!(sequential.dataset, parallel.dataset);
        prop_assert_eq!(sequential.report.rows, labels.len());
    }
}
