//! Checks that a dataset's features are consistent with its labels: every
//! profiled feature inside the resolved profile's range, organic carbon
//! inside its fixed range, and soil moisture equal to the value implied by
//! humidity.

use std::path::Path;

use anyhow::{Result, bail};
use itertools::Itertools;
use log::info;

use crate::{
    cli::VerifyArgs,
    dataset::{Dataset, Record},
    features::{Feature, format_value},
    io_utils,
    profile::{self, ProfileTable},
    synth::{ORGANIC_CARBON, soil_moisture_for},
    table,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// 1-based line in the file, header included.
    pub line: usize,
    pub crop: String,
    pub feature: Feature,
    /// Cell text as found.
    pub found: String,
    pub expected: String,
}

pub fn check_record(profiles: &ProfileTable, record: &Record) -> Vec<(Feature, String)> {
    let profile = profiles.resolve(&record.crop);
    let mut problems = Vec::new();
    for feature in Feature::PROFILED {
        let Some(bounds) = profile.bounds(feature) else {
            continue;
        };
        if !record.feature(feature).is_some_and(|value| bounds.contains(value)) {
            problems.push((
                feature,
                format!("{}..={}", format_value(bounds.min), format_value(bounds.max)),
            ));
        }
    }
    if !record
        .feature(Feature::OrganicCarbon)
        .is_some_and(|value| ORGANIC_CARBON.contains(value))
    {
        problems.push((
            Feature::OrganicCarbon,
            format!("{}..={}", ORGANIC_CARBON.min, ORGANIC_CARBON.max),
        ));
    }
    if let Some(humidity) = record.feature(Feature::Humidity) {
        let expected = soil_moisture_for(humidity);
        if record.feature(Feature::SoilMoisture) != Some(expected) {
            problems.push((Feature::SoilMoisture, format_value(expected)));
        }
    }
    problems
}

pub fn check_dataset(profiles: &ProfileTable, dataset: &Dataset) -> Vec<Violation> {
    dataset
        .records()
        .iter()
        .enumerate()
        .flat_map(|(idx, record)| {
            check_record(profiles, record)
                .into_iter()
                .map(move |(feature, expected)| Violation {
                    line: idx + 2,
                    crop: record.crop.clone(),
                    feature,
                    found: record.feature_text(feature).to_string(),
                    expected,
                })
        })
        .collect()
}

pub fn execute(args: &VerifyArgs) -> Result<()> {
    let profiles = profile::load_or_builtin(args.profiles.as_deref())?;
    let mut failed = 0usize;
    for input in &args.inputs {
        let violations = verify_file(&profiles, input, args.delimiter)?;
        if violations.is_empty() {
            info!("✓ {:?} is consistent with its crop profiles", input);
            continue;
        }
        failed += 1;
        report_violations(input, &violations, args.max_report);
    }
    if failed > 0 {
        bail!("{failed} of {} file(s) failed verification", args.inputs.len());
    }
    Ok(())
}

fn verify_file(
    profiles: &ProfileTable,
    path: &Path,
    delimiter: Option<u8>,
) -> Result<Vec<Violation>> {
    let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
    let dataset = Dataset::load(path, delimiter)?;
    info!("Verifying {} row(s) in {:?}", dataset.len(), path);
    Ok(check_dataset(profiles, &dataset))
}

fn report_violations(path: &Path, violations: &[Violation], max_report: usize) {
    let shown = if max_report == 0 {
        violations.len()
    } else {
        max_report.min(violations.len())
    };
    let headers = ["line", "crop", "column", "found", "expected"]
        .map(str::to_string)
        .to_vec();
    let rows: Vec<Vec<String>> = violations[..shown]
        .iter()
        .map(|v| {
            vec![
                v.line.to_string(),
                v.crop.clone(),
                v.feature.column().to_string(),
                v.found.clone(),
                v.expected.clone(),
            ]
        })
        .collect();
    println!("{}:", path.display());
    table::print_table(&headers, &rows);
    let by_column = violations
        .iter()
        .map(|v| v.feature)
        .counts()
        .into_iter()
        .sorted()
        .map(|(feature, count)| format!("{feature}: {count}"))
        .join(", ");
    info!(
        "{:?}: {} violation(s) ({}), {} listed",
        path,
        violations.len(),
        by_column,
        shown
    );
}
