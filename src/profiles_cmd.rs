//! Profile table listing and export.

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::ProfilesArgs,
    features::{Feature, format_value},
    profile::{self, CropProfile},
    table,
};

pub fn execute(args: &ProfilesArgs) -> Result<()> {
    let profiles = profile::load_or_builtin(args.profiles.as_deref())?;

    if let Some(path) = &args.export {
        profiles
            .save(path)
            .with_context(|| format!("Exporting profiles to {path:?}"))?;
        info!("Exported {} crop profile(s) to {:?}", profiles.len(), path);
        return Ok(());
    }

    let mut headers = vec!["crop".to_string()];
    headers.extend(Feature::PROFILED.iter().map(|f| f.column().to_string()));
    let mut rows: Vec<Vec<String>> = profiles
        .entries()
        .iter()
        .map(|entry| profile_row(&entry.name, &entry.profile))
        .collect();
    rows.push(profile_row("(default)", profiles.default_profile()));
    table::print_table(&headers, &rows);
    info!("Listed {} crop profile(s)", profiles.len());
    Ok(())
}

fn profile_row(name: &str, profile: &CropProfile) -> Vec<String> {
    let mut row = vec![name.to_string()];
    row.extend(Feature::PROFILED.iter().filter_map(|&feature| {
        profile
            .bounds(feature)
            .map(|b| format!("{}-{}", trim_zero(b.min), trim_zero(b.max)))
    }));
    row
}

fn trim_zero(value: f64) -> String {
    let text = format_value(value);
    text.strip_suffix(".0").map(str::to_string).unwrap_or(text)
}
