use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_SOURCE: &str = "final_balanced_crop_dataset_4600_all_districts.csv";
pub const DEFAULT_DESTINATION: &str = "corrected_crop_dataset.csv";

#[derive(Debug, Parser)]
#[command(author, version, about = "Recommend crops and repair mislabeled crop datasets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Regenerate every record's features from its crop profile
    Fix(FixArgs),
    /// Check that each record's features fit its crop profile
    Verify(VerifyArgs),
    /// List the active crop profiles or export them to YAML
    Profiles(ProfilesArgs),
    /// Recommend a crop for one set of soil and weather readings
    Recommend(RecommendArgs),
}

#[derive(Debug, Args)]
pub struct FixArgs {
    /// Dataset to correct (left unmodified)
    #[arg(short = 'i', long = "input", default_value = DEFAULT_SOURCE)]
    pub input: PathBuf,
    /// Destination for the corrected dataset
    #[arg(short = 'o', long = "output", default_value = DEFAULT_DESTINATION)]
    pub output: PathBuf,
    /// Seed for reproducible sampling (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
    /// Fail instead of using the default profile for unknown crop labels
    #[arg(long)]
    pub strict: bool,
    /// Correct records on all available cores
    #[arg(long)]
    pub parallel: bool,
    /// YAML profile table to use instead of the built-in reference profiles
    #[arg(short = 'p', long = "profiles")]
    pub profiles: Option<PathBuf>,
    /// CSV delimiter character for reading input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter to use for output (defaults to input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// One or more datasets to verify
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// YAML profile table to check against
    #[arg(short = 'p', long = "profiles")]
    pub profiles: Option<PathBuf>,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Maximum violations listed per file (0 = all)
    #[arg(long = "max-report", default_value_t = 20)]
    pub max_report: usize,
}

#[derive(Debug, Args)]
pub struct ProfilesArgs {
    /// YAML profile table to list instead of the built-in reference profiles
    #[arg(short = 'p', long = "profiles")]
    pub profiles: Option<PathBuf>,
    /// Write the active table to this YAML file instead of printing it
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RecommendArgs {
    /// Ratio of nitrogen content in soil
    #[arg(long = "n", default_value_t = 50.0, allow_negative_numbers = true)]
    pub nitrogen: f64,
    /// Ratio of phosphorus content in soil
    #[arg(long = "p", default_value_t = 50.0, allow_negative_numbers = true)]
    pub phosphorus: f64,
    /// Ratio of potassium content in soil
    #[arg(long = "k", default_value_t = 50.0, allow_negative_numbers = true)]
    pub potassium: f64,
    /// Soil pH
    #[arg(long = "ph", default_value_t = 6.5, allow_negative_numbers = true)]
    pub ph: f64,
    /// Organic carbon content
    #[arg(long = "organic-carbon", default_value_t = 0.5, allow_negative_numbers = true)]
    pub organic_carbon: f64,
    /// Soil moisture percentage
    #[arg(long = "soil-moisture", default_value_t = 50.0, allow_negative_numbers = true)]
    pub soil_moisture: f64,
    /// Temperature in °C
    #[arg(long = "temperature", default_value_t = 25.0, allow_negative_numbers = true)]
    pub temperature: f64,
    /// Relative humidity in percent
    #[arg(long = "humidity", default_value_t = 60.0, allow_negative_numbers = true)]
    pub humidity: f64,
    /// Rainfall in mm
    #[arg(long = "rainfall", default_value_t = 100.0, allow_negative_numbers = true)]
    pub rainfall: f64,
    /// Number of ranked alternatives to show
    #[arg(long, default_value_t = 3)]
    pub top: usize,
    /// Emit the prediction as JSON
    #[arg(long)]
    pub json: bool,
    /// YAML profile table used by the profile classifier
    #[arg(long = "profiles")]
    pub profiles: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
