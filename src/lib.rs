pub mod cli;
pub mod correct;
pub mod dataset;
pub mod error;
pub mod features;
pub mod fix;
pub mod io_utils;
pub mod profile;
pub mod profiles_cmd;
pub mod recommend;
pub mod synth;
pub mod table;
pub mod verify;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("crop_advisor", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Fix(args) => fix::execute(&args),
        Commands::Verify(args) => verify::execute(&args),
        Commands::Profiles(args) => profiles_cmd::execute(&args),
        Commands::Recommend(args) => recommend::execute(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
