use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    cli::FixArgs, correct::Corrector, dataset::Dataset, error::CorrectionError, io_utils, profile,
};

pub fn execute(args: &FixArgs) -> Result<()> {
    if !args.input.is_file() {
        return Err(CorrectionError::SourceNotFound(args.input.clone()).into());
    }
    if io_utils::is_same_file(&args.input, &args.output) {
        return Err(CorrectionError::OutputIsSource(args.output.clone()).into());
    }

    let input_delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let output_delimiter =
        io_utils::resolve_output_delimiter(&args.output, args.output_delimiter, input_delimiter);
    let table = profile::load_or_builtin(args.profiles.as_deref())?;

    info!(
        "Reading '{}' with delimiter '{}'",
        args.input.display(),
        crate::printable_delimiter(input_delimiter)
    );
    let dataset = Dataset::load(&args.input, input_delimiter)?;
    info!(
        "Loaded {} row(s) across {} column(s); correcting against {} crop profile(s)",
        dataset.len(),
        dataset.headers().len(),
        table.len()
    );

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("Sampling seed {seed} (pass --seed {seed} to reproduce this run)");
    let corrected = Corrector::new(&table, seed)
        .strict(args.strict)
        .parallel(args.parallel)
        .correct(&dataset)?;

    let report = &corrected.report;
    for (label, rows) in &report.unresolved {
        warn!("No profile for crop '{label}' ({rows} row(s)); default ranges used");
    }

    corrected
        .dataset
        .save(&args.output, output_delimiter)
        .with_context(|| format!("Writing corrected dataset to {:?}", args.output))?;
    info!(
        "Corrected {} row(s) ({} exact, {} case-insensitive, {} default) -> {}",
        report.rows,
        report.exact,
        report.case_insensitive,
        report.fallback,
        args.output.display()
    );
    Ok(())
}
