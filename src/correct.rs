//! Dataset correction: every record gets fresh feature values sampled from
//! the profile its crop label resolves to.
//!
//! The source dataset is never modified; [`Corrector::correct`] returns a new
//! dataset with the same header, row count, row order, and labels. Row `i`
//! always draws from a generator seeded by `(seed, i)`, so a run is repeatable
//! from its seed and the parallel path yields exactly the sequential output.

use std::collections::BTreeMap;

use log::debug;
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    dataset::{Dataset, Record},
    error::CorrectionError,
    profile::{MatchKind, ProfileTable},
    synth::{row_rng, synthesize},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorrectionReport {
    pub rows: usize,
    pub exact: usize,
    pub case_insensitive: usize,
    pub fallback: usize,
    /// Trimmed labels that fell back to the default profile, with row counts.
    pub unresolved: BTreeMap<String, usize>,
}

impl CorrectionReport {
    fn record(&mut self, label: &str, kind: MatchKind) {
        self.rows += 1;
        match kind {
            MatchKind::Exact => self.exact += 1,
            MatchKind::CaseInsensitive => self.case_insensitive += 1,
            MatchKind::Fallback => {
                self.fallback += 1;
                *self.unresolved.entry(label.trim().to_string()).or_default() += 1;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Corrected {
    pub dataset: Dataset,
    pub report: CorrectionReport,
}

#[derive(Debug, Clone, Copy)]
pub struct Corrector<'a> {
    table: &'a ProfileTable,
    seed: u64,
    strict: bool,
    parallel: bool,
}

impl<'a> Corrector<'a> {
    pub fn new(table: &'a ProfileTable, seed: u64) -> Self {
        Corrector {
            table,
            seed,
            strict: false,
            parallel: false,
        }
    }

    /// Reject the batch when any label falls back to the default profile.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn correct(&self, dataset: &Dataset) -> Result<Corrected, CorrectionError> {
        let corrected = self.rewrite(dataset);
        if self.strict && !corrected.report.unresolved.is_empty() {
            return Err(CorrectionError::UnresolvedLabels {
                labels: corrected.report.unresolved.keys().cloned().collect(),
            });
        }
        Ok(corrected)
    }

    fn rewrite(&self, dataset: &Dataset) -> Corrected {
        let source = dataset.records();
        let rewritten: Vec<(Record, MatchKind)> = if self.parallel {
            source
                .par_iter()
                .enumerate()
                .map(|(row, record)| self.correct_record(row, record))
                .collect()
        } else {
            source
                .iter()
                .enumerate()
                .map(|(row, record)| self.correct_record(row, record))
                .collect()
        };

        let mut report = CorrectionReport::default();
        let mut records = Vec::with_capacity(rewritten.len());
        for (record, kind) in rewritten {
            report.record(&record.crop, kind);
            records.push(record);
        }
        Corrected {
            dataset: dataset.with_records(records),
            report,
        }
    }

    fn correct_record(&self, row: usize, record: &Record) -> (Record, MatchKind) {
        let resolved = self.table.lookup(&record.crop);
        if resolved.kind == MatchKind::Fallback {
            debug!(
                "Row {}: '{}' has no profile; using default ranges",
                row + 2,
                record.crop
            );
        }
        let features = synthesize(resolved.profile, &mut row_rng(self.seed, row));
        let mut corrected = record.clone();
        corrected.set_features(&features);
        (corrected, resolved.kind)
    }
}

/// Corrects `dataset` with the default permissive policy.
pub fn correct(dataset: &Dataset, table: &ProfileTable, seed: u64) -> Dataset {
    Corrector::new(table, seed).rewrite(dataset).dataset
}
