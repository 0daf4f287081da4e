//! In-memory crop dataset.
//!
//! A [`Dataset`] keeps the input header layout so a corrected table is written
//! back with the same columns in the same order. The `crop` column is
//! required; the nine feature columns are located by name and appended when
//! the input lacks them; every other column is carried through untouched.

use std::{
    io::{Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use log::debug;

use crate::{
    error::CorrectionError,
    features::{Feature, FeatureSet, format_value},
    io_utils,
};

pub const CROP_COLUMN: &str = "crop";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Crop,
    Feature(Feature),
    Extra(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Label exactly as read; resolution trims it, the output keeps it.
    pub crop: String,
    features: [String; 9],
    extra: Vec<String>,
}

impl Record {
    /// Raw cell text for a feature.
    pub fn feature_text(&self, feature: Feature) -> &str {
        &self.features[feature.index()]
    }

    /// Parsed feature value; `None` when the cell is empty or not numeric.
    pub fn feature(&self, feature: Feature) -> Option<f64> {
        self.feature_text(feature).trim().parse().ok()
    }

    pub fn extra(&self) -> &[String] {
        &self.extra
    }

    /// Overwrites all nine feature cells; the label and extra cells stay.
    pub fn set_features(&mut self, values: &FeatureSet) {
        for feature in Feature::ALL {
            self.features[feature.index()] = format_value(values.get(feature));
        }
    }

    fn cells<'a>(&'a self, columns: &'a [Column]) -> impl Iterator<Item = &'a str> + 'a {
        columns.iter().map(move |column| match column {
            Column::Crop => self.crop.as_str(),
            Column::Feature(feature) => self.feature_text(*feature),
            Column::Extra(idx) => self.extra[*idx].as_str(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    columns: Vec<Column>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn from_rows(
        mut headers: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<Self, CorrectionError> {
        let mut columns = Vec::with_capacity(headers.len() + Feature::ALL.len());
        let mut crop_position = None;
        let mut feature_positions: [Option<usize>; 9] = [None; 9];
        let mut extra_positions = Vec::new();

        for (position, header) in headers.iter().enumerate() {
            let name = header.trim();
            let column = if name == CROP_COLUMN {
                if crop_position.replace(position).is_some() {
                    return Err(CorrectionError::DuplicateColumn(name.to_string()));
                }
                Column::Crop
            } else if let Some(feature) = Feature::from_column(name) {
                if feature_positions[feature.index()]
                    .replace(position)
                    .is_some()
                {
                    return Err(CorrectionError::DuplicateColumn(name.to_string()));
                }
                Column::Feature(feature)
            } else {
                extra_positions.push(position);
                Column::Extra(extra_positions.len() - 1)
            };
            columns.push(column);
        }
        let crop_position = crop_position.ok_or(CorrectionError::MissingCropColumn {
            column: CROP_COLUMN,
        })?;

        let width = headers.len();
        for feature in Feature::ALL {
            if feature_positions[feature.index()].is_none() {
                debug!("Input has no '{}' column; appending it", feature.column());
                headers.push(feature.column().to_string());
                columns.push(Column::Feature(feature));
            }
        }

        let records = rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| {
                if row.len() != width {
                    return Err(CorrectionError::RaggedRow {
                        row: idx + 2,
                        expected: width,
                        found: row.len(),
                    });
                }
                let features = Feature::ALL.map(|feature| {
                    feature_positions[feature.index()]
                        .map(|position| row[position].clone())
                        .unwrap_or_default()
                });
                let extra = extra_positions
                    .iter()
                    .map(|&position| row[position].clone())
                    .collect();
                Ok(Record {
                    crop: row[crop_position].clone(),
                    features,
                    extra,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Dataset {
            headers,
            columns,
            records,
        })
    }

    pub fn from_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers = reader
            .headers()
            .context("Reading header row")?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Dataset::from_rows(headers, rows)?)
    }

    /// Loads a whole file; a missing file is reported as
    /// [`CorrectionError::SourceNotFound`].
    pub fn load(path: &Path, delimiter: u8) -> Result<Self> {
        if !path.is_file() {
            return Err(CorrectionError::SourceNotFound(path.to_path_buf()).into());
        }
        let reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
        Dataset::from_reader(reader).with_context(|| format!("Loading dataset {path:?}"))
    }

    pub fn write_to<W: Write>(&self, writer: &mut csv::Writer<W>) -> Result<()> {
        writer
            .write_record(&self.headers)
            .context("Writing output headers")?;
        for (idx, record) in self.records.iter().enumerate() {
            writer
                .write_record(record.cells(&self.columns))
                .with_context(|| format!("Writing output row {}", idx + 2))?;
        }
        Ok(())
    }

    /// Writes the dataset to `path` atomically.
    pub fn save(&self, path: &Path, delimiter: u8) -> Result<()> {
        io_utils::write_csv_atomically(path, delimiter, |writer| self.write_to(writer))
    }

    /// Same layout, different rows.
    pub fn with_records(&self, records: Vec<Record>) -> Dataset {
        Dataset {
            headers: self.headers.clone(),
            columns: self.columns.clone(),
            records,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
