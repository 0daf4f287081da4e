#![allow(dead_code)]

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const FEATURE_HEADER: &str =
    "N,P,K,pH,organic_carbon,soil_moisture,temperature_c,humidity_pct,rainfall_mm";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a dataset whose rows all carry the same nonsense feature values.
    pub fn write_mislabeled(&self, name: &str, crops: &[&str]) -> PathBuf {
        let mut contents = format!("crop,{FEATURE_HEADER}\n");
        for crop in crops {
            contents.push_str(&format!("{crop},999,999,999,0,0,0,0,0,0\n"));
        }
        self.write(name, &contents)
    }
}

/// Reads a CSV file into one header-keyed map per row.
pub fn read_rows(path: &Path) -> Vec<HashMap<String, String>> {
    let mut reader = csv::Reader::from_path(path).expect("open csv");
    let headers = reader.headers().expect("headers").clone();
    reader
        .records()
        .map(|record| {
            let record = record.expect("record");
            headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect()
        })
        .collect()
}

pub fn number(row: &HashMap<String, String>, column: &str) -> f64 {
    row.get(column)
        .unwrap_or_else(|| panic!("column {column} missing"))
        .parse()
        .unwrap_or_else(|_| panic!("column {column} is not numeric"))
}
