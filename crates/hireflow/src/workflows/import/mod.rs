//! Loads applications from a spreadsheet export (one row per application).
//! Blank cells stay absent rather than becoming zero scores.

mod parser;

use std::io::Read;
use std::path::Path;

use crate::workflows::hiring::{ApplicationRecord, InvalidStateError, ScoreRangeError};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read application export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid application CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: {source}")]
    Status {
        line: usize,
        source: InvalidStateError,
    },
    #[error("line {line}: {source}")]
    Scores {
        line: usize,
        source: ScoreRangeError,
    },
    #[error("line {line}: {message}")]
    Row { line: usize, message: String },
}

pub struct CandidateImporter;

impl CandidateImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ApplicationRecord>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ApplicationRecord>, ImportError> {
        parser::parse_records(reader)
    }
}
