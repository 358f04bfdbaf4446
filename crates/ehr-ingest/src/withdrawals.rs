//! Consent filter: the set of subjects withdrawn from the study.
//!
//! Loaded once per pipeline run from a headerless single-column file and
//! enforced at standardization time. Every downstream table is derived
//! from standardized output, so exclusion here is exclusion everywhere.

use std::collections::HashSet;
use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::DataFrame;

use ehr_common::exclude_subjects;
use ehr_model::{EhrError, Result};

/// Subjects whose rows must be removed from every table.
#[derive(Debug, Clone, Default)]
pub struct WithdrawalSet {
    eids: HashSet<i32>,
}

impl WithdrawalSet {
    /// Reads the withdrawal list: one subject identifier per line, no header.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|error| EhrError::io(path, std::io::Error::other(error)))?;

        let mut eids = HashSet::new();
        for record in reader.records() {
            let record =
                record.map_err(|error| EhrError::io(path, std::io::Error::other(error)))?;
            let Some(field) = record.get(0) else {
                continue;
            };
            let trimmed = field.trim();
            if trimmed.is_empty() {
                continue;
            }
            let eid = trimmed
                .parse::<i32>()
                .map_err(|_| EhrError::Validation {
                    argument: "withdrawal list entry",
                    given: trimmed.to_string(),
                    accepted: "integer subject identifiers",
                })?;
            eids.insert(eid);
        }
        Ok(Self { eids })
    }

    pub fn contains(&self, eid: i32) -> bool {
        self.eids.contains(&eid)
    }

    pub fn len(&self) -> usize {
        self.eids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eids.is_empty()
    }

    /// Removes every withdrawn subject's rows from the frame.
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        Ok(exclude_subjects(df, &self.eids)?)
    }
}
