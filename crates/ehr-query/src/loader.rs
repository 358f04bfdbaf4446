//! Read-only queries over the canonical event tables.
//!
//! Each operation assembles one long frame: per requested source the
//! canonical table is read, filtered to the requested subjects and levels,
//! tagged with the source name, and concatenated in request order. Queries
//! share no state and never mutate the tables, so they are safe to issue
//! concurrently against the same directory.

use std::collections::HashSet;
use std::fs::File;
use std::path::PathBuf;

use polars::prelude::{DataFrame, NamedFrom, ParquetReader, SerReader, Series};
use tracing::debug;

use ehr_common::filter_subjects;
use ehr_model::{DeathLevel, EhrError, GpSource, HospitalSource, Level, Result};

/// Loader over a directory of canonical event tables.
#[derive(Debug)]
pub struct DataLoader {
    data_dir: PathBuf,
}

impl DataLoader {
    /// Opens a canonical table directory.
    ///
    /// Fails fast with a configuration error when the directory is
    /// unreadable or empty.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        let mut entries = std::fs::read_dir(&data_dir).map_err(|_| EhrError::Configuration {
            location: data_dir.clone(),
        })?;
        if entries.next().is_none() {
            return Err(EhrError::Configuration { location: data_dir });
        }
        Ok(Self { data_dir })
    }

    /// Fetches hospital events for the requested coding systems.
    ///
    /// `sources` defaults to all four coding systems and `levels` to all
    /// provenance levels. An empty or omitted `subjects` slice applies no
    /// subject filter. Every returned row carries its source name, a
    /// `date_of_visit` and a constant occurrence `value` of 1.
    pub fn hospital(
        &self,
        sources: Option<&[HospitalSource]>,
        levels: Option<&[Level]>,
        subjects: Option<&[i32]>,
    ) -> Result<DataFrame> {
        let sources = defaulted(sources, &HospitalSource::ALL);
        let level_codes: Vec<i8> = defaulted(levels, &Level::ALL)
            .iter()
            .map(|level| level.code())
            .collect();
        let subjects = subject_set(subjects);

        let mut frames = Vec::with_capacity(sources.len());
        for source in &sources {
            let df = self.read_table(source.file_name())?;
            let df = apply_subject_filter(&df, subjects.as_ref())?;
            let df = filter_levels(&df, &level_codes)?;
            frames.push(tag_source(df, source.as_str())?);
        }
        let mut df = concat_frames(frames)?;
        df.rename("date", "date_of_visit".into())?;
        append_occurrence(&mut df)?;
        Ok(df)
    }

    /// Fetches mortality events for the requested cause levels.
    ///
    /// `levels` defaults to both primary and secondary causes. Rows are
    /// tagged with the level name and dated by `date_of_death`.
    pub fn death(
        &self,
        levels: Option<&[DeathLevel]>,
        subjects: Option<&[i32]>,
    ) -> Result<DataFrame> {
        let levels = defaulted(levels, &DeathLevel::ALL);
        let subjects = subject_set(subjects);

        let mut frames = Vec::with_capacity(levels.len());
        for level in &levels {
            let df = self.read_table(level.file_name())?;
            let df = apply_subject_filter(&df, subjects.as_ref())?;
            frames.push(tag_source(df, level.as_str())?);
        }
        let mut df = concat_frames(frames)?;
        df.rename("date", "date_of_death".into())?;
        append_occurrence(&mut df)?;
        Ok(df)
    }

    /// Fetches primary-care code events for the requested vocabularies.
    ///
    /// `sources` defaults to both vocabularies. Primary care has no
    /// provenance levels, so there is no level dimension here.
    pub fn gp_clinical(
        &self,
        sources: Option<&[GpSource]>,
        subjects: Option<&[i32]>,
    ) -> Result<DataFrame> {
        let sources = defaulted(sources, &GpSource::ALL);
        let subjects = subject_set(subjects);

        let mut frames = Vec::with_capacity(sources.len());
        for source in &sources {
            let df = self.read_table(source.file_name())?;
            let df = apply_subject_filter(&df, subjects.as_ref())?;
            frames.push(tag_source(df, source.as_str())?);
        }
        let mut df = concat_frames(frames)?;
        df.rename("date", "date_of_visit".into())?;
        append_occurrence(&mut df)?;
        Ok(df)
    }

    /// Fetches medication issues, dated by `date_of_issue`.
    pub fn gp_medications(&self, subjects: Option<&[i32]>) -> Result<DataFrame> {
        let subjects = subject_set(subjects);
        let df = self.read_table("gp_medications.parquet")?;
        let mut df = apply_subject_filter(&df, subjects.as_ref())?;
        df.rename("date", "date_of_issue".into())?;
        Ok(df)
    }

    fn read_table(&self, file_name: &str) -> Result<DataFrame> {
        let path = self.data_dir.join(file_name);
        debug!(path = %path.display(), "reading canonical table");
        let file = File::open(&path).map_err(|error| EhrError::io(path.as_path(), error))?;
        Ok(ParquetReader::new(file).finish()?)
    }
}

/// Falls back to the full closed set when the request omits a dimension.
/// An explicitly empty request means the same as an omitted one.
fn defaulted<T: Copy>(requested: Option<&[T]>, all: &[T]) -> Vec<T> {
    match requested {
        Some(values) if !values.is_empty() => values.to_vec(),
        _ => all.to_vec(),
    }
}

fn subject_set(subjects: Option<&[i32]>) -> Option<HashSet<i32>> {
    match subjects {
        Some(list) if !list.is_empty() => Some(list.iter().copied().collect()),
        _ => None,
    }
}

fn apply_subject_filter(df: &DataFrame, subjects: Option<&HashSet<i32>>) -> Result<DataFrame> {
    match subjects {
        Some(set) => Ok(filter_subjects(df, set)?),
        None => Ok(df.clone()),
    }
}

/// Keeps rows whose provenance level is in the requested set.
fn filter_levels(df: &DataFrame, codes: &[i8]) -> Result<DataFrame> {
    let levels = df.column("source")?.i8()?;
    let keep: Vec<bool> = levels
        .into_iter()
        .map(|value| value.is_some_and(|code| codes.contains(&code)))
        .collect();
    let mask = Series::new("keep".into(), keep);
    Ok(df.filter(mask.bool()?)?)
}

/// Overwrites (or adds) the `source` column with the source name and
/// normalizes the column order so frames concatenate cleanly.
fn tag_source(mut df: DataFrame, name: &str) -> Result<DataFrame> {
    let height = df.height();
    df.with_column(Series::new("source".into(), vec![name; height]))?;
    Ok(df.select(["eid", "date", "source", "feature"])?)
}

/// Concatenates per-source frames in request order.
fn concat_frames(frames: Vec<DataFrame>) -> Result<DataFrame> {
    let mut frames = frames.into_iter();
    let Some(mut df) = frames.next() else {
        return Err(EhrError::Validation {
            argument: "sources",
            given: String::new(),
            accepted: "at least one source or level",
        });
    };
    for frame in frames {
        df.vstack_mut(&frame)?;
    }
    Ok(df)
}

fn append_occurrence(df: &mut DataFrame) -> Result<()> {
    let height = df.height();
    df.with_column(Series::new("value".into(), vec![1i32; height]))?;
    Ok(())
}
