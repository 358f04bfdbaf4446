//! Retrieval-layer tests over canonical parquet fixtures.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::{DataFrame, NamedFrom, ParquetWriter, Series};
use tempfile::tempdir;

use ehr_common::date_series;
use ehr_model::{DeathLevel, EhrError, GpSource, HospitalSource, Level};
use ehr_query::DataLoader;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn write_frame(dir: &Path, name: &str, mut df: DataFrame) {
    let file = File::create(dir.join(format!("{name}.parquet"))).unwrap();
    ParquetWriter::new(file).finish(&mut df).unwrap();
}

fn hospital_frame(features: &[&str], levels: &[i8]) -> DataFrame {
    let eids: Vec<i32> = (1..=features.len() as i32).collect();
    let dates: Vec<Option<NaiveDate>> = vec![
        Some(date(2010, 2, 16)),
        Some(date(2015, 3, 31)),
        Some(date(1913, 9, 4)),
    ][..features.len()]
        .to_vec();
    DataFrame::new(vec![
        Series::new("eid".into(), eids).into(),
        date_series("date", &dates).into(),
        Series::new("source".into(), levels.to_vec()).into(),
        Series::new(
            "feature".into(),
            features.iter().map(|f| (*f).to_string()).collect::<Vec<_>>(),
        )
        .into(),
    ])
    .unwrap()
}

fn event_frame(eids: &[i32], features: &[&str]) -> DataFrame {
    let dates: Vec<Option<NaiveDate>> = eids
        .iter()
        .map(|eid| Some(date(2012, 4, (*eid as u32).clamp(1, 28))))
        .collect();
    DataFrame::new(vec![
        Series::new("eid".into(), eids.to_vec()).into(),
        date_series("date", &dates).into(),
        Series::new(
            "feature".into(),
            features.iter().map(|f| (*f).to_string()).collect::<Vec<_>>(),
        )
        .into(),
    ])
    .unwrap()
}

fn source_tags(df: &DataFrame) -> Vec<String> {
    df.column("source")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|value| value.unwrap().to_string())
        .collect()
}

fn eids(df: &DataFrame) -> Vec<i32> {
    df.column("eid")
        .unwrap()
        .i32()
        .unwrap()
        .into_iter()
        .flatten()
        .collect()
}

#[test]
fn construction_rejects_missing_directory() {
    let err = DataLoader::new("no/such/data_dir").unwrap_err();
    match err {
        EhrError::Configuration { location } => {
            assert!(location.to_string_lossy().contains("data_dir"));
        }
        other => panic!("expected configuration error, got {other}"),
    }
}

#[test]
fn construction_rejects_empty_directory() {
    let dir = tempdir().unwrap();
    let err = DataLoader::new(dir.path()).unwrap_err();
    assert!(matches!(err, EhrError::Configuration { .. }));
}

#[test]
fn hospital_level_filter_keeps_only_requested_levels() {
    let dir = tempdir().unwrap();
    write_frame(
        dir.path(),
        "ehr_diagnosis_icd10",
        hospital_frame(&["N181", "N182"], &[1, 2]),
    );

    let loader = DataLoader::new(dir.path()).unwrap();
    let df = loader
        .hospital(
            Some(&[HospitalSource::Icd10]),
            Some(&[Level::Primary]),
            None,
        )
        .unwrap();

    assert_eq!(df.height(), 1);
    assert_eq!(eids(&df), vec![1]);
    assert_eq!(source_tags(&df), vec!["icd10"]);
    let value = df.column("value").unwrap().i32().unwrap();
    assert_eq!(value.get(0), Some(1));
    assert!(df.column("date_of_visit").is_ok());
}

#[test]
fn hospital_subject_filter_intersects_with_table_subjects() {
    let dir = tempdir().unwrap();
    write_frame(
        dir.path(),
        "ehr_diagnosis_icd9",
        hospital_frame(&["585", "585", "585"], &[1, 2, 2]),
    );

    let loader = DataLoader::new(dir.path()).unwrap();
    let df = loader
        .hospital(Some(&[HospitalSource::Icd9]), None, Some(&[1, 2, 999]))
        .unwrap();
    assert_eq!(eids(&df), vec![1, 2]);

    // An empty subject slice means no filtering at all.
    let df = loader
        .hospital(Some(&[HospitalSource::Icd9]), None, Some(&[]))
        .unwrap();
    assert_eq!(df.height(), 3);
}

#[test]
fn hospital_concatenates_sources_in_request_order() {
    let dir = tempdir().unwrap();
    write_frame(
        dir.path(),
        "ehr_diagnosis_icd10",
        hospital_frame(&["N181", "N182", "N181"], &[1, 2, 2]),
    );
    write_frame(
        dir.path(),
        "ehr_diagnosis_icd9",
        hospital_frame(&["585", "585", "585"], &[1, 2, 2]),
    );

    let loader = DataLoader::new(dir.path()).unwrap();
    let df = loader
        .hospital(
            Some(&[HospitalSource::Icd10, HospitalSource::Icd9]),
            Some(&[Level::Primary, Level::Secondary]),
            None,
        )
        .unwrap();

    assert_eq!(df.height(), 6);
    assert_eq!(
        source_tags(&df),
        vec!["icd10", "icd10", "icd10", "icd9", "icd9", "icd9"]
    );
}

#[test]
fn hospital_defaults_cover_all_levels_including_external() {
    let dir = tempdir().unwrap();
    write_frame(
        dir.path(),
        "ehr_procedures_opcs4",
        hospital_frame(&["X403", "X404", "X405"], &[1, 2, 3]),
    );

    let loader = DataLoader::new(dir.path()).unwrap();
    let all = loader
        .hospital(Some(&[HospitalSource::Opcs4]), None, None)
        .unwrap();
    assert_eq!(all.height(), 3);

    let primary_only = loader
        .hospital(Some(&[HospitalSource::Opcs4]), Some(&[Level::Primary]), None)
        .unwrap();
    assert_eq!(primary_only.height(), 1);
    assert_eq!(eids(&primary_only), vec![1]);
}

#[test]
fn unsupported_source_name_reports_the_accepted_set() {
    let err = "icd11".parse::<HospitalSource>().unwrap_err();
    let message = err.to_string();
    assert!(message.contains("icd11"));
    assert!(message.contains("icd9, icd10, opcs3, opcs4"));
}

#[test]
fn death_levels_concatenate_like_separate_queries() {
    let dir = tempdir().unwrap();
    write_frame(
        dir.path(),
        "death_icd10_primary",
        event_frame(&[1, 2, 3], &["N181", "N182", "N181"]),
    );
    write_frame(
        dir.path(),
        "death_icd10_secondary",
        event_frame(&[1, 2, 3], &["N181", "N182", "N181"]),
    );

    let loader = DataLoader::new(dir.path()).unwrap();
    let combined = loader.death(None, None).unwrap();
    assert_eq!(combined.height(), 6);
    assert!(combined.column("date_of_death").is_ok());

    let mut stacked = loader.death(Some(&[DeathLevel::Primary]), None).unwrap();
    let secondary = loader.death(Some(&[DeathLevel::Secondary]), None).unwrap();
    stacked.vstack_mut(&secondary).unwrap();
    assert!(combined.equals_missing(&stacked));
}

#[test]
fn death_subject_filter_and_level_tagging() {
    let dir = tempdir().unwrap();
    write_frame(
        dir.path(),
        "death_icd10_primary",
        event_frame(&[1, 2, 3], &["N181", "N182", "N181"]),
    );

    let loader = DataLoader::new(dir.path()).unwrap();
    let df = loader
        .death(Some(&[DeathLevel::Primary]), Some(&[1, 2]))
        .unwrap();
    assert_eq!(eids(&df), vec![1, 2]);
    assert_eq!(source_tags(&df), vec!["primary", "primary"]);
}

#[test]
fn gp_clinical_defaults_to_the_union_of_both_vocabularies() {
    let dir = tempdir().unwrap();
    write_frame(
        dir.path(),
        "ehr_diagnosis_read2",
        event_frame(&[1, 2, 3], &["79010", "79010", "79010"]),
    );
    write_frame(
        dir.path(),
        "ehr_diagnosis_read3",
        event_frame(&[4, 5], &["XaA1S", "XaA1S"]),
    );

    let loader = DataLoader::new(dir.path()).unwrap();
    let df = loader.gp_clinical(None, None).unwrap();

    // Row count is the sum of the two source tables, each row tagged with
    // its own vocabulary name.
    assert_eq!(df.height(), 5);
    assert_eq!(
        source_tags(&df),
        vec!["read_2", "read_2", "read_2", "read_3", "read_3"]
    );
    assert!(df.column("date_of_visit").is_ok());
}

#[test]
fn gp_clinical_single_vocabulary_with_subjects() {
    let dir = tempdir().unwrap();
    write_frame(
        dir.path(),
        "ehr_diagnosis_read2",
        event_frame(&[1, 2, 3], &["79010", "79011", "79012"]),
    );

    let loader = DataLoader::new(dir.path()).unwrap();
    let df = loader
        .gp_clinical(Some(&[GpSource::Read2]), Some(&[1, 2]))
        .unwrap();
    assert_eq!(eids(&df), vec![1, 2]);
    assert_eq!(source_tags(&df), vec!["read_2", "read_2"]);
}

#[test]
fn gp_medications_have_issue_dates_and_no_source_dimension() {
    let dir = tempdir().unwrap();
    write_frame(
        dir.path(),
        "gp_medications",
        event_frame(&[1, 2, 3], &["Atorvastatin", "Metformin", "Ramipril"]),
    );

    let loader = DataLoader::new(dir.path()).unwrap();
    let df = loader.gp_medications(Some(&[2])).unwrap();
    assert_eq!(eids(&df), vec![2]);
    assert!(df.column("date_of_issue").is_ok());
    assert!(df.column("source").is_err());
    assert!(df.column("value").is_err());

    let full = loader.gp_medications(None).unwrap();
    assert_eq!(full.height(), 3);
}

#[test]
fn every_returned_row_matches_the_request() {
    let dir = tempdir().unwrap();
    write_frame(
        dir.path(),
        "ehr_diagnosis_icd10",
        hospital_frame(&["N181", "N182", "N183"], &[1, 2, 3]),
    );
    write_frame(
        dir.path(),
        "ehr_procedures_opcs3",
        hospital_frame(&["4695", "4696", "4697"], &[2, 2, 3]),
    );

    let loader = DataLoader::new(dir.path()).unwrap();
    let requested = [HospitalSource::Icd10, HospitalSource::Opcs3];
    let df = loader
        .hospital(Some(&requested), Some(&[Level::Secondary]), None)
        .unwrap();

    let names: Vec<&str> = requested.iter().map(|source| source.as_str()).collect();
    for tag in source_tags(&df) {
        assert!(names.contains(&tag.as_str()));
    }
    // Secondary-only request: rows with levels 1 and 3 are gone.
    assert_eq!(df.height(), 3);
}
