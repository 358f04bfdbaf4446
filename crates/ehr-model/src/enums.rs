//! Closed enumerations for query sources and provenance levels.
//!
//! Requests enter the retrieval layer as typed values; the `FromStr`
//! implementations are the only string boundary, and they reject anything
//! outside the closed set with an error naming the accepted values.

use std::fmt;
use std::str::FromStr;

use crate::error::EhrError;

/// Provenance level of a hospital diagnosis or procedure code.
///
/// Stored as a small integer in the canonical tables and rendered as a
/// lowercase string everywhere user-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Primary,
    Secondary,
    External,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Primary, Level::Secondary, Level::External];
    const ACCEPTED: &'static str = "primary, secondary, external";

    /// On-disk encoding of the level column.
    pub fn code(self) -> i8 {
        match self {
            Level::Primary => 1,
            Level::Secondary => 2,
            Level::External => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Primary => "primary",
            Level::Secondary => "secondary",
            Level::External => "external",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = EhrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(Level::Primary),
            "secondary" => Ok(Level::Secondary),
            "external" => Ok(Level::External),
            other => Err(EhrError::Validation {
                argument: "level",
                given: other.to_string(),
                accepted: Self::ACCEPTED,
            }),
        }
    }
}

/// Provenance level of a mortality cause row.
///
/// A distinct type from [`Level`]: death registrations carry no external
/// tier, and keeping the narrower domain in the type system means a
/// mortality query can never be asked for one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeathLevel {
    Primary,
    Secondary,
}

impl DeathLevel {
    pub const ALL: [DeathLevel; 2] = [DeathLevel::Primary, DeathLevel::Secondary];
    const ACCEPTED: &'static str = "primary, secondary";

    pub fn code(self) -> i8 {
        match self {
            DeathLevel::Primary => 1,
            DeathLevel::Secondary => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeathLevel::Primary => "primary",
            DeathLevel::Secondary => "secondary",
        }
    }

    /// Canonical table name for this level.
    pub fn table_name(self) -> &'static str {
        match self {
            DeathLevel::Primary => "death_icd10_primary",
            DeathLevel::Secondary => "death_icd10_secondary",
        }
    }

    /// Canonical table file for this level.
    pub fn file_name(self) -> &'static str {
        match self {
            DeathLevel::Primary => "death_icd10_primary.parquet",
            DeathLevel::Secondary => "death_icd10_secondary.parquet",
        }
    }
}

impl fmt::Display for DeathLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeathLevel {
    type Err = EhrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(DeathLevel::Primary),
            "secondary" => Ok(DeathLevel::Secondary),
            other => Err(EhrError::Validation {
                argument: "level",
                given: other.to_string(),
                accepted: Self::ACCEPTED,
            }),
        }
    }
}

/// Coding system served by the hospital query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HospitalSource {
    Icd9,
    Icd10,
    Opcs3,
    Opcs4,
}

impl HospitalSource {
    pub const ALL: [HospitalSource; 4] = [
        HospitalSource::Icd9,
        HospitalSource::Icd10,
        HospitalSource::Opcs3,
        HospitalSource::Opcs4,
    ];
    const ACCEPTED: &'static str = "icd9, icd10, opcs3, opcs4";

    pub fn as_str(self) -> &'static str {
        match self {
            HospitalSource::Icd9 => "icd9",
            HospitalSource::Icd10 => "icd10",
            HospitalSource::Opcs3 => "opcs3",
            HospitalSource::Opcs4 => "opcs4",
        }
    }

    /// Canonical table file for this coding system.
    pub fn file_name(self) -> &'static str {
        match self {
            HospitalSource::Icd9 => "ehr_diagnosis_icd9.parquet",
            HospitalSource::Icd10 => "ehr_diagnosis_icd10.parquet",
            HospitalSource::Opcs3 => "ehr_procedures_opcs3.parquet",
            HospitalSource::Opcs4 => "ehr_procedures_opcs4.parquet",
        }
    }
}

impl fmt::Display for HospitalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HospitalSource {
    type Err = EhrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "icd9" => Ok(HospitalSource::Icd9),
            "icd10" => Ok(HospitalSource::Icd10),
            "opcs3" => Ok(HospitalSource::Opcs3),
            "opcs4" => Ok(HospitalSource::Opcs4),
            other => Err(EhrError::Validation {
                argument: "source",
                given: other.to_string(),
                accepted: Self::ACCEPTED,
            }),
        }
    }
}

/// Code vocabulary served by the primary-care query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpSource {
    Read2,
    Read3,
}

impl GpSource {
    pub const ALL: [GpSource; 2] = [GpSource::Read2, GpSource::Read3];
    const ACCEPTED: &'static str = "read_2, read_3";

    pub fn as_str(self) -> &'static str {
        match self {
            GpSource::Read2 => "read_2",
            GpSource::Read3 => "read_3",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            GpSource::Read2 => "ehr_diagnosis_read2.parquet",
            GpSource::Read3 => "ehr_diagnosis_read3.parquet",
        }
    }
}

impl fmt::Display for GpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GpSource {
    type Err = EhrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read_2" => Ok(GpSource::Read2),
            "read_3" => Ok(GpSource::Read3),
            other => Err(EhrError::Validation {
                argument: "source",
                given: other.to_string(),
                accepted: Self::ACCEPTED,
            }),
        }
    }
}
