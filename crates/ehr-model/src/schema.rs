//! Raw-table registry: one static descriptor per raw extract kind.
//!
//! The descriptor is the single source of truth for which columns a raw
//! extract must carry, how each is typed, and which of them hold dates or
//! low-cardinality codes. Dispatch is over the closed [`RawTable`] enum
//! rather than file-name strings.

use polars::prelude::{Categories, DataType};

/// Declared type of one raw-extract column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Anonymized subject identifier, the join key across all domains.
    Subject,
    Int16,
    Int8,
    Text,
    /// Parsed under the day-first convention during standardization.
    Date,
    /// Low-cardinality code column, stored dictionary-encoded.
    Category,
}

impl ColumnKind {
    /// The polars dtype the standardizer coerces this column to.
    pub fn dtype(self) -> DataType {
        match self {
            ColumnKind::Subject => DataType::Int32,
            ColumnKind::Int16 => DataType::Int16,
            ColumnKind::Int8 => DataType::Int8,
            ColumnKind::Text => DataType::String,
            ColumnKind::Date => DataType::Date,
            ColumnKind::Category => DataType::from_categories(Categories::global()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn column(name: &'static str, kind: ColumnKind) -> ColumnSpec {
    ColumnSpec { name, kind }
}

/// Immutable per-table descriptor: ordered column set with declared types.
#[derive(Debug, Clone, Copy)]
pub struct TableDescriptor {
    pub columns: &'static [ColumnSpec],
}

impl TableDescriptor {
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|spec| spec.name)
    }

    pub fn date_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .filter(|spec| spec.kind == ColumnKind::Date)
            .map(|spec| spec.name)
    }
}

const EPISODE: TableDescriptor = TableDescriptor {
    columns: &[
        column("eid", ColumnKind::Subject),
        column("ins_index", ColumnKind::Int16),
        column("epistart", ColumnKind::Date),
        column("admidate", ColumnKind::Date),
    ],
};

const DIAGNOSIS_DETAIL: TableDescriptor = TableDescriptor {
    columns: &[
        column("eid", ColumnKind::Subject),
        column("ins_index", ColumnKind::Int16),
        column("level", ColumnKind::Int8),
        column("diag_icd9", ColumnKind::Category),
        column("diag_icd10", ColumnKind::Category),
    ],
};

const PROCEDURE_DETAIL: TableDescriptor = TableDescriptor {
    columns: &[
        column("eid", ColumnKind::Subject),
        column("ins_index", ColumnKind::Int16),
        column("level", ColumnKind::Int8),
        column("oper3", ColumnKind::Category),
        column("oper4", ColumnKind::Category),
        column("opdate", ColumnKind::Date),
    ],
};

const DEATH_CAUSE: TableDescriptor = TableDescriptor {
    columns: &[
        column("eid", ColumnKind::Subject),
        column("ins_index", ColumnKind::Int8),
        column("arr_index", ColumnKind::Int8),
        column("level", ColumnKind::Int8),
        column("cause_icd10", ColumnKind::Category),
    ],
};

const DEATH_DATE: TableDescriptor = TableDescriptor {
    columns: &[
        column("eid", ColumnKind::Subject),
        column("date_of_death", ColumnKind::Date),
    ],
};

const GP_CLINICAL: TableDescriptor = TableDescriptor {
    columns: &[
        column("eid", ColumnKind::Subject),
        column("data_provider", ColumnKind::Int8),
        column("event_dt", ColumnKind::Date),
        column("read_2", ColumnKind::Category),
        column("read_3", ColumnKind::Category),
        column("value1", ColumnKind::Text),
        column("value2", ColumnKind::Text),
        column("value3", ColumnKind::Text),
    ],
};

const GP_SCRIPTS: TableDescriptor = TableDescriptor {
    columns: &[
        column("eid", ColumnKind::Subject),
        column("data_provider", ColumnKind::Int8),
        column("issue_date", ColumnKind::Date),
        column("drug_name", ColumnKind::Text),
        column("quantity", ColumnKind::Text),
    ],
};

/// The seven raw extract kinds the pipeline knows how to standardize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawTable {
    /// Hospital episode table: one row per admission episode.
    Episode,
    /// Hospital diagnosis detail, keyed by (subject, episode index).
    DiagnosisDetail,
    /// Hospital procedure detail, keyed by (subject, episode index).
    ProcedureDetail,
    /// Cause-of-death rows, multiple per subject.
    DeathCause,
    /// Date of death, one per subject.
    DeathDate,
    /// Primary-care clinical events with two parallel code vocabularies.
    GpClinical,
    /// Primary-care prescription issues.
    GpScripts,
}

impl RawTable {
    pub const ALL: [RawTable; 7] = [
        RawTable::Episode,
        RawTable::DiagnosisDetail,
        RawTable::ProcedureDetail,
        RawTable::DeathCause,
        RawTable::DeathDate,
        RawTable::GpClinical,
        RawTable::GpScripts,
    ];

    /// Short name, used for the standardized parquet file and in errors.
    pub fn table_name(self) -> &'static str {
        match self {
            RawTable::Episode => "hesin",
            RawTable::DiagnosisDetail => "hesin_diag",
            RawTable::ProcedureDetail => "hesin_oper",
            RawTable::DeathCause => "death_cause",
            RawTable::DeathDate => "death",
            RawTable::GpClinical => "gp_clinical",
            RawTable::GpScripts => "gp_scripts",
        }
    }

    /// File name of the raw extract inside the raw directory.
    pub fn file_name(self) -> &'static str {
        match self {
            RawTable::Episode => "hesin.txt",
            RawTable::DiagnosisDetail => "hesin_diag.txt",
            RawTable::ProcedureDetail => "hesin_oper.txt",
            RawTable::DeathCause => "death_cause.txt",
            RawTable::DeathDate => "death.txt",
            RawTable::GpClinical => "gp_clinical.txt",
            RawTable::GpScripts => "gp_scripts.txt",
        }
    }

    pub fn descriptor(self) -> TableDescriptor {
        match self {
            RawTable::Episode => EPISODE,
            RawTable::DiagnosisDetail => DIAGNOSIS_DETAIL,
            RawTable::ProcedureDetail => PROCEDURE_DETAIL,
            RawTable::DeathCause => DEATH_CAUSE,
            RawTable::DeathDate => DEATH_DATE,
            RawTable::GpClinical => GP_CLINICAL,
            RawTable::GpScripts => GP_SCRIPTS,
        }
    }
}
