pub mod polars;

pub use polars::{
    any_to_string, date_series, exclude_subjects, filter_subjects, to_epoch_days, unique_rows,
};
