pub mod enums;
pub mod error;
pub mod schema;

pub use enums::{DeathLevel, GpSource, HospitalSource, Level};
pub use error::{EhrError, Result};
pub use schema::{ColumnKind, ColumnSpec, RawTable, TableDescriptor};
