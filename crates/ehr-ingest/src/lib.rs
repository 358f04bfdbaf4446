pub mod dates;
pub mod standardize;
pub mod withdrawals;

pub use dates::parse_date_day_first;
pub use standardize::{standardize_all, standardize_table};
pub use withdrawals::WithdrawalSet;
