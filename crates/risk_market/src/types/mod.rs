//! Basic value types: dates and currencies.

pub mod currency;
pub mod error;
pub mod time;

pub use currency::Currency;
pub use error::{CurrencyError, DateError};
pub use time::Date;
