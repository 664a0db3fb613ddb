//! Core application logic for the school portal
//!
//! This crate contains the logic behind the portal screens: currency
//! conversion and formatting, fee totals, exam result summaries and the
//! notification inbox.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod currency;
pub mod fees;
pub mod notifications;
pub mod results;

pub use currency::{CurrencyCode, CurrencyError, CurrencyState};
pub use fees::{FeeOverview, FeeSelection};
pub use notifications::{NotificationFilter, NotificationInbox};
pub use results::{PerformanceLabel, ResultFilter, ResultsView};
