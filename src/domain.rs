//! Domain module - tracker records and hostname rules
//!
//! Pure types and predicates with no I/O. Everything the crawler produces
//! ends up as a [`Tracker`], and every hostname inside one has passed
//! [`is_valid_hostname`].

pub mod hostname;
pub mod tracker;

pub use hostname::is_valid_hostname;
pub use tracker::{Tracker, TrackerIndexEntry, sort_by_name};
