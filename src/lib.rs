//! trackers-block - Exodus Privacy tracker collector
//!
//! Scrapes the Exodus Privacy tracker catalog, keeps every tracker's valid
//! network hostnames and renders them as JSON, CSV or a dnsmasq blocklist.

pub mod application;
pub mod commands;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod test_utils;
