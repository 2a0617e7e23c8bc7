//! Config Entries
//!
//! A config entry represents one configured instance of an integration: a
//! single TV, a single bridge. The host owns entries; integrations receive
//! them on setup and only read them.

pub mod entry;

pub use entry::ConfigEntry;
