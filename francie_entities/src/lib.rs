//! Database entities for the francie message log.

pub mod messages;
