//! Data shapes exposed over HTTP.
//!
//! The gateway keeps no records of its own; these types only describe what
//! goes in and out of the handlers. They serialize as camelCase JSON.

pub mod image;
