//! Database access layer: connection setup and schema

mod init;

pub use init::{init_database, init_schema};
