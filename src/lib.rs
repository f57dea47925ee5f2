//! # qadb - Q&A store
//!
//! Typed records for users, questions, replies, follows and likes, stored in
//! SQLite. Every record type shares one data-access pattern (`Record`) and
//! resolves its relationships by querying the store again.

pub mod cli;
pub mod cli_handlers;
pub mod core;
pub mod db;
pub mod error;

// Re-export commonly used types
pub use crate::core::{Follow, Like, Question, RankedQuestion, Record, Reply, User};
pub use crate::db::{Connection, DbPath, FieldMap, Schema};
pub use crate::error::{Error, Result};
