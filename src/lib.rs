//! fogg-task: personal task service.
//!
//! Tasks carry importance/urgency flags, form parent/child hierarchies and
//! can be drafted by an AI planning assistant. Drafted tasks wait in
//! `pending_approval` until the user accepts them.

pub mod ai;
pub mod api;
pub mod cli;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod filter;
pub mod format;
pub mod hierarchy;
pub mod logging;
pub mod status;
pub mod types;
