//! # tandem-core
//!
//! Core types for the Tandem decision center.
//!
//! This crate provides the foundational types shared across all Tandem crates:
//! - Entity structs for decisions, version snapshots, and conflict records
//! - Status enums with state machine transitions
//! - The opaque decision value document and its shape rules
//! - ID prefix constants
//! - The caller-facing error taxonomy
//! - Actor identity passing
//! - Collaboration event envelope and sink trait
//! - Typed operation results

pub mod entities;
pub mod enums;
pub mod errors;
pub mod events;
pub mod identity;
pub mod ids;
pub mod responses;
pub mod value;
