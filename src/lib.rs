//! # MeetX Rust Backend
//!
//! Availability resolution and booking conflict engine.
//!
//! This crate is the scheduling core of the MeetX meeting platform: given
//! an organizer's recurring weekly schedule, date-specific overrides,
//! buffer rules, advanced booking rules, existing meetings and synced
//! calendar busy blocks, it computes the bookable slots for an event type
//! and timezone, and atomically validates and commits bookings against
//! concurrent bookers.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Identifier newtypes and DTO types for the booking API layer
//! - [`models`]: Interval algebra and the availability domain records
//! - [`db`]: Repository pattern over the external configuration and
//!   meeting stores
//! - [`services`]: The availability pipeline (source adapters, resolver,
//!   slot generator, rule evaluator) and the booking conflict guard
//! - [`engine`]: The facade consumed by the API layer
//!
//! ## Invariants
//!
//! All computation happens on half-open UTC intervals; timezone conversion
//! only occurs at the adapter boundary (organizer wall-clock rules in) and
//! the response boundary (viewer-local slots out). Slot listing never
//! writes; the booking guard is the sole mutation path and serializes
//! commits per organizer.

pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;

pub use engine::AvailabilityEngine;
pub use error::{EngineError, EngineResult};
