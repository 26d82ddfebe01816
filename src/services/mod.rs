//! Service layer: the availability pipeline and the booking guard.
//!
//! Data flow: the resolver pulls raw inputs through the source adapters
//! into a free timeline, the slot generator expands candidate slots, the
//! rule evaluator filters them. A booking re-runs a narrow form of the
//! same pipeline inside the conflict guard before committing.

pub mod booking;
pub mod resolver;
pub mod rules;
pub mod slots;
pub mod sources;

pub use booking::{BookingGuard, BookingOutcome, RejectionReason};
pub use resolver::{resolve_availability, ResolveOptions, ResolvedAvailability};
pub use rules::{evaluate_slot, filter_slots, RuleContext};
pub use slots::{generate_slots, SlotParams};
