//! Sweep engine
//!
//! Resource-agnostic machinery shared by every sweeper: listing cursors,
//! listing error classification, the discovery loop, deletion with
//! aggregation, the registry and the multi-region harness.

pub mod classify;
pub mod context;
pub mod cursor;
pub mod discovery;
pub mod errors;
pub mod harness;
pub mod orchestrator;
pub mod registry;
pub mod sweepable;

pub use classify::{ListingErrorClass, classify_listing_error};
pub use context::SweepContext;
pub use cursor::{CursorError, PageCursor, TokenCursor};
pub use discovery::{KindSweeper, sweep_kind};
pub use errors::SweepErrors;
pub use harness::{SweepHarness, SweepReport, SweeperOutcome, SweeperStatus};
pub use orchestrator::{OrchestratorConfig, SweepOrchestrator};
pub use registry::{RegistryError, SweepRegistry, SweeperEntry};
pub use sweepable::Sweepable;
