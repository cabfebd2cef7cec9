//! Error taxonomy for the engine (spec §7).
//!
//! Construction errors are scoped to the sub-object that failed (caught and
//! logged by the caller); invalid-state errors indicate an engine bug and
//! propagate; rule-dead-ends (no legal action) are not errors at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A single action (Strike/Spell/Heal/Raise Shield) failed to build
    /// from its descriptor. The creature construction catches this,
    /// drops the offending action, and continues.
    #[error("failed to build action '{subject}': {reason}")]
    Construction { subject: String, reason: String },

    /// A creature descriptor itself could not be turned into a `Creature`.
    /// This fails the whole simulation, per spec §7.1.
    #[error("failed to construct creature '{name}': {reason}")]
    MalformedCreature { name: String, reason: String },

    /// A condition that should be unreachable given a correctly built
    /// engine: a turn taken on a creature with no encounter handle, an
    /// unrecognized save-throw name, etc.
    #[error("invalid engine state: {0}")]
    InvalidState(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
