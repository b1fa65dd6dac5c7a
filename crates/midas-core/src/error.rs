//! Unified Error Model
//!
//! Every error that can leave a stage is an [`UnpackError`]. Initialization
//! failures are fatal. Per-event errors come from the stage's collaborators:
//! the unpacker's decode step ([`UnpackError::Unpack`]) or the product sink
//! ([`UnpackError::Sink`]). Both are handed back to the host, which may drop
//! the event and keep going.
use thiserror::Error;

/// Error type produced by concrete unpackers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type UnpackResult<T> = Result<T, UnpackError>;

#[derive(Error, Debug)]
pub enum UnpackError {
    #[error("CONFIG/{0}")]
    Configuration(String),

    #[error("REGISTRY/unknown unpacker class '{name}', available: [{available}]")]
    UnknownImplementation { name: String, available: String },

    #[error("REGISTRY/failed to instantiate '{0}'")]
    InstantiationFailure(String),

    #[error("REGISTRY/'{0}' is not an event unpacker")]
    CapabilityMismatch(String),

    #[error("REGISTRY/{0}")]
    Registry(String),

    #[error("UNPACK/{unpacker}: {source}")]
    Unpack {
        unpacker: String,
        #[source]
        source: BoxError,
    },

    #[error("SINK/{0}")]
    Sink(String),
}

impl UnpackError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn unknown_implementation<'a>(
        name: impl Into<String>,
        available: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self::UnknownImplementation {
            name: name.into(),
            available: available.into_iter().collect::<Vec<_>>().join(", "),
        }
    }

    pub fn instantiation(name: impl Into<String>) -> Self {
        Self::InstantiationFailure(name.into())
    }

    pub fn capability_mismatch(name: impl Into<String>) -> Self {
        Self::CapabilityMismatch(name.into())
    }

    pub fn unpack(unpacker: impl Into<String>, source: BoxError) -> Self {
        Self::Unpack {
            unpacker: unpacker.into(),
            source,
        }
    }

    /// Whether the error must abort the pipeline.
    ///
    /// Unpack and sink failures concern a single event; everything else is
    /// raised during initialization.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Unpack { .. } | Self::Sink(_))
    }
}

/// Recoverable per-event conditions.
///
/// These never leave the stage as errors; they only show up in traces and
/// stage statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No unpacker instance is held while an event arrives.
    MissingUnpacker,
    /// The label's collection reference is absent.
    NullCollection,
    /// The label's collection holds no elements.
    EmptyCollection,
    /// Every element of the collection was null or failed to clone.
    NothingCloned,
    /// A single element was null.
    NullObject,
    /// A single element failed to deep-copy.
    CloneFailure,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingUnpacker => "missing_unpacker",
            Self::NullCollection => "null_collection",
            Self::EmptyCollection => "empty_collection",
            Self::NothingCloned => "nothing_cloned",
            Self::NullObject => "null_object",
            Self::CloneFailure => "clone_failure",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
