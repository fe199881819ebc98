//! Text mutation subsystem.
//!
//! # Data Flow
//! ```text
//! working text
//!     → empty? return as-is (no randomness, no backend)
//!     → coin flip (trigger probability)
//!     → Mutator
//!         local.rs    (increment one character)
//!         opposite.rs (ask backend for the opposite of one word)
//!     → mutated text, or the input on any error
//! ```
//!
//! # Design Decisions
//! - `TextTransformer::transform` never fails; errors are logged and counted
//! - Mutator, backend and random source are chosen once at startup
//! - Randomness is injected so tests can pin coin flips and picks

pub mod backend;
pub mod local;
pub mod opposite;
pub mod random;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{TransformConfig, TransformMode};
use crate::observability::metrics;
use backend::{build_backend, BackendError};

pub use local::LocalCharacterMutator;
pub use opposite::WordOppositeMutator;
pub use random::{FixedRandom, RandomSource, SeededRandom, ThreadRandom};

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("text has no tokens to mutate")]
    NoTokens,

    #[error("character {0:?} has no successor")]
    NoSuccessor(char),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// One way of producing a changed version of a text.
#[async_trait]
pub trait Mutator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn mutate(&self, text: &str, random: &dyn RandomSource) -> Result<String, TransformError>;
}

/// Fail-soft text transformer used by every hop.
pub struct TextTransformer {
    mutator: Arc<dyn Mutator>,
    random: Arc<dyn RandomSource>,
    trigger_probability: f64,
}

impl TextTransformer {
    pub fn new(
        mutator: Arc<dyn Mutator>,
        random: Arc<dyn RandomSource>,
        trigger_probability: f64,
    ) -> Self {
        Self {
            mutator,
            random,
            trigger_probability,
        }
    }

    /// Build from configuration. The opposite mode constructs its backend
    /// here; a missing credential only surfaces later, per call.
    pub fn from_config(config: &TransformConfig) -> Result<Self, BackendError> {
        let mutator: Arc<dyn Mutator> = match config.mode {
            TransformMode::Local => Arc::new(LocalCharacterMutator),
            TransformMode::Opposite => Arc::new(WordOppositeMutator::new(build_backend(config)?)),
        };

        let random: Arc<dyn RandomSource> = match config.seed {
            Some(seed) => Arc::new(SeededRandom::new(seed)),
            None => Arc::new(ThreadRandom),
        };

        tracing::info!(
            mode = %config.mode,
            trigger_probability = config.trigger_probability,
            seeded = config.seed.is_some(),
            "Text transformer configured"
        );

        Ok(Self::new(mutator, random, config.trigger_probability))
    }

    pub fn mutator_name(&self) -> &'static str {
        self.mutator.name()
    }

    pub fn trigger_probability(&self) -> f64 {
        self.trigger_probability
    }

    /// Possibly mutate `text`. Returns the input unchanged when the coin
    /// flip does not trigger or the mutator fails.
    pub async fn transform(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        if !self.random.chance(self.trigger_probability) {
            tracing::debug!(mutator = self.mutator.name(), "Mutation not triggered");
            metrics::record_mutation("skipped");
            return text.to_owned();
        }

        match self.mutator.mutate(text, self.random.as_ref()).await {
            Ok(mutated) => {
                metrics::record_mutation("mutated");
                mutated
            }
            Err(e) => {
                tracing::warn!(
                    mutator = self.mutator.name(),
                    error = %e,
                    "Mutation failed, keeping text unchanged"
                );
                metrics::record_mutation("failed");
                text.to_owned()
            }
        }
    }
}
