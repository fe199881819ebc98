//! Word replacement delegated to a generation backend.

use std::sync::Arc;

use async_trait::async_trait;

use super::backend::Backend;
use super::{Mutator, TransformError};
use crate::transform::random::RandomSource;

pub const PROMPT_PREFIX: &str = "Return only a single word that is the opposite of: ";

/// Asks the backend for the opposite of one randomly chosen word.
///
/// Tokens are rejoined with single spaces, so runs of whitespace in the
/// input collapse.
pub struct WordOppositeMutator {
    backend: Arc<dyn Backend>,
}

impl WordOppositeMutator {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

pub fn opposite_prompt(word: &str) -> String {
    format!("{PROMPT_PREFIX}{word}")
}

#[async_trait]
impl Mutator for WordOppositeMutator {
    fn name(&self) -> &'static str {
        "opposite"
    }

    async fn mutate(&self, text: &str, random: &dyn RandomSource) -> Result<String, TransformError> {
        let mut tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(TransformError::NoTokens);
        }

        let idx = random.index(tokens.len());
        let replacement = self.backend.complete(&opposite_prompt(tokens[idx])).await?;
        tokens[idx] = &replacement;

        Ok(tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::backend::BackendError;
    use crate::transform::random::FixedRandom;
    use std::sync::Mutex;

    struct Recording {
        reply: Option<&'static str>,
        prompts: Mutex<Vec<String>>,
    }

    impl Recording {
        fn replying(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Backend for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
            self.prompts.lock().unwrap().push(prompt.to_owned());
            self.reply
                .map(str::to_owned)
                .ok_or(BackendError::MissingCredential)
        }
    }

    #[tokio::test]
    async fn test_single_token_is_always_selected() {
        let backend = Recording::replying("cold");
        let mutator = WordOppositeMutator::new(backend.clone());

        // index requests past the end are clamped by the source
        let out = mutator.mutate("hot", &FixedRandom::always(7)).await.unwrap();
        assert_eq!(out, "cold");
        assert_eq!(
            *backend.prompts.lock().unwrap(),
            vec!["Return only a single word that is the opposite of: hot".to_string()]
        );
    }

    #[tokio::test]
    async fn test_replaces_chosen_token_and_normalizes_whitespace() {
        let backend = Recording::replying("changed");
        let mutator = WordOppositeMutator::new(backend);

        let out = mutator
            .mutate("  hello \t  world\n", &FixedRandom::always(1))
            .await
            .unwrap();
        assert_eq!(out, "hello changed");
    }

    #[tokio::test]
    async fn test_backend_error_propagates_to_caller() {
        let mutator = WordOppositeMutator::new(Recording::failing());
        let err = mutator.mutate("up", &FixedRandom::always(0)).await.unwrap_err();
        assert!(matches!(err, TransformError::Backend(BackendError::MissingCredential)));
    }

    #[tokio::test]
    async fn test_whitespace_only_has_no_tokens() {
        let backend = Recording::replying("x");
        let mutator = WordOppositeMutator::new(backend.clone());
        let err = mutator.mutate(" \n ", &FixedRandom::always(0)).await.unwrap_err();
        assert!(matches!(err, TransformError::NoTokens));
        assert!(backend.prompts.lock().unwrap().is_empty());
    }
}
