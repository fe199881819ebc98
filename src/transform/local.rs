//! Single character increment, no external calls.

use async_trait::async_trait;

use super::{Mutator, TransformError};
use crate::transform::random::RandomSource;

/// Replaces one randomly chosen character with the next Unicode scalar value.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalCharacterMutator;

#[async_trait]
impl Mutator for LocalCharacterMutator {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn mutate(&self, text: &str, random: &dyn RandomSource) -> Result<String, TransformError> {
        let mut chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Err(TransformError::NoTokens);
        }

        let idx = random.index(chars.len());
        let current = chars[idx];
        chars[idx] = next_scalar(current).ok_or(TransformError::NoSuccessor(current))?;

        Ok(chars.into_iter().collect())
    }
}

/// Next scalar value after `c`, stepping over the surrogate range.
fn next_scalar(c: char) -> Option<char> {
    match c {
        '\u{D7FF}' => Some('\u{E000}'),
        char::MAX => None,
        c => char::from_u32(c as u32 + 1),
    }
}
