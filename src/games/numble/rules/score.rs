//! Feedback scoring.

use super::super::types::{Code, Feedback};
use super::validate::{ValidationError, validate};
use tracing::instrument;

/// Scores a guess against a secret.
///
/// `match_count` counts guess positions whose digit occurs anywhere in the
/// secret; `position_count` counts positions where the digits are equal.
#[instrument(level = "debug")]
pub fn score(secret: &Code, guess: &Code) -> Feedback {
    let mut match_count = 0;
    let mut position_count = 0;

    for (g, s) in guess.digits().iter().zip(secret.digits().iter()) {
        if secret.contains(*g) {
            match_count += 1;
        }
        if g == s {
            position_count += 1;
        }
    }

    Feedback::new(match_count, position_count)
}

/// Validates both codes, then scores them.
#[instrument(level = "debug")]
pub fn score_str(secret: &str, guess: &str) -> Result<Feedback, ValidationError> {
    let secret = validate(secret)?;
    let guess = validate(guess)?;
    Ok(score(&secret, &guess))
}
