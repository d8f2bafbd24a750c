//! Scores a guess against the round's item.

use faceguess_protocol::Guess;

use crate::Item;

/// Best possible result for one round: exact age plus both matches.
pub const MAX_POINTS: u32 = 5;

/// Points for one guess and one feedback line per field (age, category,
/// gender, in that order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    pub points: u32,
    pub feedback: Vec<String>,
}

/// Scores `guess` against `actual`.
///
/// | age difference | points |
/// |----------------|--------|
/// | 0              | 3      |
/// | 1–3            | 2      |
/// | 4–5            | 1      |
/// | 6+             | 0      |
///
/// Category and gender are worth one point each. The age line always
/// reveals the real age; the other two reveal the real value on a miss.
pub fn score(guess: &Guess, actual: &Item) -> Score {
    let mut points = 0;
    let mut feedback = Vec::with_capacity(3);

    let (age_points, verdict) = match guess.age.abs_diff(actual.age) {
        0 => (3, "exact age match"),
        1..=3 => (2, "close age"),
        4..=5 => (1, "somewhat close age"),
        _ => (0, "wrong age"),
    };
    points += age_points;
    feedback.push(format!("{verdict} ({})", actual.age));

    if guess.category == actual.category {
        points += 1;
        feedback.push("correct category".to_string());
    } else {
        feedback.push(format!("wrong category ({})", actual.category));
    }

    if guess.gender == actual.gender {
        points += 1;
        feedback.push("correct gender".to_string());
    } else {
        feedback.push(format!("wrong gender ({})", actual.gender));
    }

    Score { points, feedback }
}
