//! Vote tallying and round scoring.
//!
//! Both functions are pure: they read the round's submissions and return results,
//! leaving it to [`Game`](super::game::Game) to apply them exactly once per round.

use std::collections::{HashMap, HashSet};

use super::{
    round::Winner,
    value_object::{Drawing, PlayerId, Prompt},
};

/// Points for the drawing that won its prompt's vote
pub const BEST_DRAWING_POINTS: u32 = 10;

/// Points for guessing a drawing's prompt exactly
pub const CORRECT_GUESS_POINTS: u32 = 5;

/// Points per other player who gave the same wrong guess
pub const DECOY_POINTS: u32 = 3;

/// Pick the best drawing for every distinct prompt.
///
/// Owners are grouped by their assigned prompt. Only owners who submitted a
/// drawing take part. Within a group the highest tally wins; on a tie the owner
/// assigned first wins. Groups come out in the order their prompt was first
/// assigned.
pub fn select_winners(
    assignments: &[(PlayerId, Prompt)],
    drawings: &HashMap<PlayerId, Drawing>,
    votes: &HashMap<PlayerId, HashSet<PlayerId>>,
) -> Vec<Winner> {
    let mut tally: HashMap<&PlayerId, usize> = HashMap::new();
    for owners in votes.values() {
        for owner in owners {
            *tally.entry(owner).or_default() += 1;
        }
    }

    let mut winners: Vec<Winner> = Vec::new();
    for (owner, prompt) in assignments {
        if !drawings.contains_key(owner) {
            continue;
        }
        let count = tally.get(owner).copied().unwrap_or(0);
        match winners.iter().position(|w| &w.prompt == prompt) {
            // strictly greater: the earlier owner keeps a tie
            Some(index) if count > winners[index].votes => {
                winners[index].owner = owner.clone();
                winners[index].votes = count;
            }
            Some(_) => {}
            None => winners.push(Winner {
                prompt: prompt.clone(),
                owner: owner.clone(),
                votes: count,
            }),
        }
    }
    winners
}

/// Compute the points every player earns this round.
///
/// * each winner gets [`BEST_DRAWING_POINTS`]
/// * a guess equal to the owner's prompt earns [`CORRECT_GUESS_POINTS`]
/// * a wrong guess earns [`DECOY_POINTS`] for every other guesser who typed the
///   same wrong text for the same drawing
///
/// Guesses about owners with no assignment (they left) are skipped.
pub fn score_round(
    assignments: &[(PlayerId, Prompt)],
    winners: &[Winner],
    guesses: &HashMap<PlayerId, HashMap<PlayerId, String>>,
) -> HashMap<PlayerId, u32> {
    let mut awards: HashMap<PlayerId, u32> = HashMap::new();

    for winner in winners {
        *awards.entry(winner.owner.clone()).or_default() += BEST_DRAWING_POINTS;
    }

    let prompt_of = |owner: &PlayerId| {
        assignments
            .iter()
            .find(|(id, _)| id == owner)
            .map(|(_, prompt)| prompt)
    };

    for (guesser, by_owner) in guesses {
        for (owner, guess) in by_owner {
            let Some(correct) = prompt_of(owner) else {
                continue;
            };

            let points = if correct.matches(guess) {
                CORRECT_GUESS_POINTS
            } else {
                let fooled = guesses
                    .iter()
                    .filter(|(other, _)| *other != guesser)
                    .filter(|(_, theirs)| theirs.get(owner) == Some(guess))
                    .count() as u32;
                fooled * DECOY_POINTS
            };

            if points > 0 {
                *awards.entry(guesser.clone()).or_default() += points;
            }
        }
    }

    awards
}
