//! Per-round submissions.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::value_object::{Drawing, PlayerId, Prompt};

/// Drawing that won its prompt's vote and goes on to the guessing phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub prompt: Prompt,
    pub owner: PlayerId,
    pub votes: usize,
}

/// Everything players submitted during the current round.
///
/// Every map is keyed by a player present in the roster; [`RoundState::purge`]
/// is called whenever a player leaves.
#[derive(Debug, Clone, Default)]
pub struct RoundState {
    /// Prompt per player, in assignment order
    assignments: Vec<(PlayerId, Prompt)>,
    drawings: HashMap<PlayerId, Drawing>,
    /// Voter -> drawing owners voted for
    votes: HashMap<PlayerId, HashSet<PlayerId>>,
    /// One per distinct prompt, in first-assignment order
    winners: Vec<Winner>,
    /// Guesser -> (drawing owner -> guessed prompt)
    guesses: HashMap<PlayerId, HashMap<PlayerId, String>>,
}

impl RoundState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything, ready for the next round.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn assign(&mut self, player_id: PlayerId, prompt: Prompt) {
        self.assignments.retain(|(id, _)| id != &player_id);
        self.assignments.push((player_id, prompt));
    }

    pub fn assignments(&self) -> &[(PlayerId, Prompt)] {
        &self.assignments
    }

    pub fn prompt_of(&self, player_id: &PlayerId) -> Option<&Prompt> {
        self.assignments
            .iter()
            .find(|(id, _)| id == player_id)
            .map(|(_, prompt)| prompt)
    }

    pub fn submit_drawing(&mut self, player_id: PlayerId, drawing: Drawing) {
        self.drawings.insert(player_id, drawing);
    }

    pub fn drawings(&self) -> &HashMap<PlayerId, Drawing> {
        &self.drawings
    }

    pub fn submit_votes(&mut self, voter: PlayerId, owners: HashSet<PlayerId>) {
        self.votes.insert(voter, owners);
    }

    pub fn votes(&self) -> &HashMap<PlayerId, HashSet<PlayerId>> {
        &self.votes
    }

    pub fn set_winners(&mut self, winners: Vec<Winner>) {
        self.winners = winners;
    }

    pub fn winners(&self) -> &[Winner] {
        &self.winners
    }

    pub fn is_winner(&self, owner: &PlayerId) -> bool {
        self.winners.iter().any(|w| &w.owner == owner)
    }

    pub fn submit_guesses(&mut self, guesser: PlayerId, guesses: HashMap<PlayerId, String>) {
        self.guesses.insert(guesser, guesses);
    }

    pub fn guesses(&self) -> &HashMap<PlayerId, HashMap<PlayerId, String>> {
        &self.guesses
    }

    /// Drop every entry keyed by a departing player.
    ///
    /// Entries *naming* the player (votes for them, guesses about their drawing)
    /// stay; scoring skips owners without an assignment. Only the leaver's own
    /// entries go, so the others' submissions still count towards the smaller
    /// roster and a departure can complete the phase.
    pub fn purge(&mut self, player_id: &PlayerId) {
        self.assignments.retain(|(id, _)| id != player_id);
        self.drawings.remove(player_id);
        self.votes.remove(player_id);
        self.guesses.remove(player_id);
        self.winners.retain(|w| &w.owner != player_id);
    }
}
