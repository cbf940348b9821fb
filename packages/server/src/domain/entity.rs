//! Core domain entities: players, teams, the roster and the score board.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::value_object::{PlayerId, PlayerName, TeamName};

/// A player in one session.
///
/// A player is present exactly while their connection is: disconnecting removes them
/// from the roster, so roster membership doubles as the liveness flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Connection identifier
    pub id: PlayerId,
    /// Display name
    pub name: PlayerName,
    /// Team the player plays for
    pub team: TeamName,
}

impl Player {
    /// Create a new player
    pub fn new(id: PlayerId, name: PlayerName, team: TeamName) -> Self {
        Self { id, name, team }
    }
}

/// A team and its members in join order.
///
/// Maintained by [`Roster`]; never holds a player absent from the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: TeamName,
    pub members: Vec<PlayerId>,
}

/// Players of one session together with their team grouping.
///
/// Players and teams keep insertion order, which is the order prompts are
/// assigned in and therefore the tie-break order for votes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    players: Vec<Player>,
    teams: Vec<Team>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player, creating their team if needed.
    ///
    /// Re-adding a known id overwrites the previous entry in place and moves the
    /// player to the new team.
    pub fn add_player(&mut self, player: Player) {
        self.detach_from_team(&player.id);

        let team_name = player.team.clone();
        let player_id = player.id.clone();
        match self.players.iter_mut().find(|p| p.id == player.id) {
            Some(existing) => *existing = player,
            None => self.players.push(player),
        }

        match self.teams.iter_mut().find(|t| t.name == team_name) {
            Some(team) => team.members.push(player_id),
            None => self.teams.push(Team {
                name: team_name,
                members: vec![player_id],
            }),
        }
    }

    /// Remove a player; their team is deleted once it has no members left.
    ///
    /// Returns the removed player, or `None` if the id was unknown.
    pub fn remove_player(&mut self, player_id: &PlayerId) -> Option<Player> {
        let index = self.players.iter().position(|p| &p.id == player_id)?;
        self.detach_from_team(player_id);
        Some(self.players.remove(index))
    }

    fn detach_from_team(&mut self, player_id: &PlayerId) {
        for team in &mut self.teams {
            team.members.retain(|id| id != player_id);
        }
        self.teams.retain(|t| !t.members.is_empty());
    }

    /// Get a player by ID
    pub fn get_player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == player_id)
    }

    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.get_player(player_id).is_some()
    }

    /// Players in join order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Teams in creation order
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Points per player.
///
/// Scores only ever grow; a player starts at zero whenever they are (re-)added.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    scores: HashMap<PlayerId, u32>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a player at zero points.
    pub fn reset(&mut self, player_id: PlayerId) {
        self.scores.insert(player_id, 0);
    }

    pub fn remove(&mut self, player_id: &PlayerId) {
        self.scores.remove(player_id);
    }

    /// Add points to a player. Unknown players are ignored.
    pub fn award(&mut self, player_id: &PlayerId, points: u32) {
        if let Some(score) = self.scores.get_mut(player_id) {
            *score = score.saturating_add(points);
        }
    }

    pub fn get(&self, player_id: &PlayerId) -> Option<u32> {
        self.scores.get(player_id).copied()
    }
}
