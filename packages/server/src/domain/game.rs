//! Per-session game state machine.
//!
//! `Game` is synchronous and knows nothing about timers or sockets. Every
//! operation returns a [`Step`]: the notifications to deliver and, when the
//! phase changed, a [`PhaseChange`] telling the caller which timer to arm.
//! Phase advancement has exactly two entry points, a completed quorum (inside
//! the submit/remove operations) and [`Game::expire`], and both go through
//! the same transition code.
//!
//! ```text
//! Waiting --start--> Drawing --quorum|timeout--> Voting --quorum|timeout-->
//! Guessing --quorum|timeout--> Results --timeout--> Waiting
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};

use super::{
    entity::{Player, Roster, ScoreBoard},
    error::GameError,
    event::{
        Audience, GameEvent, GuessCandidate, Notification, PhaseStarted, RosterSnapshot,
        ScoreLine, VoteCandidate,
    },
    phase::Phase,
    prompt::PromptBank,
    round::RoundState,
    scoring,
    value_object::{Drawing, PlayerId},
};

/// Default length of the drawing phase
pub const DEFAULT_DRAWING_DURATION: Duration = Duration::from_secs(300);

/// Default length of the voting phase
pub const DEFAULT_VOTING_DURATION: Duration = Duration::from_secs(120);

/// Default length of the guessing phase
pub const DEFAULT_GUESSING_DURATION: Duration = Duration::from_secs(180);

/// Default time results stay up before the lobby reopens
pub const DEFAULT_RESULTS_DURATION: Duration = Duration::from_secs(30);

/// Default minimum number of players to start a round
pub const DEFAULT_MIN_PLAYERS: usize = 2;

/// Phase durations and start requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub drawing: Duration,
    pub voting: Duration,
    pub guessing: Duration,
    pub results: Duration,
    pub min_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            drawing: DEFAULT_DRAWING_DURATION,
            voting: DEFAULT_VOTING_DURATION,
            guessing: DEFAULT_GUESSING_DURATION,
            results: DEFAULT_RESULTS_DURATION,
            min_players: DEFAULT_MIN_PLAYERS,
        }
    }
}

impl GameConfig {
    /// How long `phase` may last before it is advanced; `None` for the lobby.
    pub fn timeout(&self, phase: Phase) -> Option<Duration> {
        match phase {
            Phase::Waiting => None,
            Phase::Drawing => Some(self.drawing),
            Phase::Voting => Some(self.voting),
            Phase::Guessing => Some(self.guessing),
            Phase::Results => Some(self.results),
        }
    }
}

/// A phase transition that happened during a [`Step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub phase: Phase,
    /// Transition counter; a timer armed for this phase must present it to [`Game::expire`]
    pub epoch: u64,
    /// Timer to arm for the new phase, if any
    pub timeout: Option<Duration>,
}

/// Outcome of one game operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    pub notifications: Vec<Notification>,
    pub phase_change: Option<PhaseChange>,
}

impl Step {
    fn broadcast(&mut self, event: GameEvent) {
        self.notifications.push(Notification {
            audience: Audience::All,
            event,
        });
    }

    fn send_to(&mut self, player_id: PlayerId, event: GameEvent) {
        self.notifications.push(Notification {
            audience: Audience::Player(player_id),
            event,
        });
    }
}

/// State of one session: roster, scores, current phase and round submissions.
#[derive(Debug)]
pub struct Game {
    roster: Roster,
    scores: ScoreBoard,
    phase: Phase,
    epoch: u64,
    round: RoundState,
    prompts: Arc<PromptBank>,
    config: GameConfig,
    rng: ChaCha8Rng,
}

impl Game {
    /// Create a game in the lobby, seeded from OS entropy.
    pub fn new(prompts: Arc<PromptBank>, config: GameConfig) -> Self {
        Self::with_rng(prompts, config, ChaCha8Rng::from_entropy())
    }

    /// Create a game with a caller-provided RNG (deterministic prompt draws).
    pub fn with_rng(prompts: Arc<PromptBank>, config: GameConfig, rng: ChaCha8Rng) -> Self {
        Self {
            roster: Roster::new(),
            scores: ScoreBoard::new(),
            phase: Phase::Waiting,
            epoch: 0,
            round: RoundState::new(),
            prompts,
            config,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn roster_snapshot(&self) -> RosterSnapshot {
        RosterSnapshot {
            players: self.roster.players().to_vec(),
            teams: self.roster.teams().to_vec(),
        }
    }

    /// Scores in join order
    pub fn score_lines(&self) -> Vec<ScoreLine> {
        self.roster
            .players()
            .iter()
            .map(|p| ScoreLine {
                player: p.id.clone(),
                name: p.name.clone(),
                team: p.team.clone(),
                score: self.score_of(&p.id),
            })
            .collect()
    }

    /// Every roster member has a score entry from `add_player` onwards.
    fn score_of(&self, player_id: &PlayerId) -> u32 {
        let score = self.scores.get(player_id);
        debug_assert!(score.is_some(), "no score entry for player '{player_id}'");
        score.unwrap_or_default()
    }

    /// Add (or re-add) a player with a score of zero.
    ///
    /// A player arriving during drawing gets a prompt right away, so they count
    /// towards the drawing quorum like everyone else.
    pub fn add_player(&mut self, player: Player) -> Step {
        tracing::debug!(player = %player.id, team = %player.team, "player added");
        let player_id = player.id.clone();
        self.scores.reset(player_id.clone());
        self.roster.add_player(player);

        let mut step = Step::default();
        step.broadcast(GameEvent::RosterChanged(self.roster_snapshot()));
        if self.phase == Phase::Drawing {
            let prompt = match self.round.prompt_of(&player_id) {
                Some(prompt) => prompt.clone(),
                None => {
                    let prompt = self.prompts.draw(&mut self.rng);
                    self.round.assign(player_id.clone(), prompt.clone());
                    prompt
                }
            };
            let seconds = self.seconds(Phase::Drawing);
            step.send_to(
                player_id,
                GameEvent::PhaseStarted(PhaseStarted::Drawing { prompt, seconds }),
            );
        }
        step
    }

    /// Remove a player and everything they submitted this round.
    ///
    /// The quorum is re-checked against the smaller roster, so a departure can
    /// complete the current phase.
    pub fn remove_player(&mut self, player_id: &PlayerId) -> Step {
        let mut step = Step::default();
        if self.roster.remove_player(player_id).is_none() {
            return step;
        }
        tracing::debug!(player = %player_id, "player removed");
        self.scores.remove(player_id);
        self.round.purge(player_id);

        step.broadcast(GameEvent::RosterChanged(self.roster_snapshot()));
        if self.quorum_reached() {
            self.advance(&mut step);
        }
        step
    }

    /// Leave the lobby and hand every player a fresh prompt.
    ///
    /// # Errors
    ///
    /// * `UnknownPlayer` if the requester is not in the roster
    /// * `PhaseMismatch` unless the game is waiting
    /// * `InsufficientPlayers` below [`GameConfig::min_players`]
    pub fn start(&mut self, requested_by: &PlayerId) -> Result<Step, GameError> {
        self.ensure_player(requested_by)?;
        self.ensure_phase(Phase::Waiting)?;
        if self.roster.len() < self.config.min_players {
            return Err(GameError::InsufficientPlayers {
                required: self.config.min_players,
                current: self.roster.len(),
            });
        }

        let mut step = Step::default();
        self.begin_drawing(&mut step);
        Ok(step)
    }

    /// Store a player's drawing; the last missing one moves the game to voting.
    pub fn submit_drawing(
        &mut self,
        player_id: &PlayerId,
        drawing: Drawing,
    ) -> Result<Step, GameError> {
        self.ensure_phase(Phase::Drawing)?;
        self.ensure_player(player_id)?;
        if self.round.prompt_of(player_id).is_none() {
            return Err(GameError::NoPromptAssigned(player_id.to_string()));
        }

        self.round.submit_drawing(player_id.clone(), drawing);
        Ok(self.advance_if_complete())
    }

    /// Store the set of drawings a player votes for (possibly empty, self-votes allowed).
    pub fn submit_votes(
        &mut self,
        voter: &PlayerId,
        owners: impl IntoIterator<Item = PlayerId>,
    ) -> Result<Step, GameError> {
        self.ensure_phase(Phase::Voting)?;
        self.ensure_player(voter)?;

        let owners: HashSet<PlayerId> = owners.into_iter().collect();
        self.round.submit_votes(voter.clone(), owners);
        Ok(self.advance_if_complete())
    }

    /// Store a player's guesses, keyed by drawing owner.
    ///
    /// Guesses about drawings that are not up for guessing are discarded.
    pub fn submit_guesses(
        &mut self,
        guesser: &PlayerId,
        guesses: HashMap<PlayerId, String>,
    ) -> Result<Step, GameError> {
        self.ensure_phase(Phase::Guessing)?;
        self.ensure_player(guesser)?;

        let guesses: HashMap<PlayerId, String> = guesses
            .into_iter()
            .filter(|(owner, _)| self.round.is_winner(owner))
            .collect();
        self.round.submit_guesses(guesser.clone(), guesses);
        Ok(self.advance_if_complete())
    }

    /// Timer callback: advance `phase` if it is still the current one.
    ///
    /// Returns `None` for a stale timer, one whose phase already ended through
    /// the quorum path (or any other transition since it was armed).
    pub fn expire(&mut self, phase: Phase, epoch: u64) -> Option<Step> {
        if self.phase != phase || self.epoch != epoch {
            tracing::debug!(
                %phase,
                epoch,
                current_phase = %self.phase,
                current_epoch = self.epoch,
                "ignoring stale phase timer"
            );
            return None;
        }
        tracing::info!(%phase, "phase timed out");
        let mut step = Step::default();
        self.advance(&mut step);
        Some(step)
    }

    /// Every player currently in the roster has submitted for this phase.
    pub fn quorum_reached(&self) -> bool {
        if self.roster.is_empty() {
            return false;
        }
        let submitted = match self.phase {
            Phase::Drawing => self.round.drawings().len(),
            Phase::Voting => self.round.votes().len(),
            Phase::Guessing => self.round.guesses().len(),
            Phase::Waiting | Phase::Results => return false,
        };
        submitted == self.roster.len()
    }

    fn ensure_phase(&self, expected: Phase) -> Result<(), GameError> {
        if self.phase != expected {
            return Err(GameError::PhaseMismatch {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn ensure_player(&self, player_id: &PlayerId) -> Result<(), GameError> {
        if !self.roster.contains(player_id) {
            return Err(GameError::UnknownPlayer(player_id.to_string()));
        }
        Ok(())
    }

    fn advance_if_complete(&mut self) -> Step {
        let mut step = Step::default();
        if self.quorum_reached() {
            self.advance(&mut step);
        }
        step
    }

    fn advance(&mut self, step: &mut Step) {
        match self.phase {
            Phase::Waiting => {}
            Phase::Drawing => self.begin_voting(step),
            Phase::Voting => self.begin_guessing(step),
            Phase::Guessing => self.begin_results(step),
            Phase::Results => self.begin_waiting(step),
        }
    }

    fn enter(&mut self, phase: Phase, step: &mut Step) {
        tracing::info!(from = %self.phase, to = %phase, "phase transition");
        self.phase = phase;
        self.epoch += 1;
        step.phase_change = Some(PhaseChange {
            phase,
            epoch: self.epoch,
            timeout: self.config.timeout(phase),
        });
    }

    fn seconds(&self, phase: Phase) -> u64 {
        self.config.timeout(phase).map_or(0, |d| d.as_secs())
    }

    fn begin_drawing(&mut self, step: &mut Step) {
        self.round.clear();
        self.enter(Phase::Drawing, step);
        let seconds = self.seconds(Phase::Drawing);

        for player in self.roster.players() {
            let prompt = self.prompts.draw(&mut self.rng);
            self.round.assign(player.id.clone(), prompt.clone());
            step.send_to(
                player.id.clone(),
                GameEvent::PhaseStarted(PhaseStarted::Drawing { prompt, seconds }),
            );
        }
    }

    fn begin_voting(&mut self, step: &mut Step) {
        self.enter(Phase::Voting, step);

        let candidates = self
            .round
            .assignments()
            .iter()
            .filter_map(|(owner, prompt)| {
                self.round
                    .drawings()
                    .get(owner)
                    .map(|drawing| VoteCandidate {
                        owner: owner.clone(),
                        prompt: prompt.clone(),
                        drawing: drawing.clone(),
                    })
            })
            .collect();
        step.broadcast(GameEvent::PhaseStarted(PhaseStarted::Voting {
            candidates,
            seconds: self.seconds(Phase::Voting),
        }));
    }

    fn begin_guessing(&mut self, step: &mut Step) {
        let winners = scoring::select_winners(
            self.round.assignments(),
            self.round.drawings(),
            self.round.votes(),
        );
        self.round.set_winners(winners);
        self.enter(Phase::Guessing, step);

        let candidates = self
            .round
            .winners()
            .iter()
            .filter_map(|winner| {
                self.round
                    .drawings()
                    .get(&winner.owner)
                    .map(|drawing| GuessCandidate {
                        owner: winner.owner.clone(),
                        drawing: drawing.clone(),
                    })
            })
            .collect();
        step.broadcast(GameEvent::PhaseStarted(PhaseStarted::Guessing {
            candidates,
            seconds: self.seconds(Phase::Guessing),
        }));
    }

    fn begin_results(&mut self, step: &mut Step) {
        let awards = scoring::score_round(
            self.round.assignments(),
            self.round.winners(),
            self.round.guesses(),
        );
        for (player_id, points) in &awards {
            self.scores.award(player_id, *points);
        }
        self.enter(Phase::Results, step);

        step.broadcast(GameEvent::PhaseStarted(PhaseStarted::Results {
            scores: self.score_lines(),
            roster: self.roster_snapshot(),
            reveals: self.round.winners().to_vec(),
            seconds: self.seconds(Phase::Results),
        }));
    }

    fn begin_waiting(&mut self, step: &mut Step) {
        self.round.clear();
        self.enter(Phase::Waiting, step);
        step.broadcast(GameEvent::PhaseStarted(PhaseStarted::Waiting));
    }
}
