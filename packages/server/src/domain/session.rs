//! A live session: the game plus its timer and member channels behind one lock.
//!
//! All reads and writes of a session's game go through [`Session`]'s mutex.
//! The quorum path and the timer path both take the lock, run the game
//! operation and apply the resulting [`Step`] before releasing it, so "cancel
//! the old timer" and "enter the next phase" are atomic with respect to the
//! timer callback. A timer that already fired and is waiting for the lock is
//! aborted at that await point; if it gets through anyway, [`Game::expire`]
//! rejects it by phase and epoch.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Weak},
    time::Duration,
};

use tokio::{
    sync::{Mutex, MutexGuard, mpsc::UnboundedSender},
    task::JoinHandle,
};

use super::{
    entity::Player,
    error::{GameError, SessionError},
    event::{Audience, GameEvent, RosterSnapshot, ScoreLine},
    game::{Game, PhaseChange, Step},
    phase::Phase,
    value_object::{Drawing, PlayerId, SessionCode, Timestamp},
};

/// Outbound channel to one connected player
pub type EventSender = UnboundedSender<GameEvent>;

/// Pending phase timeout.
///
/// Owns the timer task; dropping the value aborts it.
#[derive(Debug)]
pub struct PhaseTimer {
    phase: Phase,
    handle: Option<JoinHandle<()>>,
}

impl PhaseTimer {
    fn arm(session: Weak<Session>, change: PhaseChange, timeout: Duration) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(session) = session.upgrade() {
                session.expire(change.phase, change.epoch).await;
            }
        });
        Self {
            phase: change.phase,
            handle: Some(handle),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Release the handle without aborting; used from inside the timer task itself.
    fn disarm(mut self) {
        self.handle.take();
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Mutable part of a session, only reachable through the session lock.
#[derive(Debug)]
pub struct SessionState {
    game: Game,
    timer: Option<PhaseTimer>,
    members: HashMap<PlayerId, EventSender>,
    closed: bool,
}

impl SessionState {
    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn timer(&self) -> Option<&PhaseTimer> {
        self.timer.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_empty(&self) -> bool {
        self.game.roster().is_empty()
    }

    /// Mark the session destroyed and cancel its timer.
    pub fn close(&mut self) {
        self.closed = true;
        self.timer = None;
        self.members.clear();
    }

    fn apply(&mut self, step: Step, session: &Arc<Session>) {
        if let Some(change) = step.phase_change {
            // cancel before arming: never two live timers
            self.timer = None;
            self.timer = change
                .timeout
                .map(|timeout| PhaseTimer::arm(Arc::downgrade(session), change, timeout));
        }
        self.dispatch(step);
    }

    fn dispatch(&self, step: Step) {
        for notification in step.notifications {
            match notification.audience {
                Audience::All => {
                    for (player_id, sender) in &self.members {
                        if sender.send(notification.event.clone()).is_err() {
                            tracing::warn!("Failed to send event to player '{}'", player_id);
                        }
                    }
                }
                Audience::Player(player_id) => match self.members.get(&player_id) {
                    Some(sender) => {
                        if sender.send(notification.event).is_err() {
                            tracing::warn!("Failed to send event to player '{}'", player_id);
                        }
                    }
                    None => {
                        tracing::debug!("No channel for player '{}', event dropped", player_id)
                    }
                },
            }
        }
    }
}

/// Read-only copy of a session for status endpoints.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub code: SessionCode,
    pub created_at: Timestamp,
    pub phase: Phase,
    pub roster: RosterSnapshot,
    pub scores: Vec<ScoreLine>,
}

/// One independent play-through, keyed by its code.
#[derive(Debug)]
pub struct Session {
    code: SessionCode,
    created_at: Timestamp,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new(code: SessionCode, created_at: Timestamp, game: Game) -> Arc<Self> {
        Arc::new(Self {
            code,
            created_at,
            state: Mutex::new(SessionState {
                game,
                timer: None,
                members: HashMap::new(),
                closed: false,
            }),
        })
    }

    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Lock the session state directly (registry bookkeeping and tests).
    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            code: self.code.clone(),
            created_at: self.created_at,
            phase: state.game.phase(),
            roster: state.game.roster_snapshot(),
            scores: state.game.score_lines(),
        }
    }

    /// Run one game operation under the lock and apply its outcome.
    ///
    /// # Errors
    ///
    /// `SessionError::Closed` once the registry destroyed the session, otherwise
    /// whatever the game operation returned.
    async fn perform<F>(self: &Arc<Self>, operation: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut SessionState) -> Result<Step, GameError>,
    {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(SessionError::Closed);
        }
        let step = operation(&mut *state)?;
        state.apply(step, self);
        Ok(())
    }

    /// Register a player and their outbound channel.
    pub async fn join(
        self: &Arc<Self>,
        player: Player,
        sender: EventSender,
    ) -> Result<(), SessionError> {
        self.perform(|state| {
            state.members.insert(player.id.clone(), sender);
            Ok(state.game.add_player(player))
        })
        .await
    }

    /// Remove a player. Returns `true` when the session is now empty.
    pub async fn leave(self: &Arc<Self>, player_id: &PlayerId) -> Result<bool, SessionError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(SessionError::Closed);
        }
        state.members.remove(player_id);
        let step = state.game.remove_player(player_id);
        if state.game.roster().is_empty() {
            state.timer = None;
        }
        state.apply(step, self);
        Ok(state.is_empty())
    }

    pub async fn start(self: &Arc<Self>, requested_by: &PlayerId) -> Result<(), SessionError> {
        self.perform(|state| state.game.start(requested_by)).await
    }

    pub async fn submit_drawing(
        self: &Arc<Self>,
        player_id: &PlayerId,
        drawing: Drawing,
    ) -> Result<(), SessionError> {
        self.perform(|state| state.game.submit_drawing(player_id, drawing))
            .await
    }

    pub async fn submit_votes(
        self: &Arc<Self>,
        voter: &PlayerId,
        owners: HashSet<PlayerId>,
    ) -> Result<(), SessionError> {
        self.perform(|state| state.game.submit_votes(voter, owners))
            .await
    }

    pub async fn submit_guesses(
        self: &Arc<Self>,
        guesser: &PlayerId,
        guesses: HashMap<PlayerId, String>,
    ) -> Result<(), SessionError> {
        self.perform(|state| state.game.submit_guesses(guesser, guesses))
            .await
    }

    /// Timer path. Only ever called from the session's own timer task.
    async fn expire(self: &Arc<Self>, phase: Phase, epoch: u64) {
        let mut state = self.state.lock().await;
        if state.closed {
            return;
        }
        let Some(step) = state.game.expire(phase, epoch) else {
            return;
        };
        tracing::info!("Session '{}' advanced by {} timer", self.code, phase);
        // this task is the timer being replaced; let it finish instead of aborting itself
        if let Some(timer) = state.timer.take() {
            timer.disarm();
        }
        state.apply(step, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        event::PhaseStarted,
        game::GameConfig,
        prompt::PromptBank,
        value_object::{PlayerName, TeamName},
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn id(value: &str) -> PlayerId {
        PlayerId::new(value.to_string()).unwrap()
    }

    fn player(value: &str) -> Player {
        Player::new(
            id(value),
            PlayerName::new(value.to_string()).unwrap(),
            TeamName::new(format!("team-{value}")).unwrap(),
        )
    }

    fn config() -> GameConfig {
        GameConfig {
            drawing: Duration::from_secs(10),
            voting: Duration::from_secs(10),
            guessing: Duration::from_secs(10),
            results: Duration::from_secs(5),
            min_players: 2,
        }
    }

    fn new_session() -> Arc<Session> {
        let game = Game::with_rng(
            Arc::new(PromptBank::new(["X"]).unwrap()),
            config(),
            ChaCha8Rng::seed_from_u64(1),
        );
        Session::new(
            SessionCode::new("ABCD".to_string()).unwrap(),
            Timestamp::new(0),
            game,
        )
    }

    async fn join(session: &Arc<Session>, name: &str) -> UnboundedReceiver<GameEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        session.join(player(name), tx).await.unwrap();
        rx
    }

    /// Phases announced on a channel so far
    fn drain_phases(rx: &mut UnboundedReceiver<GameEvent>) -> Vec<Phase> {
        let mut phases = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let GameEvent::PhaseStarted(started) = event {
                phases.push(started.phase());
            }
        }
        phases
    }

    #[tokio::test(start_paused = true)]
    async fn test_drawing_timer_advances_to_voting() {
        // テスト項目: 描画フェーズのタイマー満了で Voting に遷移する
        // given (前提条件):
        let session = new_session();
        let mut alice = join(&session, "alice").await;
        let _bob = join(&session, "bob").await;
        session.start(&id("alice")).await.unwrap();

        // when (操作):
        tokio::time::sleep(Duration::from_secs(11)).await;

        // then (期待する結果):
        assert_eq!(session.lock().await.game().phase(), Phase::Voting);
        assert_eq!(drain_phases(&mut alice), vec![Phase::Drawing, Phase::Voting]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quorum_cancels_timer_no_double_transition() {
        // テスト項目: 定足数で遷移した場合、古いタイマーは取り消され二重遷移しない
        // given (前提条件):
        let session = new_session();
        let mut alice = join(&session, "alice").await;
        let _bob = join(&session, "bob").await;
        session.start(&id("alice")).await.unwrap();

        // when (操作): タイマー満了前に全員提出
        tokio::time::sleep(Duration::from_secs(5)).await;
        for p in ["alice", "bob"] {
            session
                .submit_drawing(&id(p), Drawing::new("d".to_string()).unwrap())
                .await
                .unwrap();
        }
        // 元の描画タイマーの満了時刻を過ぎる（投票タイマーはまだ）
        tokio::time::sleep(Duration::from_secs(7)).await;

        // then (期待する結果): Voting の開始通知は 1 回だけ
        assert_eq!(drain_phases(&mut alice), vec![Phase::Drawing, Phase::Voting]);
        let state = session.lock().await;
        assert_eq!(state.game().phase(), Phase::Voting);
        assert_eq!(state.timer().map(PhaseTimer::phase), Some(Phase::Voting));
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_timeout_cycle_returns_to_waiting() {
        // テスト項目: 誰も応答しなくてもタイマーだけで Waiting まで戻る
        // given (前提条件):
        let session = new_session();
        let mut alice = join(&session, "alice").await;
        let _bob = join(&session, "bob").await;
        session.start(&id("alice")).await.unwrap();

        // when (操作):
        tokio::time::sleep(Duration::from_secs(36)).await;

        // then (期待する結果):
        assert_eq!(
            drain_phases(&mut alice),
            vec![
                Phase::Drawing,
                Phase::Voting,
                Phase::Guessing,
                Phase::Results,
                Phase::Waiting
            ]
        );
        let state = session.lock().await;
        assert_eq!(state.game().phase(), Phase::Waiting);
        assert!(state.timer().is_none());
    }

    #[tokio::test]
    async fn test_drawing_prompt_is_sent_only_to_its_player() {
        // テスト項目: お題は本人のチャンネルにだけ届く
        // given (前提条件):
        let session = new_session();
        let mut alice = join(&session, "alice").await;
        let mut bob = join(&session, "bob").await;
        while alice.try_recv().is_ok() {}
        while bob.try_recv().is_ok() {}

        // when (操作):
        session.start(&id("alice")).await.unwrap();

        // then (期待する結果): 各自ちょうど 1 通
        for rx in [&mut alice, &mut bob] {
            let event = rx.try_recv().unwrap();
            assert!(matches!(
                event,
                GameEvent::PhaseStarted(PhaseStarted::Drawing { .. })
            ));
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn test_leave_reports_empty_and_cancels_timer() {
        // テスト項目: 全員退出でセッションは空になり、タイマーも解除される
        // given (前提条件):
        let session = new_session();
        let _alice = join(&session, "alice").await;
        let _bob = join(&session, "bob").await;
        session.start(&id("alice")).await.unwrap();

        // when (操作):
        let after_alice = session.leave(&id("alice")).await.unwrap();
        let after_bob = session.leave(&id("bob")).await.unwrap();

        // then (期待する結果):
        assert!(!after_alice);
        assert!(after_bob);
        assert!(session.lock().await.timer().is_none());
    }

    #[tokio::test]
    async fn test_closed_session_rejects_operations() {
        // テスト項目: 破棄済みセッションへの操作は Closed エラー
        // given (前提条件):
        let session = new_session();
        session.lock().await.close();

        // when (操作):
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = session.join(player("alice"), tx).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), SessionError::Closed);
    }

    #[tokio::test]
    async fn test_game_errors_surface_through_session() {
        // テスト項目: ゲームのエラーは SessionError::Game として返る
        // given (前提条件):
        let session = new_session();
        let _alice = join(&session, "alice").await;

        // when (操作):
        let result = session.start(&id("alice")).await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            SessionError::Game(GameError::InsufficientPlayers {
                required: 2,
                current: 1
            })
        );
    }
}
