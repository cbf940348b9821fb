//! UseCase: ラウンド中の提出（絵・投票・回答）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SubmitRoundUseCase::execute() メソッド
//! - 各フェーズの提出がセッションに届き、定足数で次のフェーズに進むこと
//!
//! ### なぜこのテストが必要か
//! - 2 人プレイの 1 ラウンドを最後まで通し、得点が仕様どおりになることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：作成 → 参加 → 開始 → 描画 → 投票 → 回答 → 結果
//! - 異常系：フェーズ違いの提出、参加していないプレイヤーの提出

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::domain::{Drawing, PlayerId, SessionCode, SessionRepository};

use super::error::ActionError;

/// One player's input for the current phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Drawing(Drawing),
    /// Owners of the drawings voted for
    Votes(HashSet<PlayerId>),
    /// Drawing owner -> guessed prompt
    Guesses(HashMap<PlayerId, String>),
}

impl Submission {
    fn kind(&self) -> &'static str {
        match self {
            Submission::Drawing(_) => "drawing",
            Submission::Votes(_) => "votes",
            Submission::Guesses(_) => "guesses",
        }
    }
}

/// 提出のユースケース
pub struct SubmitRoundUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl SubmitRoundUseCase {
    /// 新しい SubmitRoundUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// 提出を実行
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 提出を受け付けた（定足数に達した場合はフェーズも進んでいる）
    /// * `Err(ActionError)` - セッションが存在しない、またはゲームが拒否した
    pub async fn execute(
        &self,
        code: &SessionCode,
        player_id: &PlayerId,
        submission: Submission,
    ) -> Result<(), ActionError> {
        let session = self.repository.find_session(code).await?;
        let kind = submission.kind();

        let result = match submission {
            Submission::Drawing(drawing) => session.submit_drawing(player_id, drawing).await,
            Submission::Votes(owners) => session.submit_votes(player_id, owners).await,
            Submission::Guesses(guesses) => session.submit_guesses(player_id, guesses).await,
        };
        result.map_err(|err| ActionError::from_session(code.as_str(), err))?;

        tracing::debug!("Accepted {} from '{}' in session '{}'", kind, player_id, code);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            GameConfig, GameError, GameEvent, Phase, PhaseStarted, Player, PlayerName,
            PromptBank, TeamName,
        },
        infrastructure::repository::InMemorySessionRepository,
        usecase::StartGameUseCase,
    };
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn id(value: &str) -> PlayerId {
        PlayerId::new(value.to_string()).unwrap()
    }

    /// Two players, every prompt is "X"
    async fn started_session() -> (
        Arc<InMemorySessionRepository>,
        SessionCode,
        UnboundedReceiver<GameEvent>,
    ) {
        let repository = Arc::new(InMemorySessionRepository::new(
            Arc::new(PromptBank::new(["X"]).unwrap()),
            GameConfig::default(),
        ));
        let session = repository.create_session().await.unwrap();
        let code = session.code().clone();

        let (tx_a, rx_a) = mpsc::unbounded_channel();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        for (name, team, tx) in [("alice", "A", tx_a), ("bob", "B", tx_b)] {
            let player = Player::new(
                id(name),
                PlayerName::new(name.to_string()).unwrap(),
                TeamName::new(team.to_string()).unwrap(),
            );
            session.join(player, tx).await.unwrap();
        }
        StartGameUseCase::new(repository.clone())
            .execute(&code, &id("alice"))
            .await
            .unwrap();
        (repository, code, rx_a)
    }

    fn last_phase(rx: &mut UnboundedReceiver<GameEvent>) -> Option<PhaseStarted> {
        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            if let GameEvent::PhaseStarted(started) = event {
                last = Some(started);
            }
        }
        last
    }

    #[tokio::test]
    async fn test_two_player_round_end_to_end() {
        // テスト項目: 2 人で 1 ラウンドを通すと、正解 +5 と勝者 +10 が加算される
        // given (前提条件):
        let (repository, code, mut rx_alice) = started_session().await;
        let usecase = SubmitRoundUseCase::new(repository.clone());

        // when (操作): 両者が絵を提出
        for p in ["alice", "bob"] {
            let drawing = Drawing::new(format!("{p}-strokes")).unwrap();
            usecase
                .execute(&code, &id(p), Submission::Drawing(drawing))
                .await
                .unwrap();
        }
        assert_eq!(last_phase(&mut rx_alice).map(|p| p.phase()), Some(Phase::Voting));

        // お互いに投票（1 票ずつで同票）
        usecase
            .execute(&code, &id("alice"), Submission::Votes(HashSet::from([id("bob")])))
            .await
            .unwrap();
        usecase
            .execute(&code, &id("bob"), Submission::Votes(HashSet::from([id("alice")])))
            .await
            .unwrap();

        // 同票なので割り当て順で先の alice の絵だけが回答対象
        let owners = match last_phase(&mut rx_alice) {
            Some(PhaseStarted::Guessing { candidates, .. }) => candidates
                .into_iter()
                .map(|c| c.owner)
                .collect::<Vec<_>>(),
            other => panic!("expected guessing, got {other:?}"),
        };
        assert_eq!(owners, vec![id("alice")]);

        // 両者とも正解
        for p in ["alice", "bob"] {
            let guesses = HashMap::from([(id("alice"), "X".to_string())]);
            usecase
                .execute(&code, &id(p), Submission::Guesses(guesses))
                .await
                .unwrap();
        }

        // then (期待する結果):
        let session = repository.find_session(&code).await.unwrap();
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, Phase::Results);
        let score_of = |who: &str| {
            snapshot
                .scores
                .iter()
                .find(|line| line.player == id(who))
                .map(|line| line.score)
        };
        assert_eq!(score_of("alice"), Some(15));
        assert_eq!(score_of("bob"), Some(5));
        assert!(matches!(
            last_phase(&mut rx_alice),
            Some(PhaseStarted::Results { .. })
        ));
    }

    #[tokio::test]
    async fn test_votes_during_drawing_are_rejected() {
        // テスト項目: 描画中の投票はフェーズ不一致として拒否される
        // given (前提条件):
        let (repository, code, _rx) = started_session().await;
        let usecase = SubmitRoundUseCase::new(repository);

        // when (操作):
        let result = usecase
            .execute(&code, &id("alice"), Submission::Votes(HashSet::new()))
            .await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ActionError::Rejected(GameError::PhaseMismatch {
                expected: Phase::Voting,
                actual: Phase::Drawing
            })
        );
    }

    #[tokio::test]
    async fn test_submission_from_unknown_player_is_rejected() {
        // テスト項目: 参加していないプレイヤーの提出は UnknownPlayer
        // given (前提条件):
        let (repository, code, _rx) = started_session().await;
        let usecase = SubmitRoundUseCase::new(repository);

        // when (操作):
        let drawing = Drawing::new("strokes".to_string()).unwrap();
        let result = usecase
            .execute(&code, &id("mallory"), Submission::Drawing(drawing))
            .await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ActionError::Rejected(GameError::UnknownPlayer("mallory".to_string()))
        );
    }
}
