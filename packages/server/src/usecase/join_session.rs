//! UseCase: セッション参加
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinSessionUseCase::execute() メソッド
//! - コードによるセッション検索と、プレイヤー・送信チャンネルの登録
//!
//! ### なぜこのテストが必要か
//! - 作成時に返したコードが、同じセッションへの参加に使えることを保証
//! - 存在しない・破棄済みのセッションへの参加は呼び出し元にだけ通知する
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加後に roster-changed が全員に届く
//! - 異常系：存在しないコード（Repository をモックして検証）
//! - エッジケース：検索後に破棄されたセッション

use std::sync::Arc;

use crate::domain::{EventSender, Player, Session, SessionCode, SessionError, SessionRepository};

use super::error::JoinError;

/// セッション参加のユースケース
pub struct JoinSessionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl JoinSessionUseCase {
    /// 新しい JoinSessionUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// セッション参加を実行
    ///
    /// # Arguments
    ///
    /// * `code` - 参加するセッションのコード
    /// * `player` - 参加するプレイヤー（Domain Model）
    /// * `sender` - イベント送信チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<Session>)` - 参加したセッション
    /// * `Err(JoinError)` - 参加失敗
    pub async fn execute(
        &self,
        code: &SessionCode,
        player: Player,
        sender: EventSender,
    ) -> Result<Arc<Session>, JoinError> {
        let session = self.repository.find_session(code).await?;

        let player_id = player.id.clone();
        session.join(player, sender).await.map_err(|err| match err {
            // 検索と参加の間に破棄された
            SessionError::Closed => JoinError::SessionNotFound(code.to_string()),
            SessionError::Game(game) => {
                tracing::error!("Unexpected game error on join: {}", game);
                JoinError::SessionNotFound(code.to_string())
            }
        })?;

        tracing::info!("Player '{}' joined session '{}'", player_id, code);
        Ok(session)
    }
}
