//! UseCase: セッション退出（切断）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveSessionUseCase::execute() メソッド
//! - プレイヤー削除後、空になったセッションが破棄されること
//!
//! ### どのような状況を想定しているか
//! - 正常系：他のプレイヤーが残る退出（セッションは残る）
//! - エッジケース：最後のプレイヤーの退出（セッションは破棄される）
//! - 異常系：存在しないセッションからの退出

use std::sync::Arc;

use crate::domain::{PlayerId, SessionCode, SessionRepository};

use super::error::ActionError;

/// セッション退出のユースケース
pub struct LeaveSessionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl LeaveSessionUseCase {
    /// 新しい LeaveSessionUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// 退出を実行
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 最後のプレイヤーだったためセッションを破棄した
    /// * `Ok(false)` - セッションは残っている
    /// * `Err(ActionError)` - セッションが存在しない
    pub async fn execute(
        &self,
        code: &SessionCode,
        player_id: &PlayerId,
    ) -> Result<bool, ActionError> {
        let session = self.repository.find_session(code).await?;
        session
            .leave(player_id)
            .await
            .map_err(|err| ActionError::from_session(code.as_str(), err))?;
        tracing::info!("Player '{}' left session '{}'", player_id, code);

        // セッションのロックは解放済み（ロック順序: レジストリ → セッション）
        Ok(self.repository.remove_if_empty(code).await)
    }
}
