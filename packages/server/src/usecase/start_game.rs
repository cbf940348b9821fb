//! UseCase: ゲーム開始

use std::sync::Arc;

use crate::domain::{PlayerId, SessionCode, SessionRepository};

use super::error::ActionError;

/// ゲーム開始のユースケース
pub struct StartGameUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl StartGameUseCase {
    /// 新しい StartGameUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// ゲーム開始を実行
    ///
    /// 2 人未満での開始要求は `ActionError::Rejected(InsufficientPlayers)` になり、
    /// フェーズは変わらない。
    pub async fn execute(
        &self,
        code: &SessionCode,
        requested_by: &PlayerId,
    ) -> Result<(), ActionError> {
        let session = self.repository.find_session(code).await?;
        session
            .start(requested_by)
            .await
            .map_err(|err| ActionError::from_session(code.as_str(), err))?;

        tracing::info!("Session '{}' started by '{}'", code, requested_by);
        Ok(())
    }
}
