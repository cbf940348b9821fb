//! UseCase: セッション作成

use std::sync::Arc;

use crate::domain::{CreateSessionError, SessionCode, SessionRepository};

/// セッション作成のユースケース
pub struct CreateSessionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl CreateSessionUseCase {
    /// 新しい CreateSessionUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// 空のセッションを作成し、そのコードを返す
    ///
    /// # Returns
    ///
    /// * `Ok(SessionCode)` - 作成したセッションのコード
    /// * `Err(CreateSessionError)` - レジストリが満杯、または空きコードが見つからない
    pub async fn execute(&self) -> Result<SessionCode, CreateSessionError> {
        let session = self.repository.create_session().await.inspect_err(|e| {
            tracing::warn!("Failed to create session: {}", e);
        })?;
        Ok(session.code().clone())
    }
}
