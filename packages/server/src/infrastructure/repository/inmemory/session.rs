//! InMemory Session Repository 実装
//!
//! ドメイン層が定義する SessionRepository trait の具体的な実装。
//! HashMap をインメモリのセッションレジストリとして使用します。
//!
//! ロック順序は常に「レジストリ → セッション」。セッションのロックを保持したまま
//! レジストリのロックを取ることはありません。
//!
//! 作成後に誰も参加しなかったセッションは、猶予時間の経過後に破棄されます。

use std::{
    collections::HashMap,
    sync::{Arc, Weak},
    time::Duration,
};

use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sketchbluff_shared::time::get_jst_timestamp;
use tokio::sync::Mutex;

use crate::domain::{
    CreateSessionError, Game, GameConfig, PromptBank, RepositoryError, Session, SessionCode,
    SessionCodeFactory, SessionRepository, Timestamp,
};

/// Default upper bound on live sessions
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Default time an unjoined session may stay empty
pub const DEFAULT_EMPTY_SESSION_GRACE: Duration = Duration::from_secs(120);

/// Code draws per creation before giving up
const MAX_CODE_ATTEMPTS: usize = 64;

type SessionMap = Mutex<HashMap<SessionCode, Arc<Session>>>;

/// Registry limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    pub max_sessions: usize,
    /// Empty sessions older than this are destroyed
    pub empty_session_grace: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            empty_session_grace: DEFAULT_EMPTY_SESSION_GRACE,
        }
    }
}

/// インメモリ Session Repository 実装
pub struct InMemorySessionRepository {
    /// 生存中のセッション（破棄タイマーからは Weak で参照）
    sessions: Arc<SessionMap>,
    /// セッションコード生成用の乱数
    rng: Mutex<ChaCha8Rng>,
    prompts: Arc<PromptBank>,
    config: GameConfig,
    limits: RegistryConfig,
}

impl InMemorySessionRepository {
    /// 新しい InMemorySessionRepository を作成
    pub fn new(prompts: Arc<PromptBank>, config: GameConfig) -> Self {
        Self::with_rng(prompts, config, ChaCha8Rng::from_entropy())
    }

    /// 乱数を指定して作成（テスト用）
    pub fn with_rng(prompts: Arc<PromptBank>, config: GameConfig, rng: ChaCha8Rng) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            rng: Mutex::new(rng),
            prompts,
            config,
            limits: RegistryConfig::default(),
        }
    }

    /// セッション数の上限と空セッションの猶予時間を指定
    pub fn with_limits(mut self, limits: RegistryConfig) -> Self {
        self.limits = limits;
        self
    }

    /// 猶予時間後、まだ空なら破棄するタスクを起動
    fn arm_reaper(&self, session: &Arc<Session>) {
        let sessions = Arc::downgrade(&self.sessions);
        let target = Arc::downgrade(session);
        let grace = self.limits.empty_session_grace;

        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            reap_if_empty(sessions, target).await;
        });
    }
}

/// Destroy `target` if it is still registered and nobody has joined it.
async fn reap_if_empty(sessions: Weak<SessionMap>, target: Weak<Session>) {
    let (Some(sessions), Some(target)) = (sessions.upgrade(), target.upgrade()) else {
        return;
    };
    let code = target.code().clone();
    if remove_if_empty_in(&sessions, &code, Some(&target)).await {
        tracing::info!("Session '{}' reaped: nobody joined", code);
    }
}

/// `expected` restricts removal to that exact session, not a later one reusing the code.
async fn remove_if_empty_in(
    sessions: &SessionMap,
    code: &SessionCode,
    expected: Option<&Arc<Session>>,
) -> bool {
    let mut sessions = sessions.lock().await;
    let Some(session) = sessions.get(code).cloned() else {
        return false;
    };
    if expected.is_some_and(|expected| !Arc::ptr_eq(expected, &session)) {
        return false;
    }

    let mut state = session.lock().await;
    if !state.is_empty() {
        return false;
    }
    state.close();
    sessions.remove(code);

    tracing::info!("Session '{}' destroyed ({} live)", code, sessions.len());
    true
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create_session(&self) -> Result<Arc<Session>, CreateSessionError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.len() >= self.limits.max_sessions {
            return Err(CreateSessionError::LimitReached(self.limits.max_sessions));
        }
        let mut rng = self.rng.lock().await;

        // 生存中のセッションと衝突しないコードが出るまで引き直す
        let code = (0..MAX_CODE_ATTEMPTS)
            .map(|_| SessionCodeFactory::generate(&mut *rng))
            .find(|candidate| !sessions.contains_key(candidate))
            .ok_or(CreateSessionError::CodesExhausted(MAX_CODE_ATTEMPTS))?;

        let game_rng = ChaCha8Rng::from_rng(&mut *rng).unwrap_or_else(|_| ChaCha8Rng::from_entropy());
        let game = Game::with_rng(self.prompts.clone(), self.config, game_rng);
        let session = Session::new(code.clone(), Timestamp::new(get_jst_timestamp()), game);
        sessions.insert(code.clone(), session.clone());
        self.arm_reaper(&session);

        tracing::info!("Session '{}' created ({} live)", code, sessions.len());
        Ok(session)
    }

    async fn find_session(&self, code: &SessionCode) -> Result<Arc<Session>, RepositoryError> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(code)
            .cloned()
            .ok_or_else(|| RepositoryError::SessionNotFound(code.to_string()))
    }

    async fn remove_if_empty(&self, code: &SessionCode) -> bool {
        remove_if_empty_in(&self.sessions, code, None).await
    }

    async fn list_sessions(&self) -> Vec<Arc<Session>> {
        let sessions = self.sessions.lock().await;
        let mut list: Vec<Arc<Session>> = sessions.values().cloned().collect();
        list.sort_by(|a, b| a.code().cmp(b.code()));
        list
    }

    async fn count_sessions(&self) -> usize {
        let sessions = self.sessions.lock().await;
        sessions.len()
    }
}
