//! UseCase 層
//!
//! クライアント操作ごとのユースケースを実装するレイヤー。
//! UI 層から呼び出され、Repository 経由で Domain 層のセッションを操作します。

pub mod create_session;
pub mod error;
pub mod join_session;
pub mod leave_session;
pub mod start_game;
pub mod submit_round;

pub use create_session::CreateSessionUseCase;
pub use error::{ActionError, JoinError};
pub use join_session::JoinSessionUseCase;
pub use leave_session::LeaveSessionUseCase;
pub use start_game::StartGameUseCase;
pub use submit_round::{Submission, SubmitRoundUseCase};
