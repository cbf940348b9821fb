//! WebSocket connection handlers.
//!
//! Each connection is one player. The connection owns two outbound streams: direct replies
//! (`session-created`, `joined`, `error`) and the game events its session dispatches.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    domain::{
        Drawing, EventSender, GameEvent, Player, PlayerId, PlayerName, SessionCode, TeamName,
        ValueObjectError,
    },
    infrastructure::dto::websocket::{ClientMessage, ErrorReason, ServerMessage},
    ui::state::AppState,
    usecase::{
        ActionError, CreateSessionUseCase, JoinError, JoinSessionUseCase, LeaveSessionUseCase,
        StartGameUseCase, Submission, SubmitRoundUseCase,
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, StatusCode> {
    let player_id = match PlayerId::new(Uuid::new_v4().to_string()) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to allocate player id: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    tracing::info!("Player '{}' connecting", player_id);

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, player_id)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, player_id: PlayerId) {
    let (mut sender, mut receiver) = socket.split();

    // Direct replies to this connection
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<ServerMessage>();
    // Game events dispatched by the session this connection belongs to
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<GameEvent>();

    let mut connection = Connection {
        state,
        player_id: player_id.clone(),
        events: event_tx,
        replies: reply_tx,
        current: None,
    };

    // Spawn a task to forward replies and game events to this client
    let mut send_task = tokio::spawn(async move {
        loop {
            let outbound = tokio::select! {
                Some(reply) = reply_rx.recv() => reply,
                Some(event) = event_rx.recv() => ServerMessage::from(event),
                else => break,
            };

            let json = match serde_json::to_string(&outbound) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Receive on this task so the session membership is still known when the socket closes
    loop {
        let msg = tokio::select! {
            msg = receiver.next() => msg,
            _ = &mut send_task => break,
        };
        let msg = match msg {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
            None => break,
        };

        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => connection.handle(message).await,
                Err(e) => {
                    tracing::warn!("Malformed message from '{}': {}", player_id, e);
                    connection.reply_error(
                        ErrorReason::InvalidMessage,
                        format!("Malformed message: {e}"),
                    );
                }
            },
            Message::Ping(_) => {
                tracing::debug!("Received ping");
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(_) => {
                tracing::info!("Player '{}' requested close", player_id);
                break;
            }
            _ => {}
        }
    }
    send_task.abort();

    connection.leave_current().await;
    tracing::info!("Player '{}' disconnected", player_id);
}

/// Per-connection state owned by the receive loop
struct Connection {
    state: Arc<AppState>,
    player_id: PlayerId,
    events: EventSender,
    replies: mpsc::UnboundedSender<ServerMessage>,
    /// The session this connection has joined, if any
    current: Option<SessionCode>,
}

impl Connection {
    async fn handle(&mut self, message: ClientMessage) {
        match message {
            ClientMessage::CreateSession => self.create_session().await,
            ClientMessage::JoinSession {
                code,
                player_name,
                team_name,
            } => self.join_session(code, player_name, team_name).await,
            ClientMessage::StartGame => self.start_game().await,
            ClientMessage::SubmitDrawing { drawing } => match Drawing::new(drawing) {
                Ok(drawing) => self.submit(Submission::Drawing(drawing)).await,
                Err(e) => self.reply_invalid(e),
            },
            ClientMessage::SubmitVotes { owners } => {
                match owners
                    .into_iter()
                    .map(PlayerId::new)
                    .collect::<Result<HashSet<_>, _>>()
                {
                    Ok(owners) => self.submit(Submission::Votes(owners)).await,
                    Err(e) => self.reply_invalid(e),
                }
            }
            ClientMessage::SubmitGuesses { guesses } => {
                match guesses
                    .into_iter()
                    .map(|(owner, guess)| PlayerId::new(owner).map(|owner| (owner, guess)))
                    .collect::<Result<HashMap<_, _>, _>>()
                {
                    Ok(guesses) => self.submit(Submission::Guesses(guesses)).await,
                    Err(e) => self.reply_invalid(e),
                }
            }
        }
    }

    async fn create_session(&mut self) {
        let usecase = CreateSessionUseCase::new(self.state.repository.clone());
        match usecase.execute().await {
            Ok(code) => self.reply(ServerMessage::SessionCreated {
                code: code.to_string(),
            }),
            Err(e) => self.reply_error(ErrorReason::Unavailable, e.to_string()),
        }
    }

    async fn join_session(&mut self, code: String, player_name: String, team_name: String) {
        let code = match SessionCode::new(code) {
            Ok(code) => code,
            Err(e) => {
                self.reply_error(ErrorReason::SessionNotFound, e.to_string());
                return;
            }
        };
        let (name, team) = match (PlayerName::new(player_name), TeamName::new(team_name)) {
            (Ok(name), Ok(team)) => (name, team),
            (Err(e), _) | (_, Err(e)) => {
                self.reply_invalid(e);
                return;
            }
        };

        let usecase = JoinSessionUseCase::new(self.state.repository.clone());
        let player = Player::new(self.player_id.clone(), name, team);
        match usecase.execute(&code, player, self.events.clone()).await {
            Ok(_) => {
                self.reply(ServerMessage::Joined {
                    code: code.to_string(),
                    player_id: self.player_id.to_string(),
                });
                // A connection belongs to at most one session; the old one is left
                // only once the new join went through
                if let Some(previous) = self.current.replace(code.clone())
                    && previous != code
                {
                    self.leave(&previous).await;
                }
            }
            Err(JoinError::SessionNotFound(code)) => {
                self.reply_error(
                    ErrorReason::SessionNotFound,
                    format!("Session '{code}' not found"),
                );
            }
        }
    }

    async fn start_game(&mut self) {
        let Some(code) = self.current.clone() else {
            self.reply_not_in_session();
            return;
        };
        let usecase = StartGameUseCase::new(self.state.repository.clone());
        let result = usecase.execute(&code, &self.player_id).await;
        self.report(result);
    }

    async fn submit(&mut self, submission: Submission) {
        let Some(code) = self.current.clone() else {
            self.reply_not_in_session();
            return;
        };
        let usecase = SubmitRoundUseCase::new(self.state.repository.clone());
        let result = usecase.execute(&code, &self.player_id, submission).await;
        self.report(result);
    }

    /// Leave the joined session, destroying it when this was the last player.
    async fn leave_current(&mut self) {
        if let Some(code) = self.current.take() {
            self.leave(&code).await;
        }
    }

    async fn leave(&self, code: &SessionCode) {
        let usecase = LeaveSessionUseCase::new(self.state.repository.clone());
        match usecase.execute(code, &self.player_id).await {
            Ok(true) => tracing::info!("Session '{}' destroyed after last player left", code),
            Ok(false) => {}
            Err(e) => tracing::debug!("Leave from '{}' ignored: {}", code, e),
        }
    }

    fn report(&mut self, result: Result<(), ActionError>) {
        match result {
            Ok(()) => {}
            Err(ActionError::SessionNotFound(code)) => {
                self.current = None;
                self.reply_error(
                    ErrorReason::SessionNotFound,
                    format!("Session '{code}' not found"),
                );
            }
            // Game rule violations are dropped without a reply
            Err(ActionError::Rejected(e)) => {
                tracing::debug!("Dropped action from '{}': {}", self.player_id, e);
            }
        }
    }

    fn reply(&self, message: ServerMessage) {
        if self.replies.send(message).is_err() {
            tracing::warn!("Failed to queue reply for '{}'", self.player_id);
        }
    }

    fn reply_error(&self, reason: ErrorReason, message: String) {
        self.reply(ServerMessage::Error { reason, message });
    }

    fn reply_invalid(&self, err: ValueObjectError) {
        tracing::warn!("Invalid input from '{}': {}", self.player_id, err);
        self.reply_error(ErrorReason::InvalidMessage, err.to_string());
    }

    fn reply_not_in_session(&self) {
        self.reply_error(
            ErrorReason::NotInSession,
            "Join a session first".to_string(),
        );
    }
}
