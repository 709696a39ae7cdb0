//! WebSocket upgrade + session loop. Each connection owns one `QuizSession`;
//! client frames and countdown ticks are multiplexed in a single task, so every
//! state change happens on one logical event queue.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use rand::Rng;
use tokio::sync::mpsc;
use tracing::{info, error, instrument, debug, Instrument};
use uuid::Uuid;

use crate::engine::{QuizSession, TickReport};
use crate::filter::CategoryFilter;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;
use crate::timer::TickSource;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "earshot_backend", "WebSocket upgrade requested");
  let session_id = Uuid::new_v4();
  ws.on_upgrade(move |socket| {
    handle_ws(socket, state).instrument(tracing::info_span!("session", %session_id))
  })
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "earshot_backend", "WebSocket connected");
  let (tick_tx, mut tick_rx) = mpsc::unbounded_channel::<u64>();

  let mut session = match state.new_session(tick_tx) {
    Ok(s) => s,
    Err(e) => {
      error!(target: "earshot_backend", error = %e, "Could not start session");
      let _ = send(&mut socket, &ServerWsMessage::Error { message: e.to_string() }).await;
      return;
    }
  };

  if send(&mut socket, &ServerWsMessage::State { state: session.snapshot() }).await.is_err() {
    return;
  }

  loop {
    let reply = tokio::select! {
      frame = socket.recv() => match frame {
        Some(Ok(Message::Text(txt))) => {
          match serde_json::from_str::<ClientWsMessage>(&txt) {
            Ok(incoming) => {
              debug!(target: "earshot_backend", "WS received: {:?}", &incoming);
              Some(handle_client_ws(incoming, &mut session))
            }
            Err(e) => Some(ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }),
          }
        }
        Some(Ok(Message::Ping(payload))) => {
          let _ = socket.send(Message::Pong(payload)).await;
          None
        }
        Some(Ok(Message::Close(_))) | None => break,
        Some(Ok(_)) => None,
        Some(Err(e)) => {
          error!(target: "earshot_backend", error = %e, "WS receive error");
          break;
        }
      },
      Some(generation) = tick_rx.recv() => handle_tick(generation, &mut session),
    };

    if let Some(msg) = reply {
      if send(&mut socket, &msg).await.is_err() {
        break;
      }
    }
  }
  // dropping the session aborts its countdown task
  info!(target: "earshot_backend", score = ?session.score(), "WebSocket disconnected");
}

async fn send(socket: &mut WebSocket, msg: &ServerWsMessage) -> Result<(), axum::Error> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  socket.send(Message::Text(out)).await.map_err(|e| {
    error!(target: "earshot_backend", error = %e, "WS send error");
    e
  })
}

pub fn handle_client_ws<S: TickSource, R: Rng>(msg: ClientWsMessage, session: &mut QuizSession<S, R>) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::State => ServerWsMessage::State { state: session.snapshot() },

    ClientWsMessage::Guess { name } => match session.evaluate_guess(&name) {
      Ok(_) => ServerWsMessage::State { state: session.snapshot() },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::Skip => match session.skip() {
      Ok(_) => ServerWsMessage::State { state: session.snapshot() },
      Err(e) => {
        error!(target: "round", error = %e, "Skip failed to regenerate");
        ServerWsMessage::Error { message: e.to_string() }
      }
    },

    ClientWsMessage::Filter { category } => {
      session.select_filter(CategoryFilter::from_option(category));
      ServerWsMessage::State { state: session.snapshot() }
    }

    ClientWsMessage::PlaySound => ServerWsMessage::Sound { audio: session.answer_audio().to_string() },
  }
}

pub fn handle_tick<S: TickSource, R: Rng>(generation: u64, session: &mut QuizSession<S, R>) -> Option<ServerWsMessage> {
  match session.on_tick(generation) {
    Ok(None) => None,
    Ok(Some(TickReport::Tick { seconds_left })) => Some(ServerWsMessage::Tick { seconds_left }),
    Ok(Some(TickReport::NewRound)) => Some(ServerWsMessage::State { state: session.snapshot() }),
    Err(e) => {
      error!(target: "round", error = %e, "Countdown expiry failed to regenerate");
      Some(ServerWsMessage::Error { message: e.to_string() })
    }
  }
}
