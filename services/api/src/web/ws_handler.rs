//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! Each connection owns one session; the loop applies state transitions under
//! the session lock and spawns a worker per accepted model call so the socket
//! stays responsive while a completion is pending.

use crate::{
    config,
    web::{
        attachment_task::{self, AskJob, AskOutcome},
        chat_task::{self, ChatAccepted, ChatJob},
        notes_task::{self, NotesJob, NotesOutcome},
        protocol::{ClientMessage, ServerMessage},
        state::{AppState, SessionState},
    },
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use workbench_core::profiles;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    info!("New WebSocket connection established.");

    // The sender is wrapped in an Arc<Mutex<>> to allow for shared mutable access across tasks.
    let (sender, mut receiver) = socket.split();
    let ws_sender = Arc::new(Mutex::new(sender));

    let session_state_lock = Arc::new(Mutex::new(SessionState::new(
        app_state.config.default_model.clone(),
        profiles::default_instruction(),
    )));

    // --- 1. Greeting ---
    // The hello frame tells the client whether it must prompt for a
    // credential before any model call can succeed.
    let hello = ServerMessage::Hello {
        credential_required: !app_state.gateway.has_credential().await,
        model: app_state.config.default_model.clone(),
    };
    send_server_message(&ws_sender, &hello).await;

    // --- 2. Main Message Loop ---
    loop {
        if let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    handle_text_message(
                        text.to_string(),
                        &app_state,
                        &session_state_lock,
                        &ws_sender,
                    )
                    .await;
                }
                Message::Binary(data) => {
                    // An upload: the bytes for the most recently staged name.
                    let receipt = {
                        let mut session = session_state_lock.lock().await;
                        attachment_task::ingest(&mut session, &data)
                    };
                    match receipt {
                        Some(receipt) => {
                            info!(
                                "Attachment '{}' ingested ({} chars).",
                                receipt.name, receipt.chars
                            );
                            let accepted = ServerMessage::AttachmentAccepted {
                                name: receipt.name,
                                chars: receipt.chars,
                            };
                            send_server_message(&ws_sender, &accepted).await;
                        }
                        None => {
                            warn!("Binary frame received with no staged attachment; dropped.");
                        }
                    }
                }
                Message::Close(_) => {
                    info!("Client sent close message.");
                    break;
                }
                _ => {}
            }
        } else {
            info!("Client disconnected.");
            break;
        }
    }

    info!("WebSocket connection closed.");
}

/// Helper function to handle the logic for different `ClientMessage` variants.
///
/// Rejected submissions (blank input, a call already pending) are dropped
/// without a reply; the session is left exactly as it was.
async fn handle_text_message(
    text: String,
    app_state: &AppState,
    session_state_lock: &Arc<Mutex<SessionState>>,
    ws_sender: &Arc<Mutex<SplitSink<WebSocket, Message>>>,
) {
    match serde_json::from_str::<ClientMessage>(&text) {
        Ok(client_msg) => match client_msg {
            ClientMessage::ProvideCredential { secret } => {
                let secret = secret.trim();
                if secret.is_empty() {
                    warn!("Blank credential submission ignored.");
                    return;
                }
                app_state.gateway.set_credential(secret).await;
                if let Err(e) =
                    config::store_credential(&app_state.config.credential_path, secret).await
                {
                    warn!("Failed to persist the credential: {}", e);
                }
                info!("Credential provided over the socket.");
                send_server_message(ws_sender, &ServerMessage::CredentialAccepted).await;
            }
            ClientMessage::ChatSubmit { text } => {
                let accepted = {
                    let mut session = session_state_lock.lock().await;
                    chat_task::begin_submit(&mut session, &text)
                };
                if let Some(ChatAccepted { message, job }) = accepted {
                    // Echo the user turn before the completion settles.
                    send_server_message(ws_sender, &ServerMessage::ChatAppended { message }).await;
                    let app_state = app_state.clone();
                    let session_state_lock = session_state_lock.clone();
                    let ws_sender = ws_sender.clone();
                    tokio::spawn(async move {
                        chat_settle(app_state, session_state_lock, ws_sender, job).await;
                    });
                }
            }
            ClientMessage::StageAttachment { name } => {
                info!("Attachment '{}' announced; awaiting its binary frame.", name);
                let mut session = session_state_lock.lock().await;
                attachment_task::stage(&mut session, &name);
            }
            ClientMessage::ClearAttachment => {
                {
                    let mut session = session_state_lock.lock().await;
                    attachment_task::clear(&mut session);
                }
                send_server_message(ws_sender, &ServerMessage::AttachmentCleared).await;
            }
            ClientMessage::AskDocument { question } => {
                let job = {
                    let mut session = session_state_lock.lock().await;
                    attachment_task::begin_ask(&mut session, &question)
                };
                if let Some(job) = job {
                    let app_state = app_state.clone();
                    let session_state_lock = session_state_lock.clone();
                    let ws_sender = ws_sender.clone();
                    tokio::spawn(async move {
                        ask_settle(app_state, session_state_lock, ws_sender, job).await;
                    });
                }
            }
            ClientMessage::UpdateNotes { text } => {
                let mut session = session_state_lock.lock().await;
                notes_task::update_raw(&mut session, &text);
            }
            ClientMessage::TransformNotes => {
                let job = {
                    let mut session = session_state_lock.lock().await;
                    notes_task::begin_transform(&mut session)
                };
                if let Some(job) = job {
                    spawn_notes_worker(app_state, session_state_lock, ws_sender, job);
                }
            }
            ClientMessage::ImproveNotes => {
                let job = {
                    let mut session = session_state_lock.lock().await;
                    notes_task::begin_improve(&mut session)
                };
                if let Some(job) = job {
                    spawn_notes_worker(app_state, session_state_lock, ws_sender, job);
                }
            }
            ClientMessage::SetKeywords { keywords } => {
                let render = {
                    let mut session = session_state_lock.lock().await;
                    notes_task::set_keywords(&mut session, &keywords);
                    notes_task::rerender(&session)
                };
                // Restyle the existing output without another model call.
                if let Some(render) = render {
                    let rendered = ServerMessage::NotesRendered {
                        output: render.output,
                        highlighted: render.highlighted,
                    };
                    send_server_message(ws_sender, &rendered).await;
                }
            }
            ClientMessage::SelectProfile { id } => match profiles::find(&id) {
                Some(profile) => {
                    {
                        let mut session = session_state_lock.lock().await;
                        session.system_instruction = profile.instruction.to_string();
                    }
                    info!("Prompt profile '{}' selected.", profile.id);
                    let selected = ServerMessage::ProfileSelected {
                        id: profile.id.to_string(),
                        instruction: profile.instruction.to_string(),
                    };
                    send_server_message(ws_sender, &selected).await;
                }
                None => {
                    warn!("Unknown prompt profile '{}' requested, which is ignored.", id);
                }
            },
            ClientMessage::SetSystemInstruction { text } => {
                let mut session = session_state_lock.lock().await;
                session.system_instruction = text;
            }
            ClientMessage::SetModel { model } => {
                if model.trim().is_empty() {
                    warn!("Empty model identifier ignored.");
                } else {
                    let mut session = session_state_lock.lock().await;
                    session.model = model;
                }
            }
        },
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            let err_msg = ServerMessage::Error {
                message: "Unrecognized message.".to_string(),
            };
            send_server_message(ws_sender, &err_msg).await;
        }
    }
}

fn spawn_notes_worker(
    app_state: &AppState,
    session_state_lock: &Arc<Mutex<SessionState>>,
    ws_sender: &Arc<Mutex<SplitSink<WebSocket, Message>>>,
    job: NotesJob,
) {
    let app_state = app_state.clone();
    let session_state_lock = session_state_lock.clone();
    let ws_sender = ws_sender.clone();
    tokio::spawn(async move {
        notes_settle(app_state, session_state_lock, ws_sender, job).await;
    });
}

/// Runs an accepted chat job to completion and reports the resulting turn.
async fn chat_settle(
    app_state: AppState,
    session_state_lock: Arc<Mutex<SessionState>>,
    ws_sender: Arc<Mutex<SplitSink<WebSocket, Message>>>,
    job: ChatJob,
) {
    let result = app_state
        .gateway
        .complete_chat(&job.model, &job.history, Some(&job.system_instruction), None)
        .await;

    // A raise can only be the credential gate; remote failures arrive as text.
    let needs_credential = result.is_err();
    let message = {
        let mut session = session_state_lock.lock().await;
        chat_task::settle_submit(&mut session, result)
    };
    send_server_message(&ws_sender, &ServerMessage::ChatAppended { message }).await;
    if needs_credential {
        send_server_message(&ws_sender, &ServerMessage::CredentialRequired).await;
    }
}

/// Runs an accepted document question to completion and reports the exchange.
async fn ask_settle(
    app_state: AppState,
    session_state_lock: Arc<Mutex<SessionState>>,
    ws_sender: Arc<Mutex<SplitSink<WebSocket, Message>>>,
    job: AskJob,
) {
    let result = app_state
        .gateway
        .analyze_document(
            &job.model,
            &job.document.content,
            &job.question,
            Some(&job.system_instruction),
        )
        .await;

    let outcome = {
        let mut session = session_state_lock.lock().await;
        attachment_task::settle_ask(&mut session, &job, result)
    };
    match outcome {
        AskOutcome::Answered(exchange) => {
            send_server_message(&ws_sender, &ServerMessage::ExchangeAppended { exchange }).await;
        }
        AskOutcome::Stale => {
            info!("Discarding an answer for a replaced attachment.");
        }
        AskOutcome::CredentialRequired => {
            send_server_message(&ws_sender, &ServerMessage::CredentialRequired).await;
        }
    }
}

/// Runs an accepted notes transformation to completion and reports the render.
async fn notes_settle(
    app_state: AppState,
    session_state_lock: Arc<Mutex<SessionState>>,
    ws_sender: Arc<Mutex<SplitSink<WebSocket, Message>>>,
    job: NotesJob,
) {
    let result = app_state
        .gateway
        .transform_notes(&job.model, &job.text, job.task)
        .await;

    let outcome = {
        let mut session = session_state_lock.lock().await;
        notes_task::settle(&mut session, result)
    };
    match outcome {
        NotesOutcome::Rendered(render) => {
            let rendered = ServerMessage::NotesRendered {
                output: render.output,
                highlighted: render.highlighted,
            };
            send_server_message(&ws_sender, &rendered).await;
        }
        NotesOutcome::CredentialRequired => {
            send_server_message(&ws_sender, &ServerMessage::CredentialRequired).await;
        }
    }
}

/// Serializes and sends one server message; a dead socket is logged, not
/// raised, because the connection loop notices the disconnect on its own.
async fn send_server_message(
    ws_sender: &Arc<Mutex<SplitSink<WebSocket, Message>>>,
    message: &ServerMessage,
) {
    match serde_json::to_string(message) {
        Ok(json) => {
            if ws_sender
                .lock()
                .await
                .send(Message::Text(json.into()))
                .await
                .is_err()
            {
                warn!("Failed to send message to client.");
            }
        }
        Err(e) => error!("Failed to serialize server message: {}", e),
    }
}
