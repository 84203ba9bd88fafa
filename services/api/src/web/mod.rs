pub mod protocol;
pub mod chat_task;
pub mod attachment_task;
pub mod notes_task;
pub mod highlight;
pub mod state;
pub mod ws_handler;
pub mod rest;

// Re-export the main WebSocket handler to make it easily accessible
// to the binary that will build the web server router.
pub use ws_handler::ws_handler;
pub use rest::list_profiles_handler;
