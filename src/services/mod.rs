// tabtree services
// Services sit outside the engine: settings persistence and session export/import.

pub mod session_store;
pub mod settings_engine;
