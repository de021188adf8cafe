pub mod api;
pub mod content;
pub mod forms;
pub mod lang;
pub mod richtext;
pub mod server;
pub mod session;
pub mod settings;
pub mod telemetry;
pub mod transfer;
