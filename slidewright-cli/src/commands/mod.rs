pub mod export;
pub mod generate;
pub mod presentations;
pub mod serve;

pub use export::handle_export_command;
pub use generate::{handle_generate_command, GenerateArgs};
pub use presentations::{handle_presentations_command, PresentationsCommand};
pub use serve::handle_serve_command;
