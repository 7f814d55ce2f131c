mod message;
mod presentation;
mod slide;

pub use message::{ChatMessage, MessageRole};
pub use presentation::{Presentation, PresentationUpdate};
pub use slide::{Slide, SlideLayout};
