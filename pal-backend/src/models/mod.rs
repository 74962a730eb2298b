mod credential;
mod event;
mod memory;
mod message;

pub use credential::Credential;
pub use event::{LocalEvent, NewLocalEvent};
pub use memory::Memory;
pub use message::{Message, MessageRole};
