//! Database model modules - extends Database with domain-specific methods
//!
//! Each module adds `impl Database` blocks with methods for a specific table group.

mod credentials; // google_tokens (singleton)
mod events;      // events
mod memories;    // memories
mod messages;    // messages
