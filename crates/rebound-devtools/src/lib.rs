//! Bridge to a time-travel debugging extension.
//!
//! The extension is an injected capability: pass one explicitly, or
//! [`install`] it once at startup and let [`probe`] find it. Probing only
//! succeeds in development mode.
//!
//! A [`Session`] ties one component instance to the extension. State
//! snapshots go out through its [`Sender`] as `"update"` messages; replay
//! commands (`DISPATCH` with `JUMP_TO_ACTION` or `JUMP_TO_STATE`) come back
//! carrying the JSON text of the state to show.

pub mod error;
pub mod extension;
pub mod memory;
pub mod message;
pub mod session;

pub use error::*;
pub use extension::*;
pub use memory::MemoryExtension;
pub use message::*;
pub use session::*;
