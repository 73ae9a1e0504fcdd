//! Identifier types.
//!
//! Every [`Agent`](crate::agent::Agent) carries a [`SessionId`] that tags its log
//! events so interleaved sessions can be told apart.

mod session_id;

pub use session_id::{InvalidSessionId, SessionId};
