//! Civic Portal
//!
//! Headless host for the accessibility layer: a sample feedback page, a
//! line-oriented interaction script and the session that replays it.

pub mod page;
pub mod script;
pub mod session;

pub use page::feedback_page;
pub use script::{parse, Command, ScriptError};
pub use session::{Flow, Session};
