pub mod agent;
pub mod dispatch;
pub mod format;
pub mod shell;

pub use agent::Agent;
pub use dispatch::{FollowUp, Reply};
pub use shell::Shell;
