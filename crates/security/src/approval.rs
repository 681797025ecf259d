//! Approval providers.
//!
//! Whether a side-effecting command may run is decided by an injected
//! capability rather than a hardwired prompt, so automated tests never
//! touch a real terminal. The interactive implementation blocks the
//! calling flow until answered; that is a deliberate synchronous
//! boundary.

use std::io::Write;

/// Decides whether a command may run.
pub trait ApprovalProvider: Send + Sync {
    /// Return true to approve running `command`.
    fn confirm(&self, command: &str) -> bool;
}

/// Prompts the user on the terminal. Only "y" approves.
pub struct InteractivePrompt;

impl ApprovalProvider for InteractivePrompt {
    fn confirm(&self, command: &str) -> bool {
        print!("Run `{command}`? [y/N] ");
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        answer.trim().eq_ignore_ascii_case("y")
    }
}

/// A fixed yes/no policy, for tests and non-interactive runs.
pub struct StaticPolicy(pub bool);

impl ApprovalProvider for StaticPolicy {
    fn confirm(&self, _command: &str) -> bool {
        self.0
    }
}
