//! Shell command allowlist.
//!
//! When auto-approve is enabled and an allowlist is configured, only
//! commands whose base command (first whitespace-delimited token,
//! case-insensitive) is a member may run without a prompt.

/// Result of checking a command line against the allowlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandCheck {
    /// The base command is a member
    Allowed,
    /// The base command is not a member
    Denied { command: String, reason: String },
}

/// A set of permitted shell base commands.
#[derive(Debug, Clone, Default)]
pub struct CommandAllowlist {
    entries: Vec<String>,
}

impl CommandAllowlist {
    /// Build an allowlist. Entries are normalized to lowercase.
    pub fn new(entries: Vec<String>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    /// True when no allowlist is configured at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check a full command line by its first token.
    pub fn check(&self, command_line: &str) -> CommandCheck {
        let base = command_line
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();

        if self.entries.iter().any(|e| *e == base) {
            CommandCheck::Allowed
        } else {
            CommandCheck::Denied {
                command: base.clone(),
                reason: format!(
                    "'{}' is not in the command allowlist ({} entries configured)",
                    base,
                    self.entries.len()
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_base_command_allowed() {
        let list = CommandAllowlist::new(vec!["git".into(), "cargo".into()]);
        assert_eq!(list.check("git status"), CommandCheck::Allowed);
        assert_eq!(list.check("cargo build --release"), CommandCheck::Allowed);
    }

    #[test]
    fn non_member_denied() {
        let list = CommandAllowlist::new(vec!["git".into()]);
        match list.check("rm -rf /") {
            CommandCheck::Denied { command, .. } => assert_eq!(command, "rm"),
            CommandCheck::Allowed => panic!("rm should not be allowed"),
        }
    }

    #[test]
    fn membership_is_case_insensitive() {
        let list = CommandAllowlist::new(vec!["Git".into()]);
        assert_eq!(list.check("GIT status"), CommandCheck::Allowed);
        assert_eq!(list.check("git log"), CommandCheck::Allowed);
    }

    #[test]
    fn empty_command_line_denied() {
        let list = CommandAllowlist::new(vec!["git".into()]);
        assert!(matches!(list.check(""), CommandCheck::Denied { .. }));
        assert!(matches!(list.check("   "), CommandCheck::Denied { .. }));
    }

    #[test]
    fn empty_allowlist_reports_empty() {
        assert!(CommandAllowlist::default().is_empty());
        assert!(CommandAllowlist::new(vec![]).is_empty());
        assert!(!CommandAllowlist::new(vec!["ls".into()]).is_empty());
    }
}
