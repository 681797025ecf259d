//! Session persistence.
//!
//! Saves and loads the full message history as pretty-printed JSON at a
//! caller-chosen path. The orchestrator only exposes get/replace for the
//! history; this store is the collaborator that uses them. Load failures
//! are typed so the entry point can distinguish a missing file from a
//! corrupt one.

use std::path::{Path, PathBuf};

use ember_core::error::SessionError;
use ember_core::message::Message;
use tracing::debug;

/// A file-backed store for one session's message history.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write the message list as-is.
    pub fn save(&self, messages: &[Message]) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            return Err(SessionError::Save {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            });
        }

        let json = serde_json::to_string_pretty(messages).map_err(|e| SessionError::Save {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(&self.path, json).map_err(|e| SessionError::Save {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        debug!(path = %self.path.display(), count = messages.len(), "Session saved");
        Ok(())
    }

    /// Read the message list back.
    pub fn load(&self) -> Result<Vec<Message>, SessionError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| SessionError::Load {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| SessionError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::message::{Role, ToolCall};

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        let messages = vec![
            Message::system("You are a coding assistant."),
            Message::user("list the files"),
            Message::assistant_reply(
                None,
                vec![ToolCall {
                    id: "call_1".into(),
                    name: "list_dir".into(),
                    arguments: "{}".into(),
                }],
            ),
            Message::tool_result("call_1", "list_dir", "a.txt\nb.txt"),
            Message::assistant("There are two files."),
        ];

        store.save(&messages).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, messages);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("sessions").join("one.json"));
        store.save(&[Message::system("s")]).unwrap();
        assert!(store.exists());
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("absent.json"));
        let err = store.load().unwrap_err();
        assert!(matches!(err, SessionError::Load { .. }));
    }

    #[test]
    fn invalid_json_is_a_corrupt_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ definitely not a message list").unwrap();

        let store = SessionStore::new(&path);
        let err = store.load().unwrap_err();
        assert!(matches!(err, SessionError::Corrupt { .. }));
    }

    #[test]
    fn roundtrip_preserves_roles() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("roles.json"));

        let messages = vec![Message::system("s"), Message::user("u")];
        store.save(&messages).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded[0].role, Role::System);
        assert_eq!(loaded[1].role, Role::User);
    }
}
