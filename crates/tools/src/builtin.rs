//! The closed set of built-in tool kinds.
//!
//! Model-facing names (and their aliases) resolve to one variant at
//! lookup time; unresolved names fall through to the plugin registry.

use ember_core::tool::ToolDefinition;
use serde_json::json;

use crate::git::GitAction;

/// A built-in tool kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTool {
    FileWrite,
    FileRead,
    ListDir,
    MakeDir,
    Search,
    Edit,
    Shell,
    Git(GitAction),
}

impl BuiltinTool {
    /// Resolve a model-supplied name, including known aliases.
    pub fn resolve(name: &str) -> Option<Self> {
        match name {
            "file_write" | "write_file" | "create_file" => Some(Self::FileWrite),
            "file_read" | "read_file" => Some(Self::FileRead),
            "list_dir" | "list_directory" | "ls" => Some(Self::ListDir),
            "make_dir" | "create_directory" | "mkdir" => Some(Self::MakeDir),
            "search" | "grep" | "text_search" => Some(Self::Search),
            "edit" | "edit_file" | "replace_in_file" => Some(Self::Edit),
            "shell" | "run_command" | "bash" | "exec" => Some(Self::Shell),
            "git_status" => Some(Self::Git(GitAction::Status)),
            "git_diff" => Some(Self::Git(GitAction::Diff)),
            "git_add" => Some(Self::Git(GitAction::Add)),
            "git_commit" => Some(Self::Git(GitAction::Commit)),
            "git_stash" => Some(Self::Git(GitAction::Stash)),
            _ => None,
        }
    }

    /// The canonical name, as advertised to the model.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FileWrite => "file_write",
            Self::FileRead => "file_read",
            Self::ListDir => "list_dir",
            Self::MakeDir => "make_dir",
            Self::Search => "search",
            Self::Edit => "edit",
            Self::Shell => "shell",
            Self::Git(action) => action.name(),
        }
    }
}

/// Schema entries for every built-in tool, in a stable order.
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "file_read".into(),
            description: "Read the contents of a file at the given path.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "The file path to read" }
                },
                "required": ["path"]
            }),
        },
        ToolDefinition {
            name: "file_write".into(),
            description: "Write content to a file. Creates the file and any missing parent directories; overwrites if it exists.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "The file path to write to" },
                    "content": { "type": "string", "description": "The content to write" }
                },
                "required": ["path", "content"]
            }),
        },
        ToolDefinition {
            name: "list_dir".into(),
            description: "List the entries of a directory. Directories are suffixed with '/'.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "The directory to list (defaults to '.')" }
                }
            }),
        },
        ToolDefinition {
            name: "make_dir".into(),
            description: "Create a directory, including missing parents.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "The directory to create" }
                },
                "required": ["path"]
            }),
        },
        ToolDefinition {
            name: "search".into(),
            description: "Search files under a path with a regular expression, line by line. Hidden entries and build directories are skipped; output is capped at 50 matches.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "The directory to search (defaults to '.')" },
                    "pattern": { "type": "string", "description": "The regular expression to match per line" }
                },
                "required": ["pattern"]
            }),
        },
        ToolDefinition {
            name: "edit".into(),
            description: "Replace every occurrence of an exact text in a file. Fails if the text is not present.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "The file to edit" },
                    "old_text": { "type": "string", "description": "The exact text to replace" },
                    "new_text": { "type": "string", "description": "The replacement text" }
                },
                "required": ["path", "old_text", "new_text"]
            }),
        },
        ToolDefinition {
            name: "shell".into(),
            description: "Execute a shell command and return stdout/stderr. Subject to approval policy.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "command": { "type": "string", "description": "The shell command to execute" }
                },
                "required": ["command"]
            }),
        },
        ToolDefinition {
            name: "git_status".into(),
            description: "Show the git working-tree status.".into(),
            parameters: json!({ "type": "object", "properties": {} }),
        },
        ToolDefinition {
            name: "git_diff".into(),
            description: "Show unstaged changes, optionally limited to one path.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Limit the diff to this path" }
                }
            }),
        },
        ToolDefinition {
            name: "git_add".into(),
            description: "Stage files for commit. Defaults to staging everything.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "paths": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "The paths to stage (defaults to '.')"
                    }
                }
            }),
        },
        ToolDefinition {
            name: "git_commit".into(),
            description: "Create a commit from the staged changes.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string", "description": "The commit message" }
                },
                "required": ["message"]
            }),
        },
        ToolDefinition {
            name: "git_stash".into(),
            description: "Stash the working-tree changes.".into(),
            parameters: json!({ "type": "object", "properties": {} }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_resolve() {
        for def in definitions() {
            let tool = BuiltinTool::resolve(&def.name)
                .unwrap_or_else(|| panic!("{} should resolve", def.name));
            assert_eq!(tool.name(), def.name);
        }
    }

    #[test]
    fn aliases_resolve_to_the_same_kind() {
        assert_eq!(
            BuiltinTool::resolve("write_file"),
            Some(BuiltinTool::FileWrite)
        );
        assert_eq!(BuiltinTool::resolve("bash"), Some(BuiltinTool::Shell));
        assert_eq!(BuiltinTool::resolve("grep"), Some(BuiltinTool::Search));
        assert_eq!(
            BuiltinTool::resolve("git_stash"),
            Some(BuiltinTool::Git(GitAction::Stash))
        );
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        assert_eq!(BuiltinTool::resolve("teleport"), None);
        assert_eq!(BuiltinTool::resolve(""), None);
    }

    #[test]
    fn definitions_have_object_schemas() {
        for def in definitions() {
            assert_eq!(def.parameters["type"], "object", "{}", def.name);
            assert!(!def.description.is_empty());
        }
    }
}
