use crate::tools::{scene_setup, splitter};

/// One input a tool takes.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub help: &'static str,
    /// Config key this input falls back to, if any.
    pub config_key: Option<&'static str>,
}

/// Static description of a registered tool.
#[derive(Debug)]
pub struct ToolEntry {
    /// Display name.
    pub name: &'static str,
    /// Subcommands that run it.
    pub commands: &'static [&'static str],
    pub description: &'static str,
    pub fields: &'static [Field],
}

/// Every tool, in display order.
pub static TOOLS: &[&ToolEntry] = &[&splitter::ENTRY, &scene_setup::ENTRY];

/// Look a tool up by display name (case-insensitive) or subcommand.
pub fn find_tool(name: &str) -> Option<&'static ToolEntry> {
    TOOLS.iter().copied().find(|entry| {
        entry.name.eq_ignore_ascii_case(name) || entry.commands.contains(&name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order() {
        let names: Vec<_> = TOOLS.iter().map(|t| t.name).collect();
        assert_eq!(names, ["MP4 Splitter", "Scene Setup"]);
    }

    #[test]
    fn test_find_tool() {
        assert_eq!(find_tool("split").map(|t| t.name), Some("MP4 Splitter"));
        assert_eq!(find_tool("scene setup").map(|t| t.name), Some("Scene Setup"));
        assert_eq!(find_tool("import-animatic").map(|t| t.name), Some("Scene Setup"));
        assert!(find_tool("render").is_none());
    }

    #[test]
    fn test_every_tool_has_fields() {
        for tool in TOOLS {
            assert!(!tool.fields.is_empty(), "{} has no fields", tool.name);
            assert!(!tool.commands.is_empty(), "{} has no commands", tool.name);
        }
    }
}
