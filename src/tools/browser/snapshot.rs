//! Snapshot parsing for agent-browser output
//!
//! Parses the accessibility tree JSON from agent-browser into a compact
//! element listing the model can pick refs from.

use serde::{Deserialize, Serialize};

/// Parsed snapshot from agent-browser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Whether the operation succeeded
    #[serde(default)]
    pub success: bool,
    /// Snapshot data
    #[serde(default)]
    pub data: Option<SnapshotData>,
}

/// Snapshot data content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotData {
    /// Raw snapshot string (accessibility tree)
    #[serde(default)]
    pub snapshot: String,
    /// Element refs mapped to their info
    #[serde(default)]
    pub refs: std::collections::HashMap<String, Element>,
}

/// An element in the snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// ARIA role
    #[serde(default)]
    pub role: String,
    /// Accessible name
    #[serde(default)]
    pub name: String,
    /// Element value (for inputs)
    #[serde(default)]
    pub value: Option<String>,
    /// Whether element is focused
    #[serde(default)]
    pub focused: bool,
    /// Additional properties
    #[serde(flatten)]
    pub properties: std::collections::HashMap<String, serde_json::Value>,
}

impl Snapshot {
    /// Count the number of elements with refs
    pub fn count_elements(&self) -> usize {
        self.data.as_ref().map(|d| d.refs.len()).unwrap_or(0)
    }

    /// Get an element by ref
    pub fn get_element(&self, ref_id: &str) -> Option<&Element> {
        // Remove @ prefix if present
        let clean_ref = ref_id.strip_prefix('@').unwrap_or(ref_id);
        self.data.as_ref().and_then(|d| d.refs.get(clean_ref))
    }

    /// Get all interactive elements
    pub fn interactive_elements(&self) -> Vec<(&String, &Element)> {
        self.data
            .as_ref()
            .map(|d| {
                d.refs
                    .iter()
                    .filter(|(_, el)| el.is_interactive())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Format the snapshot as an element listing for the model
    pub fn format_for_display(&self) -> String {
        if let Some(data) = &self.data {
            let mut output = String::new();
            output.push_str("Page Elements:\n");

            for (ref_id, element) in &data.refs {
                let value_str = element
                    .value
                    .as_ref()
                    .map(|v| format!(" = \"{}\"", v))
                    .unwrap_or_default();

                output.push_str(&format!(
                    "  @{}: {} \"{}\"{}",
                    ref_id, element.role, element.name, value_str
                ));

                if element.focused {
                    output.push_str(" [focused]");
                }

                output.push('\n');
            }

            output
        } else {
            "No snapshot data available".to_string()
        }
    }
}

impl Element {
    /// Check if this is an interactive element
    pub fn is_interactive(&self) -> bool {
        matches!(
            self.role.as_str(),
            "button"
                | "link"
                | "textbox"
                | "checkbox"
                | "radio"
                | "combobox"
                | "menuitem"
                | "tab"
                | "switch"
                | "searchbox"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(ref_id: &str, role: &str, name: &str) -> Snapshot {
        let mut refs = std::collections::HashMap::new();
        refs.insert(
            ref_id.to_string(),
            Element {
                role: role.to_string(),
                name: name.to_string(),
                value: None,
                focused: false,
                properties: Default::default(),
            },
        );

        Snapshot {
            success: true,
            data: Some(SnapshotData {
                snapshot: String::new(),
                refs,
            }),
        }
    }

    #[test]
    fn test_snapshot_get_element() {
        let snapshot = snapshot_with("e1", "button", "Click me");
        assert!(snapshot.get_element("e1").is_some());
        assert!(snapshot.get_element("@e1").is_some());
        assert!(snapshot.get_element("e2").is_none());
        assert_eq!(snapshot.count_elements(), 1);
    }

    #[test]
    fn test_interactive_elements() {
        let snapshot = snapshot_with("e3", "searchbox", "Search");
        assert_eq!(snapshot.interactive_elements().len(), 1);

        let inert = snapshot_with("e4", "paragraph", "Some text");
        assert!(inert.interactive_elements().is_empty());
    }

    #[test]
    fn test_format_for_display() {
        let snapshot = snapshot_with("e1", "link", "Sign in");
        let listing = snapshot.format_for_display();
        assert!(listing.contains("@e1: link \"Sign in\""));

        let empty = Snapshot {
            success: false,
            data: None,
        };
        assert_eq!(empty.format_for_display(), "No snapshot data available");
    }
}
