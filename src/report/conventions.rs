use std::sync::LazyLock;

use regex::Regex;

/// Marker that identifies the column header line of a report.
pub const HEADER_MARKER: &str = "Monthly Qty";
/// Label of the first header column.
pub const COLUMN_LABEL: &str = "Name";
/// Phrase printed instead of a quantity for usage-based components.
pub const USAGE_MARKER: &str = "Monthly cost depends";
/// Resource name prefix used when none is configured.
pub const DEFAULT_ENTITY_PREFIX: &str = "azurerm_";
/// Units that follow the monthly quantity of a cost component.
pub const UNIT_TOKENS: &[&str] = &[
    "hours",
    "GB",
    "emails",
    "events",
    "notifications",
    "messages",
    "calls",
    "10k operations",
    "months",
    "vCPU",
];

static PATTERNS: LazyLock<ReportPatterns> = LazyLock::new(ReportPatterns::new);

struct ReportPatterns {
    // " ├─ content", " │  └─ content", "    ├─ content"
    tree_node: Regex,
    tree_start: Regex,
    quantity_with_unit: Regex,
}

impl ReportPatterns {
    fn new() -> Self {
        let units = UNIT_TOKENS
            .iter()
            .map(|unit| regex::escape(unit))
            .collect::<Vec<_>>()
            .join("|");

        Self {
            tree_node: Regex::new(r"^( +(?:│\s+)?)(├─|└─)\s+(.+)$")
                .expect("static regex must compile"),
            tree_start: Regex::new(r"^ *[├└│]").expect("static regex must compile"),
            quantity_with_unit: Regex::new(&format!(r"\d[\d,]*\s+(?:{units})"))
                .expect("unit regex must compile"),
        }
    }
}

/// Whether a tree node is a priced line or a container of priced lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    CostComponent,
    SubResource,
}

/// A branch line of the tree with its nesting depth already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub depth: usize,
    pub name: String,
    pub kind: NodeKind,
}

/// Classification of a single report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineToken {
    Blank,
    Header,
    Entity(String),
    Node(TreeNode),
    Unrecognized,
}

/// Format knobs of the tree report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConventions {
    /// Substrings that mark a line as the start of a new resource.
    pub entity_prefixes: Vec<String>,
}

impl Default for ReportConventions {
    fn default() -> Self {
        Self {
            entity_prefixes: vec![DEFAULT_ENTITY_PREFIX.to_string()],
        }
    }
}

impl ReportConventions {
    /// Builds conventions from explicit prefixes, falling back to the default
    /// prefix when the list is empty.
    pub fn with_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entity_prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();
        if entity_prefixes.is_empty() {
            return Self::default();
        }
        Self { entity_prefixes }
    }

    /// Tokenizes one line of the report.
    pub fn classify_line(&self, line: &str) -> LineToken {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineToken::Blank;
        }
        if line.contains(HEADER_MARKER) || trimmed.starts_with(COLUMN_LABEL) {
            return LineToken::Header;
        }

        let patterns = &*PATTERNS;
        if self.is_entity_line(line) && !patterns.tree_start.is_match(line) {
            let name = trimmed.split_whitespace().next().unwrap_or(trimmed);
            return LineToken::Entity(name.to_string());
        }

        let Some(captures) = patterns.tree_node.captures(line) else {
            return LineToken::Unrecognized;
        };
        let prefix_width = captures[1].chars().count();
        let content = captures[3].trim();

        LineToken::Node(TreeNode {
            depth: depth_for_prefix(prefix_width),
            name: component_name(content),
            kind: node_kind(content),
        })
    }

    fn is_entity_line(&self, line: &str) -> bool {
        self.entity_prefixes
            .iter()
            .any(|prefix| line.contains(prefix.as_str()))
    }
}

/// Maps the width of the text preceding a branch glyph to a nesting depth.
///
/// Depth 0 branches sit after a single column; every further level adds three
/// columns. Only the first nested level is distinguished.
pub fn depth_for_prefix(width: usize) -> usize {
    if width >= 4 {
        1
    } else if width > 1 {
        (width - 1) / 3
    } else {
        0
    }
}

/// Extracts the display name from the content part of a branch line.
pub fn component_name(content: &str) -> String {
    let name = if let Some((before, _)) = content.split_once(USAGE_MARKER) {
        before
    } else if let Some((before, _)) = content.split_once("  ") {
        before
    } else {
        content
    };
    name.trim().to_string()
}

/// Leaves carry a quantity with a unit, or the usage-based marker.
pub fn node_kind(content: &str) -> NodeKind {
    if content.contains(USAGE_MARKER) || PATTERNS.quantity_with_unit.is_match(content) {
        NodeKind::CostComponent
    } else {
        NodeKind::SubResource
    }
}
