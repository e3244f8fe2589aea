//! Golden report parsing.
//!
//! A golden report is the human-readable cost breakdown printed as a tree:
//!
//! ```text
//!  azurerm_example
//!  ├─ Instance hours                100  hours   $10
//!  └─ Storage
//!     ├─ Data storage                50  GB      $5
//!     └─ Operations            1,000  10k operations  $1
//! ```
//!
//! Each line is tokenized by [`ReportConventions::classify_line`] and fed to a
//! small state machine that assembles one [`ResourceSchema`] per resource.
//! Lines that do not fit are skipped and recorded as [`ParseIssue`]s.

pub mod conventions;

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, instrument, trace};

pub use conventions::{LineToken, NodeKind, ReportConventions, TreeNode};

use crate::error::Result;
use crate::model::{ResourceSchema, SchemaSet, SubResourceSchema};

/// A line that was skipped while assembling the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseIssue {
    /// The line matched none of the known line shapes.
    UnrecognizedLine { line: usize, text: String },
    /// A nested cost component appeared without an enclosing sub-resource.
    NoOpenGroup { line: usize, name: String },
    /// A sub-resource nested below another sub-resource.
    NestedGroup { line: usize, name: String },
    /// A branch line appeared before any resource line.
    NoEntity { line: usize, name: String },
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseIssue::UnrecognizedLine { line, text } => {
                write!(f, "line {line}: unrecognized line '{text}'")
            }
            ParseIssue::NoOpenGroup { line, name } => {
                write!(f, "line {line}: '{name}' has no enclosing sub-resource")
            }
            ParseIssue::NestedGroup { line, name } => {
                write!(f, "line {line}: nested sub-resource '{name}' ignored")
            }
            ParseIssue::NoEntity { line, name } => {
                write!(f, "line {line}: '{name}' appears before any resource")
            }
        }
    }
}

/// Counters and skipped lines collected during a parse run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseDiagnostics {
    pub entities: usize,
    pub nodes: usize,
    pub issues: Vec<ParseIssue>,
}

impl ParseDiagnostics {
    fn record(&mut self, issue: ParseIssue) {
        debug!(%issue, "skipped report line");
        self.issues.push(issue);
    }
}

/// Result of parsing one golden report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReport {
    pub schemas: SchemaSet,
    pub diagnostics: ParseDiagnostics,
}

/// Parses a report using the default conventions.
pub fn parse_report(text: &str) -> ParsedReport {
    parse_report_with(text, &ReportConventions::default())
}

/// Parses a report using the given conventions.
pub fn parse_report_with(text: &str, conventions: &ReportConventions) -> ParsedReport {
    let mut parser = ReportParser::default();
    for (index, line) in text.lines().enumerate() {
        parser.feed(index + 1, line, conventions.classify_line(line));
    }
    parser.finish()
}

/// Reads and parses a golden file. A missing file yields an empty report.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn parse_report_file(path: &Path, conventions: &ReportConventions) -> Result<ParsedReport> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            debug!("golden file does not exist");
            return Ok(ParsedReport::default());
        }
        Err(error) => return Err(error.into()),
    };
    let report = parse_report_with(&text, conventions);
    debug!(
        resources = report.schemas.len(),
        issues = report.diagnostics.issues.len(),
        "parsed golden report"
    );
    Ok(report)
}

struct OpenGroup {
    depth: usize,
    name: String,
    index: usize,
}

#[derive(Default)]
struct ReportParser {
    schemas: SchemaSet,
    current: Option<String>,
    open_groups: Vec<OpenGroup>,
    diagnostics: ParseDiagnostics,
}

impl ReportParser {
    fn feed(&mut self, line_number: usize, line: &str, token: LineToken) {
        match token {
            LineToken::Blank | LineToken::Header => {}
            LineToken::Entity(name) => self.open_entity(name),
            LineToken::Node(node) => self.place_node(line_number, node),
            LineToken::Unrecognized => {
                if self.current.is_some() {
                    self.diagnostics.record(ParseIssue::UnrecognizedLine {
                        line: line_number,
                        text: line.trim().to_string(),
                    });
                }
            }
        }
    }

    fn open_entity(&mut self, name: String) {
        self.diagnostics.entities += 1;
        self.schemas.insert(name.clone(), ResourceSchema::default());
        self.current = Some(name);
        self.open_groups.clear();
    }

    fn place_node(&mut self, line_number: usize, node: TreeNode) {
        let Some(schema) = self
            .current
            .as_ref()
            .and_then(|name| self.schemas.get_mut(name))
        else {
            self.diagnostics.record(ParseIssue::NoEntity {
                line: line_number,
                name: node.name,
            });
            return;
        };
        self.diagnostics.nodes += 1;

        self.open_groups.retain(|group| group.depth < node.depth);

        match (node.depth, node.kind) {
            (0, NodeKind::CostComponent) => schema.cost_components.push(node.name),
            (0, NodeKind::SubResource) => {
                let index = schema.sub_resources.len();
                schema
                    .sub_resources
                    .push(SubResourceSchema::new(node.name.clone()));
                self.open_groups.push(OpenGroup {
                    depth: node.depth,
                    name: node.name,
                    index,
                });
            }
            (_, NodeKind::CostComponent) => match self.open_groups.last() {
                Some(group) => {
                    trace!(group = %group.name, component = %node.name, "nested component");
                    schema.sub_resources[group.index]
                        .cost_components
                        .push(node.name);
                }
                None => self.diagnostics.record(ParseIssue::NoOpenGroup {
                    line: line_number,
                    name: node.name,
                }),
            },
            (_, NodeKind::SubResource) => self.diagnostics.record(ParseIssue::NestedGroup {
                line: line_number,
                name: node.name,
            }),
        }
    }

    fn finish(self) -> ParsedReport {
        ParsedReport {
            schemas: self.schemas,
            diagnostics: self.diagnostics,
        }
    }
}
