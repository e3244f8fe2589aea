use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::error::{Result, ToolError};
use crate::model::{Resource, SchemaSet};
use crate::reconcile::reconcile_detailed;
use crate::report::{ReportConventions, parse_report_file};

/// Extension of the golden reports looked up by [`fix_directory`].
pub const GOLDEN_EXTENSION: &str = "golden";
/// Extension of the resource documents paired with golden reports.
pub const JSON_EXTENSION: &str = "json";

/// Whether fixes are persisted or only reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FixMode {
    #[default]
    Write,
    Check,
}

/// A resource document after reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFix {
    pub document: Value,
    /// Number of resources whose layout changed.
    pub resources_fixed: usize,
}

/// What happened to a single JSON file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixOutcome {
    NoSchema,
    Unchanged,
    Fixed { resources: usize },
}

impl FixOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, FixOutcome::Fixed { .. })
    }
}

impl fmt::Display for FixOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixOutcome::NoSchema => {
                write!(f, "Could not parse golden file or no structures found")
            }
            FixOutcome::Unchanged => write!(f, "No changes needed"),
            FixOutcome::Fixed { resources } => write!(f, "Fixed {resources} resources"),
        }
    }
}

/// Result of processing one golden/JSON pair during a directory run.
#[derive(Debug)]
pub struct FileReport {
    /// Path of the JSON file relative to the walked root.
    pub path: PathBuf,
    pub result: Result<FixOutcome>,
}

/// Per-file results of a directory run, in path order.
#[derive(Debug, Default)]
pub struct FixSummary {
    pub golden_files: usize,
    pub reports: Vec<FileReport>,
}

impl FixSummary {
    pub fn fixed(&self) -> usize {
        self.count(|result| matches!(result, Ok(outcome) if outcome.changed()))
    }

    pub fn skipped(&self) -> usize {
        self.count(|result| matches!(result, Ok(outcome) if !outcome.changed()))
    }

    pub fn errors(&self) -> usize {
        self.count(|result| result.is_err())
    }

    fn count(&self, predicate: impl Fn(&Result<FixOutcome>) -> bool) -> usize {
        self.reports
            .iter()
            .filter(|report| predicate(&report.result))
            .count()
    }
}

/// Reshapes every resource of `document` that has a golden layout.
///
/// Resources without a layout are passed through untouched, as are resources
/// whose reshaped form is structurally equal to the original.
pub fn fix_document(document: &Value, schemas: &SchemaSet) -> Result<DocumentFix> {
    let resources = document
        .get("resources")
        .and_then(Value::as_array)
        .ok_or(ToolError::MissingResources)?;

    let mut resources_fixed = 0;
    let mut fixed = Vec::with_capacity(resources.len());

    for original in resources {
        let name = original.get("name").and_then(Value::as_str).unwrap_or("");
        let Some(schema) = schemas.get(name).filter(|schema| !schema.is_empty()) else {
            fixed.push(original.clone());
            continue;
        };

        let resource: Resource =
            serde_json::from_value(original.clone()).map_err(|source| {
                ToolError::InvalidResource {
                    name: name.to_string(),
                    source,
                }
            })?;
        let reconciled = reconcile_detailed(&resource, Some(schema));
        let candidate = serde_json::to_value(&reconciled.resource)?;

        if candidate == *original {
            fixed.push(original.clone());
            continue;
        }

        debug!(
            resource = name,
            missing = ?reconciled.missing,
            discarded = reconciled.discarded.len(),
            "resource reshaped"
        );
        resources_fixed += 1;
        fixed.push(candidate);
    }

    let mut document = document.clone();
    if let Some(object) = document.as_object_mut() {
        object.insert("resources".to_string(), Value::Array(fixed));
    }

    Ok(DocumentFix {
        document,
        resources_fixed,
    })
}

/// Reshapes the resources of `json_path` according to `golden_path`.
#[instrument(
    level = "info",
    skip_all,
    fields(json = %json_path.display(), golden = %golden_path.display(), ?mode)
)]
pub fn fix_json_file(
    json_path: &Path,
    golden_path: &Path,
    conventions: &ReportConventions,
    mode: FixMode,
) -> Result<FixOutcome> {
    let report = parse_report_file(golden_path, conventions)?;
    if report.schemas.is_empty() {
        return Ok(FixOutcome::NoSchema);
    }

    let source = fs::read_to_string(json_path)?;
    let document: Value = serde_json::from_str(&source)?;
    let fix = fix_document(&document, &report.schemas)?;

    if fix.resources_fixed == 0 {
        return Ok(FixOutcome::Unchanged);
    }

    info!(resources = fix.resources_fixed, "resources reshaped");
    if mode == FixMode::Write {
        let json_string = serde_json::to_string_pretty(&fix.document)?;
        fs::write(json_path, json_string)?;
    }

    Ok(FixOutcome::Fixed {
        resources: fix.resources_fixed,
    })
}

/// Walks `root` for golden reports and fixes each sibling JSON document.
///
/// A failure on one file is recorded in its [`FileReport`] and does not stop
/// the run.
#[instrument(level = "info", skip_all, fields(root = %root.display(), ?mode))]
pub fn fix_directory(
    root: &Path,
    conventions: &ReportConventions,
    mode: FixMode,
) -> Result<FixSummary> {
    let mut golden_paths = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(%error, "skipping unreadable directory entry");
                continue;
            }
        };
        let is_golden = entry.file_type().is_file()
            && entry.path().extension().and_then(|ext| ext.to_str()) == Some(GOLDEN_EXTENSION);
        if is_golden {
            golden_paths.push(entry.into_path());
        }
    }
    golden_paths.sort();
    info!(golden_files = golden_paths.len(), "found golden files");

    let mut summary = FixSummary {
        golden_files: golden_paths.len(),
        reports: Vec::new(),
    };

    for golden_path in golden_paths {
        let json_path = golden_path.with_extension(JSON_EXTENSION);
        if !json_path.exists() {
            continue;
        }

        let result = fix_json_file(&json_path, &golden_path, conventions, mode);
        if let Err(error) = &result {
            warn!(path = %json_path.display(), %error, "failed to fix resource document");
        }

        let path = json_path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| json_path.clone());
        summary.reports.push(FileReport { path, result });
    }

    Ok(summary)
}
