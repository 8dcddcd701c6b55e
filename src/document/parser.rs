// src/document/parser.rs

//! Single-pass parser from document text to task records.
//!
//! Each record remembers the byte range of every recognised field value so
//! that later mutations can rewrite exactly those bytes and nothing else.

use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::document::labels::{is_empty_marker, Field, LabelStyle};
use crate::document::model::{Task, TaskMap};
use crate::types::{Priority, TaskId, TaskStatus, TASK_ID_RE};

/// `### TASK-001: Name`
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^###[ \t]+(TASK-\d+)[ \t]*[:：]?[ \t]*(.*?)[ \t]*$").expect("header regex is valid")
});

/// `- **Label**: value` (also `**Label:**`)
static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*[-*+][ \t]+\*\*([^*\n]+?)[ \t]*[:：]?\*\*[ \t]*[:：]?[ \t]*(.*?)[ \t]*$")
        .expect("field regex is valid")
});

/// Location of one field value inside the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpan {
    pub field: Field,
    pub style: LabelStyle,
    /// Byte range of the value (label, separator and trailing whitespace excluded).
    pub value: Range<usize>,
}

/// A task block as it appears in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: TaskId,
    pub name: String,
    /// From the start of the header line up to the next header or document end.
    pub span: Range<usize>,
    /// First occurrence of each recognised field, in document order.
    pub fields: Vec<FieldSpan>,
}

impl TaskRecord {
    pub fn field(&self, field: Field) -> Option<&FieldSpan> {
        self.fields.iter().find(|f| f.field == field)
    }

    /// Raw value text of a field, exactly as written.
    pub fn raw<'t>(&self, text: &'t str, field: Field) -> Option<&'t str> {
        self.field(field).map(|f| &text[f.value.clone()])
    }
}

/// Non-fatal problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseIssue {
    UnknownStatus { task: TaskId, value: String },
    InvalidPriority { task: TaskId, value: String },
    DuplicateTask { task: TaskId },
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseIssue::UnknownStatus { task, value } => {
                write!(f, "{task}: unknown status '{value}', treated as pending")
            }
            ParseIssue::InvalidPriority { task, value } => {
                write!(f, "{task}: invalid priority '{value}', treated as P2")
            }
            ParseIssue::DuplicateTask { task } => {
                write!(f, "{task}: duplicate task id, later block ignored")
            }
        }
    }
}

/// Output of one parse pass.
#[derive(Debug, Clone, Default)]
pub(crate) struct Parsed {
    pub records: Vec<TaskRecord>,
    pub tasks: TaskMap,
    pub issues: Vec<ParseIssue>,
}

fn is_section_boundary(line: &str) -> bool {
    line.starts_with("###") || line.starts_with("## ")
}

pub(crate) fn parse_document(text: &str) -> Parsed {
    let mut records: Vec<TaskRecord> = Vec::new();
    let mut current: Option<TaskRecord> = None;
    let mut offset = 0;

    for raw_line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += raw_line.len();
        let line = raw_line.trim_end_matches(['\n', '\r']);

        if let Some(caps) = HEADER_RE.captures(line) {
            if let Some(mut done) = current.take() {
                done.span.end = line_start;
                records.push(done);
            }
            let id = caps[1].to_string();
            let name = match caps[2].trim() {
                "" => id.clone(),
                n => n.to_string(),
            };
            current = Some(TaskRecord {
                id,
                name,
                span: line_start..text.len(),
                fields: Vec::new(),
            });
            continue;
        }

        if is_section_boundary(line) {
            if let Some(mut done) = current.take() {
                done.span.end = line_start;
                records.push(done);
            }
            continue;
        }

        let Some(record) = current.as_mut() else {
            continue;
        };
        let Some(caps) = FIELD_RE.captures(line) else {
            continue;
        };
        let Some((field, style)) = Field::from_label(&caps[1]) else {
            continue;
        };
        if record.field(field).is_some() {
            debug!(task = %record.id, field = %field, "repeated field label; keeping first");
            continue;
        }
        if let Some(value) = caps.get(2) {
            record.fields.push(FieldSpan {
                field,
                style,
                value: line_start + value.start()..line_start + value.end(),
            });
        }
    }

    if let Some(done) = current.take() {
        records.push(done);
    }

    let mut tasks = TaskMap::new();
    let mut issues = Vec::new();
    for record in &records {
        let task = task_from_record(text, record, &mut issues);
        if !tasks.insert(task) {
            warn!(task = %record.id, "duplicate task id in document");
            issues.push(ParseIssue::DuplicateTask {
                task: record.id.clone(),
            });
        }
    }

    Parsed {
        records,
        tasks,
        issues,
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !is_empty_marker(v))
        .map(|v| v.trim().to_string())
}

/// Every `TASK-<n>` occurrence, deduplicated, or nothing for an empty marker.
pub(crate) fn parse_dependencies(value: &str) -> Vec<TaskId> {
    if is_empty_marker(value) {
        return Vec::new();
    }
    let mut deps: Vec<TaskId> = Vec::new();
    for m in TASK_ID_RE.find_iter(value) {
        if !deps.iter().any(|d| d == m.as_str()) {
            deps.push(m.as_str().to_string());
        }
    }
    deps
}

fn parse_related_files(value: &str) -> Vec<String> {
    if is_empty_marker(value) {
        return Vec::new();
    }
    value
        .split([',', '，'])
        .map(str::trim)
        .filter(|f| !f.is_empty() && *f != "-")
        .map(str::to_string)
        .collect()
}

fn task_from_record(text: &str, record: &TaskRecord, issues: &mut Vec<ParseIssue>) -> Task {
    let raw = |field| record.raw(text, field);
    let mut task = Task::new(record.id.clone(), record.name.clone());

    if let Some(value) = raw(Field::Status).filter(|v| !is_empty_marker(v)) {
        let word = value.split_whitespace().next().unwrap_or_default();
        match word.parse::<TaskStatus>() {
            Ok(status) => task.status = status,
            Err(_) => issues.push(ParseIssue::UnknownStatus {
                task: record.id.clone(),
                value: value.to_string(),
            }),
        }
    }

    if let Some(value) = raw(Field::Priority).filter(|v| !is_empty_marker(v)) {
        let word = value.split_whitespace().next().unwrap_or_default();
        match word.parse::<Priority>() {
            Ok(priority) => task.priority = priority,
            Err(_) => issues.push(ParseIssue::InvalidPriority {
                task: record.id.clone(),
                value: value.to_string(),
            }),
        }
    }

    task.dependencies = raw(Field::Dependencies)
        .map(parse_dependencies)
        .unwrap_or_default();
    task.related_files = raw(Field::RelatedFiles)
        .map(parse_related_files)
        .unwrap_or_default();
    task.assignee = optional(raw(Field::Assignee));
    task.claimed_at = optional(raw(Field::ClaimedAt));
    task.module = optional(raw(Field::Module));
    task.description = optional(raw(Field::Description));
    task.acceptance_criteria = optional(raw(Field::AcceptanceCriteria));
    task
}
