//! In-memory representation of the merged curriculum document.
//!
//! The document produced by the curriculum extraction tooling maps grade
//! bands to subjects to subject trees. Subject trees do not share a shape:
//! most nest `THEMES` / `SUB THEMES` / `TOPICS`, but some add or skip levels
//! and the key spelling differs between grade bands. The tree is therefore
//! modelled as a tagged variant ([`CurriculumNode`]) built once from JSON,
//! with topic records recognised and projected at build time.
//!
//! Key order from the source file is preserved (serde_json is built with
//! `preserve_order`): traversal order decides which topic wins when several
//! match a query.

use std::ops::ControlFlow;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::CurriculumError;

/// Keys that carry a topic name, in priority order.
const TOPIC_NAME_KEYS: &[&str] = &["TOPIC", "TOPIC NAME", "topic_name", "topic"];

const OBJECTIVES_PATHS: &[&[&str]] = &[
    &["PERFORMANCE OBJECTIVES"],
    &["performance_objectives"],
    &["objectives"],
];

const CONTENT_PATHS: &[&[&str]] = &[&["CONTENT"], &["content"]];

const TEACHER_ACTIVITIES_PATHS: &[&[&str]] = &[
    &["TEACHER ACTIVITIES"],
    &["teacher_activities"],
    &["activities", "teacher"],
];

/// Student-facing activities: the current key first, then the legacy
/// "pupils" spellings used by the primary-school documents.
const STUDENT_ACTIVITIES_PATHS: &[&[&str]] = &[
    &["STUDENTS ACTIVITIES"],
    &["students_activities"],
    &["PUPILS ACTIVITIES"],
    &["pupils_activities"],
    &["activities", "pupils"],
];

const RESOURCES_PATHS: &[&[&str]] = &[
    &["TEACHING AND LEARNING RESOURCES"],
    &["teaching_and_learning_resources"],
    &["resources"],
];

/// Projection of a single curriculum topic.
///
/// Missing fields are empty lists; `topic_name` is never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub topic_name: String,
    pub objectives: Vec<String>,
    pub content: Vec<String>,
    pub teacher_activities: Vec<String>,
    pub student_activities: Vec<String>,
    pub resources: Vec<String>,
}

impl TopicRecord {
    /// Creates a record with only a topic name.
    pub fn named(topic_name: impl Into<String>) -> Self {
        Self {
            topic_name: topic_name.into(),
            ..Self::default()
        }
    }

    /// Projects a JSON object into a topic record.
    ///
    /// Returns `None` when the object carries no non-empty topic name.
    pub fn from_object(object: &Map<String, Value>) -> Option<Self> {
        let topic_name = TOPIC_NAME_KEYS.iter().find_map(|key| {
            object
                .get(*key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
        })?;

        Some(Self {
            topic_name: topic_name.to_string(),
            objectives: first_text_list(object, OBJECTIVES_PATHS),
            content: first_text_list(object, CONTENT_PATHS),
            teacher_activities: first_text_list(object, TEACHER_ACTIVITIES_PATHS),
            student_activities: first_text_list(object, STUDENT_ACTIVITIES_PATHS),
            resources: first_text_list(object, RESOURCES_PATHS),
        })
    }

    /// Returns true if `query` matches this topic's name.
    ///
    /// Both sides are trimmed and lowercased; the match succeeds when either
    /// contains the other, so "fractions" finds "Fractions and Decimals" and
    /// "Introduction to Fractions" finds "Fractions". A blank query matches
    /// nothing.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }
        let name = self.topic_name.trim().to_lowercase();
        name.contains(&query) || query.contains(&name)
    }
}

/// Resolves the first present path and coerces it into a list of strings.
fn first_text_list(object: &Map<String, Value>, paths: &[&[&str]]) -> Vec<String> {
    paths
        .iter()
        .find_map(|path| lookup_path(object, path))
        .map(text_list)
        .unwrap_or_default()
}

fn lookup_path<'a>(object: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = object.get(*first)?;
    for segment in rest {
        current = current.as_object()?.get(*segment)?;
    }
    Some(current)
}

/// A lone string becomes a one-item list; non-textual items are skipped.
fn text_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => non_blank(s).into_iter().collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => non_blank(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A node of a subject tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CurriculumNode {
    /// An object carrying a topic name. Nested objects and lists inside it
    /// are kept as children and searched as well.
    Topic {
        record: TopicRecord,
        children: Vec<CurriculumNode>,
    },
    /// An object without a topic name, with its entries in source order.
    Container(Vec<(String, CurriculumNode)>),
    /// A JSON array.
    List(Vec<CurriculumNode>),
    /// Any scalar value.
    Leaf,
}

impl CurriculumNode {
    /// Builds a node tree from a JSON value.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(object) => match TopicRecord::from_object(object) {
                Some(record) => CurriculumNode::Topic {
                    record,
                    children: object
                        .values()
                        .filter(|v| v.is_object() || v.is_array())
                        .map(CurriculumNode::from_value)
                        .collect(),
                },
                None => CurriculumNode::Container(
                    object
                        .iter()
                        .map(|(key, v)| (key.clone(), CurriculumNode::from_value(v)))
                        .collect(),
                ),
            },
            Value::Array(items) => {
                CurriculumNode::List(items.iter().map(CurriculumNode::from_value).collect())
            }
            _ => CurriculumNode::Leaf,
        }
    }

    /// Visits every topic record depth-first in source order, stopping as
    /// soon as the visitor breaks.
    ///
    /// A topic node is visited before its own children; container entries
    /// and list elements are visited in their stored order.
    pub fn visit_topics<'a, B>(
        &'a self,
        visitor: &mut impl FnMut(&'a TopicRecord) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        match self {
            CurriculumNode::Topic { record, children } => {
                visitor(record)?;
                for child in children {
                    child.visit_topics(visitor)?;
                }
            }
            CurriculumNode::Container(entries) => {
                for (_, child) in entries {
                    child.visit_topics(visitor)?;
                }
            }
            CurriculumNode::List(items) => {
                for item in items {
                    item.visit_topics(visitor)?;
                }
            }
            CurriculumNode::Leaf => {}
        }
        ControlFlow::Continue(())
    }

    /// Returns the first topic, in traversal order, whose name matches `query`.
    pub fn find_topic(&self, query: &str) -> Option<&TopicRecord> {
        match self.visit_topics(&mut |record| {
            if record.matches_query(query) {
                ControlFlow::Break(record)
            } else {
                ControlFlow::Continue(())
            }
        }) {
            ControlFlow::Break(record) => Some(record),
            ControlFlow::Continue(()) => None,
        }
    }

    /// Returns every topic name in traversal order.
    pub fn topic_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let _ = self.visit_topics(&mut |record| {
            names.push(record.topic_name.as_str());
            ControlFlow::<()>::Continue(())
        });
        names
    }
}

/// One subject of a grade band.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectSection {
    pub key: String,
    pub tree: CurriculumNode,
}

/// One grade band with its subjects in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeSection {
    pub name: String,
    pub subjects: Vec<SubjectSection>,
}

impl GradeSection {
    /// Returns the subject stored under exactly `key`.
    pub fn subject(&self, key: &str) -> Option<&SubjectSection> {
        self.subjects.iter().find(|s| s.key == key)
    }

    /// Returns the subject keys in source order.
    pub fn subject_keys(&self) -> Vec<String> {
        self.subjects.iter().map(|s| s.key.clone()).collect()
    }
}

/// The read-only curriculum document.
///
/// Built once and shared (typically behind an `Arc`) by concurrent readers;
/// nothing in the crate mutates it after construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurriculumDocument {
    grades: Vec<GradeSection>,
}

impl CurriculumDocument {
    /// Builds a document from a parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumError::InvalidShape` if the root is not an object.
    /// Grade entries whose value is not an object are kept without subjects.
    pub fn from_value(value: &Value) -> Result<Self, CurriculumError> {
        let root = value.as_object().ok_or_else(|| {
            CurriculumError::InvalidShape(
                "document root must be an object keyed by grade band".to_string(),
            )
        })?;

        let grades = root
            .iter()
            .map(|(grade, subjects)| {
                let subjects = match subjects.as_object() {
                    Some(subjects) => subjects
                        .iter()
                        .map(|(key, tree)| SubjectSection {
                            key: key.clone(),
                            tree: CurriculumNode::from_value(tree),
                        })
                        .collect(),
                    None => {
                        warn!(grade = %grade, "Grade entry is not an object; it has no subjects");
                        Vec::new()
                    }
                };
                GradeSection {
                    name: grade.clone(),
                    subjects,
                }
            })
            .collect();

        Ok(Self { grades })
    }

    /// Parses a document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, CurriculumError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Loads a document from a UTF-8 JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumError::Io` if the file cannot be read, or a parse /
    /// shape error if its contents are not a curriculum document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CurriculumError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CurriculumError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let document = Self::from_json_str(&json)?;

        info!(
            path = %path.display(),
            grades = document.grades.len(),
            subjects = document.grades.iter().map(|g| g.subjects.len()).sum::<usize>(),
            "Loaded curriculum document"
        );
        Ok(document)
    }

    /// Returns the grade stored under exactly `name`.
    pub fn grade(&self, name: &str) -> Option<&GradeSection> {
        self.grades.iter().find(|g| g.name == name)
    }

    /// Returns the grade keys in source order.
    pub fn grade_names(&self) -> Vec<String> {
        self.grades.iter().map(|g| g.name.clone()).collect()
    }
}
