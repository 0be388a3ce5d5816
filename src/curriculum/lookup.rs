//! Topic lookup and browsing over a [`CurriculumDocument`].
//!
//! `find_topic` never fails loudly: every failure comes back as
//! [`LookupResult::NotFound`] so the orchestrator can continue with a
//! degraded context string. When several topics match a query the first one
//! in traversal order wins; this is a known limitation, not a ranking.

use serde::{Serialize, Serializer};
use tracing::debug;

use super::document::{CurriculumDocument, SubjectSection, TopicRecord};
use super::normalize::{normalize_grade, normalize_subject};
use crate::error::LookupError;

/// A successful lookup: the matched record plus the canonical keys used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMatch {
    /// Canonical grade key the topic was found under.
    pub grade: String,
    /// Canonical subject key the topic was found under.
    pub subject: String,
    /// The matched topic.
    pub record: TopicRecord,
}

/// Outcome of [`find_topic`].
///
/// The accessors return empty collections on the error side so callers can
/// format either outcome without matching on it. Serializes to one flat
/// shape with an extra `error` field when the lookup failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Found(TopicMatch),
    NotFound(LookupError),
}

impl LookupResult {
    /// Returns true when a topic matched.
    pub fn is_found(&self) -> bool {
        matches!(self, LookupResult::Found(_))
    }

    /// The matched topic record, if any.
    pub fn record(&self) -> Option<&TopicRecord> {
        match self {
            LookupResult::Found(found) => Some(&found.record),
            LookupResult::NotFound(_) => None,
        }
    }

    /// The lookup failure, if any.
    pub fn error(&self) -> Option<&LookupError> {
        match self {
            LookupResult::Found(_) => None,
            LookupResult::NotFound(err) => Some(err),
        }
    }

    /// Name of the matched topic.
    pub fn topic_name(&self) -> Option<&str> {
        self.record().map(|r| r.topic_name.as_str())
    }

    /// Performance objectives; empty on failure.
    pub fn objectives(&self) -> &[String] {
        self.record().map(|r| r.objectives.as_slice()).unwrap_or(&[])
    }

    /// Content items; empty on failure.
    pub fn content(&self) -> &[String] {
        self.record().map(|r| r.content.as_slice()).unwrap_or(&[])
    }

    /// Teacher activities; empty on failure.
    pub fn teacher_activities(&self) -> &[String] {
        self.record()
            .map(|r| r.teacher_activities.as_slice())
            .unwrap_or(&[])
    }

    /// Student (pupil) activities; empty on failure.
    pub fn student_activities(&self) -> &[String] {
        self.record()
            .map(|r| r.student_activities.as_slice())
            .unwrap_or(&[])
    }

    /// Teaching and learning resources; empty on failure.
    pub fn resources(&self) -> &[String] {
        self.record().map(|r| r.resources.as_slice()).unwrap_or(&[])
    }
}

#[derive(Serialize)]
struct LookupView<'a> {
    topic_name: Option<&'a str>,
    objectives: &'a [String],
    content: &'a [String],
    teacher_activities: &'a [String],
    student_activities: &'a [String],
    resources: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Serialize for LookupResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        LookupView {
            topic_name: self.topic_name(),
            objectives: self.objectives(),
            content: self.content(),
            teacher_activities: self.teacher_activities(),
            student_activities: self.student_activities(),
            resources: self.resources(),
            error: self.error().map(ToString::to_string),
        }
        .serialize(serializer)
    }
}

/// Looks up a topic by free-text grade, subject and topic query.
///
/// Grade and subject are normalized first; the subject tree is then searched
/// depth-first for the first topic whose name matches the query in either
/// direction (see [`TopicRecord::matches_query`]).
pub fn find_topic(
    document: &CurriculumDocument,
    grade: &str,
    subject: &str,
    topic_query: &str,
) -> LookupResult {
    let section = match resolve_subject(document, grade, subject) {
        Ok(section) => section,
        Err(err) => {
            debug!(grade = %grade, subject = %subject, error = %err, "Curriculum lookup failed");
            return LookupResult::NotFound(err);
        }
    };

    match section.subject.tree.find_topic(topic_query) {
        Some(record) => {
            debug!(
                grade = %section.grade,
                subject = %section.subject.key,
                query = %topic_query,
                topic = %record.topic_name,
                "Curriculum topic matched"
            );
            LookupResult::Found(TopicMatch {
                grade: section.grade,
                subject: section.subject.key.clone(),
                record: record.clone(),
            })
        }
        None => {
            let err = LookupError::TopicNotFound {
                grade: section.grade,
                subject: section.subject.key.clone(),
                topic: topic_query.to_string(),
            };
            debug!(error = %err, "Curriculum lookup failed");
            LookupResult::NotFound(err)
        }
    }
}

/// Lists the grade keys of the document in source order.
pub fn list_grades(document: &CurriculumDocument) -> Vec<String> {
    document.grade_names()
}

/// Lists the subject keys available for a free-text grade.
pub fn list_subjects(
    document: &CurriculumDocument,
    grade: &str,
) -> Result<Vec<String>, LookupError> {
    let canonical = normalize_grade(grade);
    document
        .grade(&canonical)
        .map(|g| g.subject_keys())
        .ok_or_else(|| LookupError::GradeNotFound {
            grade: canonical,
            available: document.grade_names(),
        })
}

/// Lists topic names for a free-text grade and subject, in traversal order.
pub fn list_topics(
    document: &CurriculumDocument,
    grade: &str,
    subject: &str,
) -> Result<Vec<String>, LookupError> {
    let section = resolve_subject(document, grade, subject)?;
    Ok(section
        .subject
        .tree
        .topic_names()
        .into_iter()
        .map(str::to_string)
        .collect())
}

struct ResolvedSubject<'a> {
    grade: String,
    subject: &'a SubjectSection,
}

fn resolve_subject<'a>(
    document: &'a CurriculumDocument,
    grade: &str,
    subject: &str,
) -> Result<ResolvedSubject<'a>, LookupError> {
    let canonical_grade = normalize_grade(grade);
    let canonical_subject = normalize_subject(subject);

    let grade_section =
        document
            .grade(&canonical_grade)
            .ok_or_else(|| LookupError::GradeNotFound {
                grade: canonical_grade.clone(),
                available: document.grade_names(),
            })?;

    let subject_section = grade_section.subject(&canonical_subject).ok_or_else(|| {
        LookupError::SubjectNotFound {
            grade: canonical_grade.clone(),
            subject: canonical_subject.clone(),
            available: grade_section.subject_keys(),
        }
    })?;

    Ok(ResolvedSubject {
        grade: canonical_grade,
        subject: subject_section,
    })
}
