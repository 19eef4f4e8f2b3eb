use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicYear {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    pub id: String,
    pub academic_year_id: String,
    pub name: String,
    pub ended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TopicStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl TopicStatus {
    pub fn parse(s: &str) -> Option<TopicStatus> {
        match s {
            "NOT_STARTED" => Some(TopicStatus::NotStarted),
            "IN_PROGRESS" => Some(TopicStatus::InProgress),
            "COMPLETED" => Some(TopicStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub teaching_periods: i64,
    #[serde(default)]
    pub sub_topics: Vec<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub key_concepts: Vec<String>,
    #[serde(default)]
    pub teaching_materials: Vec<String>,
    #[serde(default)]
    pub reference_materials: Vec<String>,
    /// Only baseline topics carry this; it simulates pre-existing coverage.
    /// Teacher-created topics never set it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_hint: Option<TopicStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    pub title: String,
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub academic_year_id: String,
    pub term_id: String,
    pub class_id: String,
    pub name: String,
    pub units: Vec<Unit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
    pub status: TopicStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_covered: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub academic_year_id: String,
    pub term_id: String,
    pub class_id: String,
    pub subject_id: String,
    pub required_threshold_percent: i64,
    pub coverage_percent_at_submit: i64,
    pub status: SubmissionStatus,
    pub declaration_accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_comment: Option<String>,
    pub updated_at: String,
}

/// The single place the composite submission key is built. One logical
/// submission exists per (year, term, class, subject) tuple.
pub fn submission_key(year_id: &str, term_id: &str, class_id: &str, subject_id: &str) -> String {
    format!("{}|{}|{}|{}", year_id, term_id, class_id, subject_id)
}

impl Subject {
    pub fn submission_key(&self) -> String {
        submission_key(&self.academic_year_id, &self.term_id, &self.class_id, &self.id)
    }
}
