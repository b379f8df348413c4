//! AGS wire entities: line items, results and scores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A gradable column on the platform.
///
/// The `id` is platform-assigned and opaque: the tool uses it verbatim as
/// the item's URL and never constructs item URLs itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Platform-assigned line-item URL. Absent on creation requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Column label shown in the gradebook.
    pub label: String,

    /// Maximum score for this item.
    pub score_maximum: f64,

    /// Resource link this item is coupled to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_link_id: Option<String>,

    /// Tool-chosen tag for grouping items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Tool-chosen resource id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    /// Submissions open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date_time: Option<DateTime<Utc>>,

    /// Submissions close.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<DateTime<Utc>>,
}

impl LineItem {
    /// A new line item with the fields every item needs.
    pub fn new(label: impl Into<String>, score_maximum: f64) -> Self {
        Self {
            label: label.into(),
            score_maximum,
            ..Default::default()
        }
    }
}

/// The platform's current grade for one user on one line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemResult {
    /// Platform-assigned result URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The line item this result belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_of: Option<String>,

    /// Platform user id.
    pub user_id: String,

    /// Current grade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_score: Option<f64>,

    /// Maximum the grade is out of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_maximum: Option<f64>,

    /// Grader comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A score update published by the tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// Platform user id the score is for.
    pub user_id: String,

    /// When the activity was scored.
    pub timestamp: DateTime<Utc>,

    /// Points given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_given: Option<f64>,

    /// Points the score is out of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_maximum: Option<f64>,

    /// Comment shown to the learner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Where the learner is in the activity.
    pub activity_progress: ActivityProgress,

    /// Where the platform is in grading it.
    pub grading_progress: GradingProgress,
}

impl Score {
    /// A fully graded, completed score, the common passback case.
    pub fn graded(user_id: impl Into<String>, score_given: f64, score_maximum: f64) -> Self {
        Self {
            user_id: user_id.into(),
            timestamp: Utc::now(),
            score_given: Some(score_given),
            score_maximum: Some(score_maximum),
            comment: None,
            activity_progress: ActivityProgress::Completed,
            grading_progress: GradingProgress::FullyGraded,
        }
    }

    /// Attach a comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Learner progress through the activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityProgress {
    Initialized,
    Started,
    InProgress,
    Submitted,
    Completed,
}

/// Platform progress through grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradingProgress {
    FullyGraded,
    Pending,
    PendingManual,
    Failed,
    NotReady,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_serializes_camel_case_and_omits_none() {
        let item = LineItem {
            label: "Quiz 1".into(),
            score_maximum: 100.0,
            resource_link_id: Some("rl-1".into()),
            ..Default::default()
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["label"], "Quiz 1");
        assert_eq!(json["scoreMaximum"], 100.0);
        assert_eq!(json["resourceLinkId"], "rl-1");
        // Unset optionals don't appear on the wire.
        assert!(json.get("id").is_none());
        assert!(json.get("tag").is_none());
        assert!(json.get("startDateTime").is_none());
    }

    #[test]
    fn test_line_item_roundtrips_platform_response() {
        let body = r#"{
            "id": "https://platform.example.edu/course/1/lineitems/7",
            "label": "Quiz 1",
            "scoreMaximum": 100.0,
            "resourceLinkId": "rl-1",
            "tag": "quiz",
            "resourceId": "res-1"
        }"#;
        let item: LineItem = serde_json::from_str(body).unwrap();
        assert_eq!(
            item.id.as_deref(),
            Some("https://platform.example.edu/course/1/lineitems/7")
        );
        assert_eq!(item.tag.as_deref(), Some("quiz"));

        let echoed: LineItem =
            serde_json::from_str(&serde_json::to_string(&item).unwrap()).unwrap();
        assert_eq!(echoed, item);
    }

    #[test]
    fn test_score_serializes_progress_vocabulary() {
        let score = Score::graded("user-1", 83.0, 100.0).with_comment("nice work");
        let json = serde_json::to_value(&score).unwrap();
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["scoreGiven"], 83.0);
        assert_eq!(json["activityProgress"], "Completed");
        assert_eq!(json["gradingProgress"], "FullyGraded");
        assert_eq!(json["comment"], "nice work");
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_result_deserializes() {
        let body = r#"{
            "id": "https://platform.example.edu/course/1/lineitems/7/results/3",
            "scoreOf": "https://platform.example.edu/course/1/lineitems/7",
            "userId": "user-1",
            "resultScore": 83.0,
            "resultMaximum": 100.0,
            "comment": "nice work"
        }"#;
        let result: LineItemResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.user_id, "user-1");
        assert_eq!(result.result_score, Some(83.0));
    }
}
