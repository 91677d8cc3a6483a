use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use time::OffsetDateTime;
use uuid::Uuid;

/// Registered account, keyed by its unique username.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique login name; also the namespace of the user's records.
    pub username: String,
    /// bcrypt hash of the password, never the password itself.
    pub password_hash: String,
    /// Optional name shown instead of the username.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Optional contact address.
    #[serde(default)]
    pub email: Option<String>,
    /// Optional avatar, standard base64 text.
    #[serde(default)]
    pub profile_picture_base64: Option<String>,
}

impl User {
    /// Build a fresh account with no profile details.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            display_name: None,
            email: None,
            profile_picture_base64: None,
        }
    }

    /// Name to greet the user with.
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// Outcome of one completed round. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Unique identifier of the record.
    pub id: Uuid,
    /// Owner of the record.
    pub username: String,
    /// Number of correct answers.
    pub score: u32,
    /// Number of questions in the round.
    pub total_questions: u32,
    /// When the round finished.
    #[serde(rename = "date", with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
}

impl GameRecord {
    /// Record a round finished now. The score is capped at `total_questions`.
    pub fn new(username: impl Into<String>, score: u32, total_questions: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            score: score.min(total_questions),
            total_questions,
            completed_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Publicly listed score target copied from a [`GameRecord`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePosting {
    /// Unique identifier of the posting.
    pub id: Uuid,
    /// Record the posting was copied from. The record may outlive the posting.
    pub original_record_id: Uuid,
    /// Owner of the posting; the only user allowed to remove it.
    pub username: String,
    /// Score to beat.
    pub score: u32,
    /// Question count of the original round.
    pub total_questions: u32,
    /// When the posting was created.
    #[serde(rename = "datePosted", with = "time::serde::rfc3339")]
    pub posted_at: OffsetDateTime,
}

impl ChallengePosting {
    /// Copy the record's values into a new posting.
    pub fn from_record(record: &GameRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_record_id: record.id,
            username: record.username.clone(),
            score: record.score,
            total_questions: record.total_questions,
            posted_at: OffsetDateTime::now_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_uses_browser_field_names() {
        let record = GameRecord::new("ada", 9, 15);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["username"], json!("ada"));
        assert_eq!(value["totalQuestions"], json!(15));
        assert!(value["date"].is_string());
        assert!(value.get("completedAt").is_none());
    }

    #[test]
    fn record_score_is_capped_by_question_count() {
        let record = GameRecord::new("ada", 20, 15);
        assert_eq!(record.score, 15);
    }

    #[test]
    fn user_omits_unset_profile_fields() {
        let user = User::new("ada", "$2b$04$hash");
        let value = serde_json::to_value(&user).unwrap();

        assert_eq!(value, json!({"username": "ada", "passwordHash": "$2b$04$hash"}));
        let decoded: User = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, user);
    }

    #[test]
    fn display_label_falls_back_to_username() {
        let mut user = User::new("ada", "hash");
        assert_eq!(user.display_label(), "ada");

        user.display_name = Some("   ".into());
        assert_eq!(user.display_label(), "ada");

        user.display_name = Some("Ada L.".into());
        assert_eq!(user.display_label(), "Ada L.");
    }

    #[test]
    fn posting_copies_record_values() {
        let record = GameRecord::new("ada", 8, 10);
        let posting = ChallengePosting::from_record(&record);

        assert_eq!(posting.original_record_id, record.id);
        assert_eq!(posting.username, "ada");
        assert_eq!((posting.score, posting.total_questions), (8, 10));
        assert_ne!(posting.id, record.id);

        let value = serde_json::to_value(&posting).unwrap();
        assert!(value["datePosted"].is_string());
        assert_eq!(value["originalRecordId"], json!(record.id.to_string()));
    }
}
