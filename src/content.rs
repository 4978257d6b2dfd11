use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Difficulty::Beginner => Difficulty::Intermediate,
            Difficulty::Intermediate => Difficulty::Advanced,
            Difficulty::Advanced => Difficulty::Beginner,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Difficulty::Beginner => Difficulty::Advanced,
            Difficulty::Intermediate => Difficulty::Beginner,
            Difficulty::Advanced => Difficulty::Intermediate,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// Body of `POST /generate`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub skill: String,
    pub difficulty: Difficulty,
}

impl GenerationRequest {
    /// Trims `skill`; returns `None` when nothing is left.
    pub fn new(skill: &str, difficulty: Difficulty) -> Option<Self> {
        let skill = skill.trim();
        if skill.is_empty() {
            return None;
        }
        Some(Self {
            skill: skill.to_string(),
            difficulty,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_time_ms: Option<f64>,
}

/// Sections the model sends as `null` read the same as missing ones.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mcq {
    pub question: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub options: Vec<String>,
    pub answer: usize,
}

impl Mcq {
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.answer).map(String::as_str)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// Lesson, quiz and exercise bundle returned by the content service.
///
/// Fields the client does not model are kept in `extra` so a history entry
/// stores exactly what the server sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPayload {
    #[serde(default)]
    pub meta: ContentMeta,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub micro_lessons: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mcqs: Vec<Mcq>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub exercises: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub key_takeaways: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub videos: Vec<Video>,
    #[serde(
        rename = "searchedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub searched_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentPayload {
    pub fn skill_label(&self) -> &str {
        self.meta.skill.as_deref().unwrap_or("Unknown Skill")
    }

    pub fn difficulty_label(&self) -> &str {
        self.meta.difficulty.as_deref().unwrap_or("beginner")
    }

    /// `generated_at` rendered in local time, or the raw string when it is
    /// not RFC 3339 (the server emits naive ISO timestamps).
    pub fn generated_at_display(&self) -> Option<String> {
        let raw = self.meta.generated_at.as_deref()?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(
                ts.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
            );
        }
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.format("%Y-%m-%d %H:%M").to_string());
        }
        Some(raw.to_string())
    }

    pub fn has_quiz(&self) -> bool {
        !self.mcqs.is_empty()
    }

    /// Same skill as `other`, compared on the server-reported meta.
    pub fn same_skill(&self, other: &ContentPayload) -> bool {
        self.meta.skill == other.meta.skill
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "meta": {
            "skill": "python",
            "difficulty": "beginner",
            "generated_at": "2024-05-01T10:20:30.123456",
            "generation_time_ms": 1532.5
        },
        "micro_lessons": ["Variables hold values.", "Functions group code."],
        "mcqs": [
            {"question": "What keyword defines a function?", "options": ["def", "fn", "func", "lambda"], "answer": 0}
        ],
        "exercises": ["Write hello world."],
        "key_takeaways": ["Practice daily."],
        "videos": [{"title": "Intro", "url": "https://www.youtube.com/embed/abc123", "description": "Basics"}],
        "cached": true
    }"#;

    #[test]
    fn parses_full_payload() {
        let payload: ContentPayload = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(payload.meta.skill.as_deref(), Some("python"));
        assert_eq!(payload.meta.generation_time_ms, Some(1532.5));
        assert_eq!(payload.micro_lessons.len(), 2);
        assert_eq!(payload.mcqs[0].correct_option(), Some("def"));
        assert_eq!(payload.videos[0].title, "Intro");
        assert!(payload.searched_at.is_none());
    }

    #[test]
    fn optional_sections_default_to_empty() {
        let payload: ContentPayload =
            serde_json::from_str(r#"{"meta": {"skill": "go"}, "micro_lessons": ["a"]}"#).unwrap();
        assert!(payload.mcqs.is_empty());
        assert!(payload.exercises.is_empty());
        assert!(payload.key_takeaways.is_empty());
        assert!(payload.videos.is_empty());
        assert!(!payload.has_quiz());
        assert_eq!(payload.difficulty_label(), "beginner");
    }

    #[test]
    fn null_sections_read_as_empty() {
        let payload: ContentPayload = serde_json::from_str(
            r#"{"meta": {"skill": "go"}, "micro_lessons": null, "exercises": null,
                "key_takeaways": null, "videos": null,
                "mcqs": [{"question": "?", "options": null, "answer": 0}]}"#,
        )
        .unwrap();
        assert!(payload.micro_lessons.is_empty());
        assert!(payload.exercises.is_empty());
        assert!(payload.key_takeaways.is_empty());
        assert!(payload.videos.is_empty());
        assert!(payload.mcqs[0].options.is_empty());
        assert!(payload.mcqs[0].correct_option().is_none());
    }

    #[test]
    fn unknown_fields_survive_a_save() {
        let payload: ContentPayload = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(payload.extra.get("cached"), Some(&Value::Bool(true)));

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["cached"], Value::Bool(true));
        assert_eq!(json["meta"]["generation_time_ms"], 1532.5);
    }

    #[test]
    fn searched_at_uses_camel_case_key() {
        let mut payload = ContentPayload::default();
        payload.searched_at = Some(Utc::now());
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("searchedAt").is_some());
        assert!(json.get("searched_at").is_none());
    }

    #[test]
    fn labels_fall_back_when_meta_is_missing() {
        let payload = ContentPayload::default();
        assert_eq!(payload.skill_label(), "Unknown Skill");
        assert_eq!(payload.difficulty_label(), "beginner");
        assert!(payload.generated_at_display().is_none());
    }

    #[test]
    fn naive_generated_at_is_formatted() {
        let payload: ContentPayload = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(
            payload.generated_at_display().as_deref(),
            Some("2024-05-01 10:20")
        );
    }

    #[test]
    fn out_of_range_answer_has_no_correct_option() {
        let mcq = Mcq {
            question: "?".to_string(),
            options: vec!["a".to_string()],
            answer: 3,
        };
        assert!(mcq.correct_option().is_none());
    }

    #[test]
    fn request_trims_and_rejects_blank_skill() {
        let req = GenerationRequest::new("  Rust  ", Difficulty::Advanced).unwrap();
        assert_eq!(req.skill, "Rust");
        assert!(GenerationRequest::new(" \t\n", Difficulty::Beginner).is_none());

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["skill"], "Rust");
        assert_eq!(body["difficulty"], "advanced");
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Intermediate".parse::<Difficulty>(), Ok(Difficulty::Intermediate));
        assert!("expert".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Advanced.next(), Difficulty::Beginner);
        assert_eq!(Difficulty::Beginner.prev(), Difficulty::Advanced);
    }
}
