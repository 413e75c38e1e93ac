//! Prompts and fixed fallback replies for each assist task

use serde::Serialize;

/// Verse offered when no suggestion can be generated
pub const FALLBACK_VERSE: &str = "\"The Lord is close to the brokenhearted and saves those who are crushed in spirit.\" - Psalm 34:18";

/// Encouragement offered when none can be generated
pub const FALLBACK_ENCOURAGEMENT: &str =
    "We're lifting you up in prayer. God is faithful and He hears every prayer.";

/// Trend summary shown when analysis fails
pub const FALLBACK_TRENDS: &str = "Prayer trends analysis not available.";

const TIMELINE_SYSTEM: &str = r#"You are a helpful assistant that extracts timeline information from prayer requests.
Extract the number of days until a deadline or event.
Examples:
- "exam in 3 days" -> 3
- "surgery on Friday" -> calculate days until Friday from today
- "interview next week" -> 7
- "ongoing" -> null

Respond ONLY with a JSON object like: {"days": 3, "deadline": "Friday"} or {"days": null, "deadline": null}"#;

const VERSE_SYSTEM: &str = "You are a compassionate Christian prayer support assistant. Suggest ONE relevant Bible verse (with reference) that would encourage someone with this prayer need. Keep it brief and comforting. Format: \"verse text\" - Reference";

const ENCOURAGEMENT_SYSTEM: &str = "You are a compassionate Christian prayer warrior. Write a brief, heartfelt encouragement message (2-3 sentences) for someone with this prayer need. Be warm, hopeful, and Christ-centered.";

const TRENDS_SYSTEM: &str = "You are a church leadership advisor. Analyze prayer request patterns and provide 3-4 bullet points of insights for church leaders. Focus on common themes, urgent needs, and pastoral care opportunities.";

const FREQUENCY_SYSTEM: &str = r#"You determine prayer reminder frequency.
Rules:
- Urgent/time-sensitive requests (surgery, exam, interview) -> "twice-daily"
- Ongoing critical needs (healing, financial crisis) -> "daily"
- Long-term requests (general guidance, ministry) -> "weekly"

Respond with ONLY one word: "daily", "twice-daily", or "weekly""#;

/// A single-turn chat prompt with its sampling settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prompt {
    pub system: &'static str,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Prompt {
    pub fn timeline(text: &str) -> Self {
        Self {
            system: TIMELINE_SYSTEM,
            user: format!("Extract timeline from: \"{}\"", text),
            temperature: 0.1,
            max_tokens: 100,
        }
    }

    pub fn verse(request_text: &str, category: &str) -> Self {
        Self {
            system: VERSE_SYSTEM,
            user: format!(
                "Prayer category: {}\nPrayer request: {}\n\nSuggest an encouraging Bible verse:",
                category, request_text
            ),
            temperature: 0.7,
            max_tokens: 150,
        }
    }

    pub fn encouragement(request_text: &str) -> Self {
        Self {
            system: ENCOURAGEMENT_SYSTEM,
            user: format!("Prayer request: {}\n\nWrite encouragement:", request_text),
            temperature: 0.8,
            max_tokens: 150,
        }
    }

    /// `requests` holds (category, title) pairs
    pub fn trends<'r>(requests: impl IntoIterator<Item = (&'r str, &'r str)>) -> Self {
        let summary = requests
            .into_iter()
            .map(|(category, title)| format!("{}: {}", category, title))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            system: TRENDS_SYSTEM,
            user: format!(
                "Recent prayer requests:\n{}\n\nProvide leadership insights:",
                summary
            ),
            temperature: 0.5,
            max_tokens: 300,
        }
    }

    pub fn reminder_frequency(timeline: Option<&str>, category: &str) -> Self {
        Self {
            system: FREQUENCY_SYSTEM,
            user: format!(
                "Timeline: {}\nCategory: {}\n\nRecommend frequency:",
                timeline.unwrap_or("ongoing"),
                category
            ),
            temperature: 0.1,
            max_tokens: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trends_prompt_lists_requests() {
        let prompt = Prompt::trends([("Health", "Surgery"), ("Work", "New job")]);
        assert!(prompt.user.contains("Health: Surgery\nWork: New job"));
        assert_eq!(prompt.max_tokens, 300);
    }

    #[test]
    fn test_frequency_prompt_defaults_to_ongoing() {
        let prompt = Prompt::reminder_frequency(None, "General");
        assert!(prompt.user.starts_with("Timeline: ongoing\n"));
    }
}
