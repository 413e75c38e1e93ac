//! Vigil Assist Library
//!
//! Client for the external text-completion service used for timeline
//! extraction, verse suggestions, encouragement, trend insight and
//! reminder frequency.
//!
//! # Usage
//!
//! ```ignore
//! let backend = OpenAiBackend::from_env(base_url, model, "GROQ_API_KEY")?;
//! let assistant = Assistant::new(backend);
//!
//! // Never fails: a broken service yields `days: None`
//! let estimate = assistant.timeline("surgery in 3 days").await;
//! ```

mod assistant;
pub mod backend;
pub mod error;
pub mod prompts;

pub use assistant::{parse_timeline, Assistant, ReminderFrequency, TimelineEstimate, DEFAULT_TIMEOUT};
pub use backend::{CompletionBackend, OpenAiBackend};
pub use error::{Error, Result};
pub use prompts::{Prompt, FALLBACK_ENCOURAGEMENT, FALLBACK_TRENDS, FALLBACK_VERSE};
