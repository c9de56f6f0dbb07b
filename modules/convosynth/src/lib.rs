//! convosynth: synthesizes commuter-assistant conversations.
//!
//! A knowledge base of nearby places is sampled with a time- and season-aware
//! model: a timestamp is drawn inside a date window, the timestamp decides
//! which kind of place a commuter plausibly asks about (with distinct weights
//! during the Ramadan period), a question is rendered from matching templates,
//! and an OpenAI-compatible endpoint writes the answer.

pub mod calendar;
pub mod categories;
pub mod generator;
pub mod json_text;
pub mod knowledge_base;
pub mod output;
pub mod picker;
pub mod prompt;
pub mod question;
pub mod report;
pub mod weighted;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use calendar::{DateRange, SpecialPeriods, TemporalSampler, TimeContext};
pub use categories::{CategoryGroup, GroupedCategories};
pub use generator::ConversationGenerator;
pub use knowledge_base::KnowledgeBase;
pub use picker::pick_category;
pub use question::render_question;
pub use report::{extract_bus_routes, DatasetReport};
