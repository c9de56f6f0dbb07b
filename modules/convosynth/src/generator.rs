//! Conversation assembly: the sequential loop tying sampling, rendering and
//! the completion call together.

use ai_client::ChatCompletion;
use chrono::NaiveDateTime;
use convosynth_common::{
    Conversation, ConversationMessage, ConversationMeta, ConvoSynthError, GeneratorConfig, Place,
    CONVERSATION_SOURCE,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::calendar::{DateRange, SpecialPeriods, TemporalSampler};
use crate::categories::GroupedCategories;
use crate::knowledge_base::KnowledgeBase;
use crate::picker::pick_category;
use crate::prompt::{build_answer_prompt, SYSTEM_PROMPT};
use crate::question::render_question;
use crate::weighted::choose;

/// Everything decided before the completion call for one conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationDraft<'a> {
    pub created_at: NaiveDateTime,
    pub category: String,
    pub place: &'a Place,
    pub question: String,
}

pub struct ConversationGenerator<C> {
    client: C,
    knowledge_base: KnowledgeBase,
    config: GeneratorConfig,
    periods: SpecialPeriods,
}

impl<C: ChatCompletion> ConversationGenerator<C> {
    pub fn new(client: C, knowledge_base: KnowledgeBase, config: GeneratorConfig) -> Self {
        Self {
            client,
            knowledge_base,
            config,
            periods: SpecialPeriods::default(),
        }
    }

    pub fn with_special_periods(mut self, periods: SpecialPeriods) -> Self {
        self.periods = periods;
        self
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    /// Number of conversations a run produces.
    pub fn planned_count(&self) -> usize {
        if self.config.count > 0 {
            self.config.count as usize
        } else {
            self.knowledge_base.place_count()
        }
    }

    /// Generate the whole batch. Any completion failure aborts the run and
    /// nothing produced so far is returned.
    pub async fn generate(&self) -> Result<Vec<Conversation>, ConvoSynthError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let sampler = TemporalSampler::new(
            DateRange::new(self.config.start_date, self.config.end_date),
            self.periods.clone(),
        );
        let grouped = GroupedCategories::from_knowledge_base(&self.knowledge_base);
        let all_places = self.knowledge_base.all_places();

        let total = self.planned_count();
        info!(
            total,
            seed = self.config.seed,
            model = self.client.model(),
            "Generating conversations"
        );

        let mut conversations = Vec::with_capacity(total);
        for index in 0..total {
            let draft = self.draft(&mut rng, &sampler, &grouped, &all_places)?;
            let prompt = build_answer_prompt(&draft.question, &draft.category, draft.place);

            let completion = self
                .client
                .complete(SYSTEM_PROMPT, &prompt, self.config.temperature)
                .await
                .map_err(|e| ConvoSynthError::Completion(format!("conversation {index}: {e:#}")))?;

            let answer = if rng.random::<f64>() < self.config.missing_answer_rate {
                String::new()
            } else {
                completion.content.trim().to_string()
            };

            debug!(
                index,
                category = %draft.category,
                at = %draft.created_at,
                latency_ms = completion.latency_ms,
                answered = !answer.is_empty(),
                "Conversation generated"
            );

            conversations.push(Conversation {
                id: Conversation::id_for(self.config.seed, index),
                category: draft.category,
                location: draft.place.name.clone(),
                messages: vec![
                    ConversationMessage::user(draft.question),
                    ConversationMessage::assistant(answer),
                ],
                meta: ConversationMeta {
                    model: self.client.model().to_string(),
                    source: CONVERSATION_SOURCE.to_string(),
                    date: draft.created_at.format("%Y-%m-%d").to_string(),
                    time: draft.created_at.format("%H:%M:%S").to_string(),
                    latency_ms: completion.latency_ms,
                },
            });

            if !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }
        }

        Ok(conversations)
    }

    /// Sample timestamp, category, place and question for one conversation.
    fn draft<'a, R: Rng + ?Sized>(
        &'a self,
        rng: &mut R,
        sampler: &TemporalSampler,
        grouped: &GroupedCategories,
        all_places: &[&'a Place],
    ) -> Result<ConversationDraft<'a>, ConvoSynthError> {
        let created_at = sampler.sample_timestamp(rng);
        let category = pick_category(rng, created_at, grouped, &self.periods);

        let place = match self.knowledge_base.places(&category) {
            Some(places) if !places.is_empty() => choose(rng, places),
            _ => choose(rng, all_places).copied(),
        }
        .ok_or(ConvoSynthError::EmptyKnowledgeBase)?;

        let question = render_question(rng, &category, place, created_at, &self.periods);

        Ok(ConversationDraft {
            created_at,
            category,
            place,
            question,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubCompletion;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::from_json_str(
            r#"{
                "mosques": [{"name": "Al Jafiliya Mosque"}],
                "malls": [{"name": "BurJuman"}, {"name": "Lamcy Plaza"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn planned_count_falls_back_to_place_count() {
        let config = GeneratorConfig {
            count: 0,
            ..Default::default()
        };
        let generator = ConversationGenerator::new(StubCompletion::new("ok"), kb(), config);
        assert_eq!(generator.planned_count(), 3);

        let config = GeneratorConfig {
            count: -5,
            ..Default::default()
        };
        let generator = ConversationGenerator::new(StubCompletion::new("ok"), kb(), config);
        assert_eq!(generator.planned_count(), 3);
    }

    #[test]
    fn draft_place_belongs_to_category() {
        let generator =
            ConversationGenerator::new(StubCompletion::new("ok"), kb(), GeneratorConfig::default());
        let sampler = TemporalSampler::new(
            DateRange::new(generator.config.start_date, generator.config.end_date),
            SpecialPeriods::default(),
        );
        let grouped = GroupedCategories::from_knowledge_base(generator.knowledge_base());
        let all = generator.knowledge_base().all_places();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..200 {
            let draft = generator
                .draft(&mut rng, &sampler, &grouped, &all)
                .unwrap();
            let places = generator.knowledge_base().places(&draft.category).unwrap();
            assert!(places.iter().any(|p| std::ptr::eq(p, draft.place)));
        }
    }
}
