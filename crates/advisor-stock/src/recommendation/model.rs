//! Language-model backed recommendations

use super::{Recommendation, RecommendationStrategy, Verdict};
use crate::config::StockConfig;
use crate::error::{Result, llm_failure};
use crate::prompts;
use crate::ticker::Ticker;
use advisor_llm::{CompletionRequest, LanguageModelClient, Message, TokenUsage};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

/// Asks the model for a BUY/HOLD/SELL call and keeps its reply as rationale
pub struct ModelBackedStrategy {
    llm: Arc<dyn LanguageModelClient>,
    model: String,
    max_tokens: usize,
}

impl ModelBackedStrategy {
    pub fn new(llm: Arc<dyn LanguageModelClient>, config: &StockConfig) -> Self {
        Self {
            llm,
            model: config.model.clone(),
            max_tokens: config.recommendation_max_tokens,
        }
    }
}

#[async_trait]
impl RecommendationStrategy for ModelBackedStrategy {
    #[instrument(skip(self))]
    async fn recommend(
        &self,
        ticker: &Ticker,
        current_price: f64,
        target_price: f64,
    ) -> Result<(Recommendation, Option<TokenUsage>)> {
        let request = CompletionRequest::builder(&self.model)
            .system(prompts::RECOMMENDATION)
            .add_message(Message::user(prompts::recommendation_request(
                ticker.as_str(),
                current_price,
                target_price,
            )))
            .max_tokens(self.max_tokens)
            .build();

        let response = self
            .llm
            .complete(request)
            .await
            .map_err(llm_failure("recommendation"))?;
        info!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "token usage for recommendation"
        );

        let rationale = response.text.trim();
        let verdict = Verdict::from_reply(rationale);

        Ok((
            Recommendation::new(ticker.clone(), verdict, rationale),
            Some(response.usage),
        ))
    }

    fn name(&self) -> &str {
        self.llm.name()
    }
}
