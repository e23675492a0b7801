//! The advisor: ticker resolution, market data and recommendation in one run

use super::result::Analysis;
use crate::api::MarketDataProvider;
use crate::config::StockConfig;
use crate::error::Result;
use crate::fetcher::MarketDataFetcher;
use crate::recommendation::{
    DeterministicStrategy, ModelBackedStrategy, RecommendationStrategy, Verdict,
};
use crate::ticker::{Ticker, TickerResolver};
use advisor_llm::{LanguageModelClient, TokenUsage};
use std::sync::Arc;
use tracing::{info, instrument};

/// Milestones reported while a run progresses
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    Resolved(Ticker),
    PricesFetched { current: f64, target: f64 },
    Recommended(Verdict),
}

/// Runs the advisory pipeline
pub struct Advisor {
    resolver: TickerResolver,
    fetcher: MarketDataFetcher,
    strategy: Box<dyn RecommendationStrategy>,
}

impl Advisor {
    pub fn new(
        resolver: TickerResolver,
        fetcher: MarketDataFetcher,
        strategy: Box<dyn RecommendationStrategy>,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            strategy,
        }
    }

    /// Model-backed resolution and recommendation
    pub fn model_backed(
        llm: Arc<dyn LanguageModelClient>,
        provider: Arc<dyn MarketDataProvider>,
        config: &StockConfig,
    ) -> Self {
        Self::new(
            TickerResolver::new(Arc::clone(&llm), config),
            MarketDataFetcher::new(provider, config),
            Box::new(ModelBackedStrategy::new(llm, config)),
        )
    }

    /// Offline resolution and the deterministic rule; no model involved
    pub fn demo(provider: Arc<dyn MarketDataProvider>, config: &StockConfig) -> Self {
        Self::new(
            TickerResolver::offline(),
            MarketDataFetcher::new(provider, config),
            Box::new(DeterministicStrategy::new()),
        )
    }

    /// Analyze one query
    pub async fn analyze(&self, query: &str) -> Result<Analysis> {
        self.analyze_with_progress(query, |_| {}).await
    }

    /// Analyze one query, reporting each finished stage
    #[instrument(skip(self, progress), fields(strategy = self.strategy.name()))]
    pub async fn analyze_with_progress<P>(&self, query: &str, mut progress: P) -> Result<Analysis>
    where
        P: FnMut(Progress) + Send,
    {
        let resolution = self.resolver.resolve(query).await?;
        let ticker = resolution.ticker;
        progress(Progress::Resolved(ticker.clone()));

        let fetched = self.fetcher.fetch(&ticker).await?;
        let (current, target) = fetched.snapshot.require_prices()?;
        progress(Progress::PricesFetched { current, target });

        let (recommendation, recommend_usage) =
            self.strategy.recommend(&ticker, current, target).await?;
        progress(Progress::Recommended(recommendation.verdict));

        let usage = sum_usage(resolution.usage, recommend_usage);
        info!(%ticker, verdict = %recommendation.verdict, "analysis complete");

        Ok(Analysis {
            query: query.trim().to_string(),
            ticker,
            snapshot: fetched.snapshot,
            info: fetched.info,
            recommendation,
            usage,
        })
    }
}

fn sum_usage(first: Option<TokenUsage>, second: Option<TokenUsage>) -> Option<TokenUsage> {
    match (first, second) {
        (Some(a), Some(b)) => Some(a + b),
        (a, b) => a.or(b),
    }
}
