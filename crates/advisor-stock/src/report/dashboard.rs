//! HTML pages for the web dashboard, rendered with minijinja
//!
//! Templates end in `.html`, so every interpolated value is HTML-escaped.

use super::{format_billions, format_thousands, truncate};
use crate::engine::Analysis;
use crate::error::{Result, StockError};
use minijinja::{Environment, context};
use serde::Serialize;

/// Tickers offered as one-click buttons on the landing page
pub const QUICK_TICKERS: &[&str] = &["NVDA", "MSFT", "TSLA", "AAPL"];

const SUMMARY_LIMIT: usize = 500;

const LAYOUT: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{% block title %}AI Stock Advisor{% endblock %}</title>
<style>
body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 960px; padding: 1.5rem; color: #1f2937; }
header h1 { margin-bottom: 0.25rem; }
form { display: flex; gap: 0.5rem; margin: 1rem 0; }
input[type=text] { flex: 1; padding: 0.5rem; font-size: 1rem; }
button, .quick a { padding: 0.5rem 1rem; border: 1px solid #2563eb; background: #2563eb; color: #fff; border-radius: 4px; text-decoration: none; }
.quick { display: flex; gap: 0.5rem; }
.metrics { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; }
.metric { border: 1px solid #e5e7eb; border-radius: 6px; padding: 0.75rem; }
.metric .label { font-size: 0.8rem; color: #6b7280; }
.metric .value { font-size: 1.4rem; font-weight: 600; }
.delta.up { color: #15803d; } .delta.down { color: #b91c1c; }
.chart { display: flex; align-items: flex-end; gap: 2rem; height: 200px; margin: 1rem 0; }
.bar { width: 120px; text-align: center; color: #fff; padding-top: 0.25rem; }
.bar.current { background: #1f77b4; } .bar.target { background: #2ca02c; }
.verdict { padding: 1rem; border-radius: 8px; color: #fff; }
.verdict.buy { background: #15803d; } .verdict.hold { background: #ca8a04; } .verdict.sell { background: #b91c1c; }
.tier.high { color: #15803d; } .tier.medium { color: #2563eb; } .tier.low { color: #ca8a04; } .tier.above_target { color: #b91c1c; }
.error { border: 1px solid #b91c1c; background: #fef2f2; padding: 1rem; border-radius: 6px; }
.disclaimer { font-size: 0.85rem; color: #6b7280; border-top: 1px solid #e5e7eb; margin-top: 2rem; padding-top: 1rem; }
</style>
</head>
<body>
<header>
<h1><a href="/" style="color: inherit; text-decoration: none">AI Stock Advisor</a></h1>
<p>BUY / HOLD / SELL recommendations from live prices and analyst targets.</p>
</header>
<form action="/analyze" method="get">
<input type="text" name="q" value="{{ query }}" placeholder="Ticker (e.g. NVDA) or company name (e.g. NVIDIA Corporation)">
<button type="submit">Analyze</button>
</form>
{% block content %}{% endblock %}
<p class="disclaimer">{{ disclaimer }}</p>
</body>
</html>
"#;

const INDEX: &str = r#"{% extends "layout.html" %}
{% block content %}
<h3>Quick tickers</h3>
<div class="quick">
{% for ticker in quick_tickers %}<a href="/analyze?q={{ ticker }}">{{ ticker }}</a>{% endfor %}
</div>
<h3>How it works</h3>
<ol>
<li>Enter a ticker or a company name.</li>
<li>Live price and analyst target are fetched.</li>
<li>You get a BUY / HOLD / SELL recommendation with its rationale.</li>
</ol>
{% endblock %}
"#;

const ANALYSIS: &str = r#"{% extends "layout.html" %}
{% block title %}{{ a.ticker }} - AI Stock Advisor{% endblock %}
{% block content %}
<h2>{{ a.company }} ({{ a.ticker }})</h2>
{% if a.sector %}<p><strong>Sector:</strong> {{ a.sector }}{% if a.industry %} &middot; <strong>Industry:</strong> {{ a.industry }}{% endif %}</p>{% endif %}

<h3>Key price metrics</h3>
<div class="metrics">
<div class="metric"><div class="label">Current price</div><div class="value">${{ a.current }}</div></div>
<div class="metric"><div class="label">Analyst target price</div><div class="value">${{ a.target }}</div></div>
<div class="metric"><div class="label">Potential</div><div class="value delta {{ a.direction }}">{{ a.potential }}</div></div>
{% if a.market_cap %}<div class="metric"><div class="label">Market cap</div><div class="value">{{ a.market_cap }}</div></div>{% endif %}
</div>

<h3>Price comparison</h3>
<div class="chart">
<div class="bar current" style="height: {{ a.current_bar }}%">Current<br>${{ a.current }}</div>
<div class="bar target" style="height: {{ a.target_bar }}%">Target<br>${{ a.target }}</div>
</div>

<h3>Recommendation</h3>
<div class="verdict {{ a.verdict_class }}"><h2 style="margin: 0">RECOMMENDATION: {{ a.verdict }}</h2></div>

<h4>Summary</h4>
<ul>
<li><strong>Ticker:</strong> {{ a.ticker }}</li>
<li><strong>Current price:</strong> ${{ a.current }}</li>
<li><strong>Target price:</strong> ${{ a.target }}</li>
<li><strong>Potential:</strong> {{ a.potential }}</li>
<li><strong>Recommendation:</strong> {{ a.verdict }}</li>
</ul>
<p class="tier {{ insights.tier }}"><strong>{{ a.tier_label }}</strong></p>

<h4>Rationale</h4>
<p style="white-space: pre-wrap">{{ a.rationale }}</p>

<div class="metrics" style="grid-template-columns: 1fr 1fr">
<div><strong>Positive factors</strong><ul>{% for f in insights.positive_factors %}<li>{{ f }}</li>{% else %}<li>None identified</li>{% endfor %}</ul></div>
<div><strong>Points to consider</strong><ul>{% for c in insights.considerations %}<li>{{ c }}</li>{% endfor %}</ul></div>
</div>

{% if a.usage %}<p><em>{{ a.usage }}</em></p>{% endif %}

<h3>Additional metrics</h3>
<ul>
<li><strong>P/E ratio:</strong> {{ a.pe or "N/A" }}</li>
<li><strong>P/B ratio:</strong> {{ a.pb or "N/A" }}</li>
<li><strong>Dividend yield:</strong> {{ a.dividend or "N/A" }}</li>
<li><strong>Beta:</strong> {{ a.beta or "N/A" }}</li>
<li><strong>Volume:</strong> {{ a.volume or "N/A" }}</li>
</ul>

<h3>Company details</h3>
<ul>
<li><strong>Name:</strong> {{ a.company }}</li>
<li><strong>Country:</strong> {{ a.country or "N/A" }}</li>
<li><strong>Website:</strong> {{ a.website or "N/A" }}</li>
</ul>
{% if a.summary %}<p>{{ a.summary }}</p>{% endif %}

<p><small>Analysis time: {{ a.generated_at }}</small></p>
{% if pdf %}<p><a href="/report?ticker={{ a.ticker }}">Download the full PDF report</a></p>{% endif %}
{% endblock %}
"#;

const ERROR: &str = r#"{% extends "layout.html" %}
{% block content %}
<div class="error">
<strong>Analysis failed during {{ stage }}.</strong>
<p>{{ message }}</p>
{% if rate_limited %}<p>The market-data provider is throttling requests. Please try again in a few minutes.</p>{% endif %}
</div>
{% endblock %}
"#;

/// Flattened, pre-formatted view of an [`Analysis`] for the template
#[derive(Debug, Serialize)]
struct AnalysisView {
    ticker: String,
    company: String,
    sector: Option<String>,
    industry: Option<String>,
    current: String,
    target: String,
    potential: String,
    direction: &'static str,
    market_cap: Option<String>,
    current_bar: u32,
    target_bar: u32,
    verdict: &'static str,
    verdict_class: String,
    tier_label: &'static str,
    rationale: String,
    usage: Option<String>,
    pe: Option<String>,
    pb: Option<String>,
    dividend: Option<String>,
    beta: Option<String>,
    volume: Option<String>,
    country: Option<String>,
    website: Option<String>,
    summary: Option<String>,
    generated_at: String,
}

impl AnalysisView {
    fn new(analysis: &Analysis) -> Self {
        let info = &analysis.info;
        let current = analysis.current_price();
        let target = analysis.target_price();
        let pct = analysis.potential_pct();
        let tallest = current.max(target).max(f64::EPSILON);
        let rec = &analysis.recommendation;

        Self {
            ticker: analysis.ticker.to_string(),
            company: analysis.company_name().to_string(),
            sector: info.sector.clone(),
            industry: info.industry.clone(),
            current: format!("{current:.2}"),
            target: format!("{target:.2}"),
            potential: format!("{pct:+.2}%"),
            direction: if pct >= 0.0 { "up" } else { "down" },
            market_cap: info.market_cap.map(format_billions),
            current_bar: bar_height(current, tallest),
            target_bar: bar_height(target, tallest),
            verdict: rec.verdict.as_str(),
            verdict_class: rec.verdict.as_str().to_lowercase(),
            tier_label: analysis.insights().tier.label(),
            rationale: rec.rationale.clone(),
            usage: analysis.usage.map(|u| {
                format!(
                    "Token usage: {} input / {} output",
                    u.input_tokens, u.output_tokens
                )
            }),
            pe: info.trailing_pe.map(|v| format!("{v:.2}")),
            pb: info.price_to_book.map(|v| format!("{v:.2}")),
            dividend: info.dividend_yield.map(|v| format!("{:.2}%", v * 100.0)),
            beta: info.beta.map(|v| format!("{v:.2}")),
            volume: info.volume.map(format_thousands),
            country: info.country.clone(),
            website: info.website.clone(),
            summary: info
                .long_business_summary
                .as_deref()
                .map(|s| truncate(s, SUMMARY_LIMIT)),
            generated_at: rec.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Bar height in percent of the chart, at least 5 so a bar stays visible
fn bar_height(value: f64, tallest: f64) -> u32 {
    ((value / tallest * 100.0).round() as u32).clamp(5, 100)
}

/// Renders dashboard pages
pub struct DashboardRenderer {
    env: Environment<'static>,
}

impl DashboardRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for (name, source) in [
            ("layout.html", LAYOUT),
            ("index.html", INDEX),
            ("analysis.html", ANALYSIS),
            ("error.html", ERROR),
        ] {
            env.add_template(name, source)
                .map_err(|e| StockError::RenderFailure(format!("template {name}: {e}")))?;
        }
        Ok(Self { env })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(|e| StockError::RenderFailure(format!("{name}: {e}")))
    }

    /// Landing page with the search form and quick tickers
    pub fn index(&self) -> Result<String> {
        self.render(
            "index.html",
            context! {
                query => "",
                quick_tickers => QUICK_TICKERS,
                disclaimer => crate::recommendation::DISCLAIMER,
            },
        )
    }

    /// Result page for a finished analysis
    pub fn analysis(&self, analysis: &Analysis) -> Result<String> {
        self.render(
            "analysis.html",
            context! {
                query => &analysis.query,
                a => AnalysisView::new(analysis),
                insights => analysis.insights(),
                pdf => cfg!(feature = "pdf"),
                disclaimer => &analysis.recommendation.disclaimer,
            },
        )
    }

    /// Error page naming the failed stage
    pub fn error(&self, query: &str, error: &StockError) -> Result<String> {
        self.render(
            "error.html",
            context! {
                query => query,
                stage => error.stage(),
                message => error.to_string(),
                rate_limited => error.is_rate_limited(),
                disclaimer => crate::recommendation::DISCLAIMER,
            },
        )
    }
}
