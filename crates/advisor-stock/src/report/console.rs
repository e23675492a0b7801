//! Console rendering for the interactive loop

use super::{format_billions, format_thousands};
use crate::engine::{Analysis, Progress};
use crate::error::StockError;
use chrono::Local;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

/// Prompt shown before each query
pub const PROMPT: &str =
    "Please input a stock ticker (e.g., NVDA) or a company name (e.g., NVIDIA Corporation): ";

const RULE_WIDTH: usize = 50;

/// `[YYYY-MM-DD HH:MM:SS]` for the local clock
pub fn timestamp() -> String {
    Local::now().format("[%Y-%m-%d %H:%M:%S]").to_string()
}

/// Timestamped line for a finished stage
pub fn progress_line(progress: &Progress) -> String {
    let message = match progress {
        Progress::Resolved(ticker) => format!("Ticker identified: {ticker}"),
        Progress::PricesFetched { current, target } => {
            format!("Price data retrieved: current ${current:.2}, target ${target:.2}")
        }
        Progress::Recommended(verdict) => format!("Recommendation ready: {verdict}"),
    };
    format!("{} {message}", timestamp())
}

/// User-facing failure message naming the stage that failed
pub fn failure_line(error: &StockError) -> String {
    format!("{} Failed during {}: {error}", timestamp(), error.stage())
}

/// The recommendation block: prices, potential, verdict, rationale, disclaimer
pub fn render_recommendation(analysis: &Analysis) -> String {
    let rec = &analysis.recommendation;
    let rule = "=".repeat(RULE_WIDTH);

    format!(
        "[{generated}]\n\n\
         STOCK ANALYSIS {ticker}\n\
         {rule}\n\
         Current price: ${current:.2}\n\
         Analyst target price: ${target:.2}\n\
         Potential: {pct:+.1}%\n\n\
         RECOMMENDATION: {verdict}\n\n\
         Rationale:\n\
         {rationale}\n\n\
         {disclaimer}",
        generated = rec.generated_at.format("%Y-%m-%d %H:%M:%S"),
        ticker = analysis.ticker,
        current = analysis.current_price(),
        target = analysis.target_price(),
        pct = analysis.potential_pct(),
        verdict = rec.verdict,
        rationale = rec.rationale,
        disclaimer = rec.disclaimer,
    )
}

/// Key metrics as a table; rows with no data are left out
pub fn metrics_table(analysis: &Analysis) -> Table {
    let info = &analysis.info;
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Metric", "Value"]);

    table.add_row(vec!["Company".to_string(), analysis.company_name().to_string()]);
    if let Some(sector) = &info.sector {
        table.add_row(vec!["Sector".to_string(), sector.clone()]);
    }
    if let Some(cap) = info.market_cap {
        table.add_row(vec!["Market cap".to_string(), format_billions(cap)]);
    }
    if let Some(pe) = info.trailing_pe {
        table.add_row(vec!["P/E ratio".to_string(), format!("{pe:.2}")]);
    }
    if let Some(pb) = info.price_to_book {
        table.add_row(vec!["P/B ratio".to_string(), format!("{pb:.2}")]);
    }
    let dividend = info
        .dividend_yield
        .map_or_else(|| "N/A".to_string(), |y| format!("{:.2}%", y * 100.0));
    table.add_row(vec!["Dividend yield".to_string(), dividend]);
    if let Some(beta) = info.beta {
        table.add_row(vec!["Beta".to_string(), format!("{beta:.2}")]);
    }
    if let Some(volume) = info.volume {
        table.add_row(vec!["Volume".to_string(), format_thousands(volume)]);
    }

    table
}

/// Token usage line, when a model was involved
pub fn usage_line(analysis: &Analysis) -> Option<String> {
    analysis.usage.map(|usage| {
        format!(
            "Token usage: {} input / {} output",
            usage.input_tokens, usage.output_tokens
        )
    })
}

/// Everything printed for one finished analysis
pub fn render_analysis(analysis: &Analysis) -> String {
    let rule = "=".repeat(RULE_WIDTH + 10);
    let mut out = format!(
        "\n{rule}\n{}\n{rule}\n{}\n",
        render_recommendation(analysis),
        metrics_table(analysis)
    );
    if let Some(usage) = usage_line(analysis) {
        out.push_str(&usage);
        out.push('\n');
    }
    out
}
