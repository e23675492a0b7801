//! PDF export of an analysis
//!
//! Built-in Helvetica only covers Latin-1, so text is folded to ASCII first.

use super::{format_billions, format_thousands, truncate};
use crate::engine::Analysis;
use crate::error::{Result, StockError};
use crate::ticker::Ticker;
use chrono::NaiveDate;
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use std::path::{Path, PathBuf};
use tracing::info;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
/// Average Helvetica glyph width as a fraction of the font size
const GLYPH_WIDTH: f32 = 0.5;
const PT_PER_MM: f32 = 2.835;

/// `{TICKER}_AI_Stock_Analysis_{YYYYMMDD}.pdf`
pub fn report_file_name(ticker: &Ticker, date: NaiveDate) -> String {
    format!("{ticker}_AI_Stock_Analysis_{}.pdf", date.format("%Y%m%d"))
}

/// Render the report and write it into `dir`, returning the file path
pub fn write_report(analysis: &Analysis, dir: &Path) -> Result<PathBuf> {
    let bytes = render_pdf(analysis)?;
    std::fs::create_dir_all(dir)
        .map_err(|e| StockError::RenderFailure(format!("{}: {e}", dir.display())))?;

    let path = dir.join(report_file_name(
        &analysis.ticker,
        analysis.recommendation.generated_at.date_naive(),
    ));
    std::fs::write(&path, bytes)
        .map_err(|e| StockError::RenderFailure(format!("{}: {e}", path.display())))?;

    info!(path = %path.display(), "PDF report written");
    Ok(path)
}

/// Render the report to PDF bytes
pub fn render_pdf(analysis: &Analysis) -> Result<Vec<u8>> {
    let title = format!("{} AI Stock Analysis", analysis.ticker);
    let (doc, page, layer) = PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(render_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(render_error)?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut writer = PageWriter {
        doc,
        layer,
        regular,
        bold,
        y: PAGE_HEIGHT - MARGIN,
    };
    write_body(&mut writer, analysis);

    writer.doc.save_to_bytes().map_err(render_error)
}

fn render_error(err: impl std::fmt::Display) -> StockError {
    StockError::RenderFailure(err.to_string())
}

fn write_body(w: &mut PageWriter, analysis: &Analysis) {
    let info = &analysis.info;
    let rec = &analysis.recommendation;

    w.line("AI Stock Analysis Report", 20.0, true);
    w.gap(4.0);
    w.line(
        &format!("{} ({})", analysis.company_name(), analysis.ticker),
        15.0,
        true,
    );
    if let Some(sector) = &info.sector {
        let industry = info.industry.as_deref().unwrap_or("N/A");
        w.line(&format!("Sector: {sector} | Industry: {industry}"), 10.0, false);
    }
    w.line(
        &format!("Generated: {}", rec.generated_at.format("%Y-%m-%d %H:%M:%S")),
        10.0,
        false,
    );
    w.gap(6.0);

    w.line(&format!("RECOMMENDATION: {}", rec.verdict), 16.0, true);
    w.gap(4.0);

    w.heading("Key Metrics");
    w.row("Current price", &format!("${:.2}", analysis.current_price()));
    w.row("Analyst target price", &format!("${:.2}", analysis.target_price()));
    w.row("Potential", &format!("{:+.2}%", analysis.potential_pct()));
    w.row("Upside tier", analysis.insights().tier.label());
    if let Some(cap) = info.market_cap {
        w.row("Market cap", &format_billions(cap));
    }
    w.gap(4.0);

    w.heading("Analysis");
    w.paragraph(&rec.rationale, 10.0);
    w.gap(4.0);

    let insights = analysis.insights();
    if !insights.positive_factors.is_empty() {
        w.line("Positive factors:", 10.0, true);
        for factor in &insights.positive_factors {
            w.paragraph(&format!("- {factor}"), 10.0);
        }
    }
    w.line("Points to consider:", 10.0, true);
    for point in &insights.considerations {
        w.paragraph(&format!("- {point}"), 10.0);
    }
    w.gap(4.0);

    w.heading("Additional Metrics");
    let or_na = |value: Option<String>| value.unwrap_or_else(|| "N/A".to_string());
    w.row("P/E ratio", &or_na(info.trailing_pe.map(|v| format!("{v:.2}"))));
    w.row("P/B ratio", &or_na(info.price_to_book.map(|v| format!("{v:.2}"))));
    w.row(
        "Dividend yield",
        &or_na(info.dividend_yield.map(|v| format!("{:.2}%", v * 100.0))),
    );
    w.row("Beta", &or_na(info.beta.map(|v| format!("{v:.2}"))));
    w.row("Volume", &or_na(info.volume.map(format_thousands)));
    w.gap(4.0);

    w.heading("Company Information");
    w.row("Name", analysis.company_name());
    w.row("Country", info.country.as_deref().unwrap_or("N/A"));
    w.row("Website", info.website.as_deref().unwrap_or("N/A"));
    if let Some(summary) = &info.long_business_summary {
        w.gap(2.0);
        w.paragraph(&truncate(summary, 500), 9.0);
    }
    w.gap(6.0);

    w.paragraph(&rec.disclaimer, 8.0);
}

/// Writes top-to-bottom, opening a new page when the cursor hits the margin
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Baseline of the next line, in mm from the bottom
    y: f32,
}

impl PageWriter {
    fn line(&mut self, text: &str, size: f32, bold: bool) {
        let height = size / PT_PER_MM * 1.4;
        if self.y - height < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.y -= height;

        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(to_ascii(text), size, Mm(MARGIN), Mm(self.y), font);
    }

    fn heading(&mut self, text: &str) {
        self.line(text, 13.0, true);
        self.gap(1.0);
    }

    fn row(&mut self, label: &str, value: &str) {
        self.line(&format!("{label}: {value}"), 10.0, false);
    }

    fn paragraph(&mut self, text: &str, size: f32) {
        let usable_pt = (PAGE_WIDTH - 2.0 * MARGIN) * PT_PER_MM;
        let width = (usable_pt / (size * GLYPH_WIDTH)) as usize;
        for line in wrap(text, width) {
            self.line(&line, size, false);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

/// Word-wrap to at most `width` characters per line; newlines are kept
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}

/// Fold text to printable ASCII
fn to_ascii(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::analysis;

    #[test]
    fn test_report_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            report_file_name(&Ticker::parse("NVDA").unwrap(), date),
            "NVDA_AI_Stock_Analysis_20240307.pdf"
        );
    }

    #[test]
    fn test_render_produces_pdf() {
        let mut analysis = analysis("NVDA", 100.0, 130.0);
        analysis.recommendation.rationale = "Long rationale. ".repeat(400);
        let bytes = render_pdf(&analysis).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = analysis("AAPL", 200.0, 190.0);

        let path = write_report(&analysis, dir.path()).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("AAPL_AI_Stock_Analysis_"));
        assert!(name.ends_with(".pdf"));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("a\nb", 10), vec!["a", "b"]);
        assert_eq!(wrap("unbreakableword", 5), vec!["unbreakableword"]);
    }

    #[test]
    fn test_to_ascii() {
        assert_eq!(to_ascii("it\u{2019}s \u{2014} ok"), "it's - ok");
        assert_eq!(to_ascii("caf\u{e9}"), "caf?");
    }
}
