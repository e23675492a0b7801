//! Presentation of a finished [`Analysis`](crate::engine::Analysis)
//!
//! - `console`: text block and metrics table for the interactive loop
//! - `dashboard`: HTML pages for the web dashboard
//! - `pdf`: downloadable report (feature `pdf`)

pub mod console;
pub mod dashboard;
pub mod insights;
#[cfg(feature = "pdf")]
pub mod pdf;

pub use dashboard::DashboardRenderer;
pub use insights::{Insights, PotentialTier};

/// Market cap in billions, one decimal
pub(crate) fn format_billions(value: f64) -> String {
    format!("${:.1}B", value / 1e9)
}

/// Integer with thousands separators
pub(crate) fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Cut `text` to `max` characters, marking the cut with "..."
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_billions(3.2e12), "$3200.0B");
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(1234), "1,234");
        assert_eq!(format_thousands(250_000_000), "250,000,000");
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
