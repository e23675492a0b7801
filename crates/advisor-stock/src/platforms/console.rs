//! Interactive console loop
//!
//! Prompts for a ticker or company name, runs the advisor and prints the
//! result. A failed run prints the failing stage and the loop moves on to the
//! next prompt. EOF, `exit` or `quit` ends the loop.

use crate::engine::Advisor;
use crate::report::console;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::warn;

/// Console loop settings
#[derive(Debug, Clone, Default)]
pub struct ConsoleOptions {
    /// Write a PDF per successful analysis into this directory
    pub report_dir: Option<PathBuf>,
}

/// Run the loop over arbitrary input/output, returning the number of analyses
/// that completed
pub async fn run_console<R, W>(
    advisor: &Advisor,
    options: &ConsoleOptions,
    mut input: R,
    mut output: W,
) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut completed = 0;

    loop {
        write!(output, "{}", console::PROMPT)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output, "\nGoodbye!")?;
            break;
        }

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "exit" | "quit") {
            writeln!(output, "Goodbye!")?;
            break;
        }

        writeln!(output, "\n{} Analyzing '{query}'...", console::timestamp())?;

        let mut lines = Vec::new();
        let outcome = advisor
            .analyze_with_progress(query, |progress| {
                lines.push(console::progress_line(&progress));
            })
            .await;
        for line in &lines {
            writeln!(output, "{line}")?;
        }

        let analysis = match outcome {
            Ok(analysis) => analysis,
            Err(err) => {
                writeln!(output, "{}\n", console::failure_line(&err))?;
                continue;
            }
        };

        writeln!(output, "{}", console::render_analysis(&analysis))?;
        completed += 1;

        if let Some(dir) = &options.report_dir {
            export_pdf(&analysis, dir, &mut output)?;
        }
    }

    Ok(completed)
}

#[cfg(feature = "pdf")]
fn export_pdf<W: Write>(
    analysis: &crate::engine::Analysis,
    dir: &std::path::Path,
    output: &mut W,
) -> io::Result<()> {
    match crate::report::pdf::write_report(analysis, dir) {
        Ok(path) => writeln!(output, "PDF report saved to {}\n", path.display()),
        Err(err) => {
            warn!(error = %err, "PDF report unavailable");
            writeln!(output, "PDF report unavailable: {err}\n")
        }
    }
}

#[cfg(not(feature = "pdf"))]
fn export_pdf<W: Write>(
    _analysis: &crate::engine::Analysis,
    _dir: &std::path::Path,
    output: &mut W,
) -> io::Result<()> {
    warn!("PDF export requested but the `pdf` feature is disabled");
    writeln!(output, "PDF report unavailable: built without PDF support\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MarketDataProvider;
    use crate::config::StockConfig;
    use crate::test_support::{ScriptedProvider, info};
    use std::io::Cursor;
    use std::sync::Arc;

    fn advisor(current: Option<f64>, target: Option<f64>) -> Advisor {
        let provider: Arc<dyn MarketDataProvider> =
            Arc::new(ScriptedProvider::new(info(current, target)));
        Advisor::demo(provider, &StockConfig::default())
    }

    async fn run(advisor: &Advisor, options: &ConsoleOptions, input: &str) -> (usize, String) {
        let mut out = Vec::new();
        let completed = run_console(advisor, options, Cursor::new(input.to_string()), &mut out)
            .await
            .unwrap();
        (completed, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_loop_analyzes_until_eof() {
        let advisor = advisor(Some(100.0), Some(130.0));
        let (completed, out) = run(&advisor, &ConsoleOptions::default(), "NVDA\n\nnvda\n").await;

        assert_eq!(completed, 2);
        assert_eq!(out.matches(console::PROMPT).count(), 4);
        assert!(out.contains("Ticker identified: NVDA"));
        assert!(out.contains("RECOMMENDATION: BUY"));
        assert!(out.contains(crate::recommendation::DISCLAIMER));
        assert!(out.ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn test_failure_continues_loop() {
        let advisor = advisor(Some(10.0), None);
        let (completed, out) = run(
            &advisor,
            &ConsoleOptions::default(),
            "XYZ\nTesla Motors\nquit\nNVDA\n",
        )
        .await;

        assert_eq!(completed, 0);
        assert!(out.contains("Failed during market data"));
        assert!(out.contains("Failed during ticker resolution"));
        // Nothing after quit is read
        assert_eq!(out.matches(console::PROMPT).count(), 3);
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn test_report_dir_receives_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let options = ConsoleOptions {
            report_dir: Some(dir.path().to_path_buf()),
        };
        let advisor = advisor(Some(100.0), Some(130.0));

        let (_, out) = run(&advisor, &options, "NVDA\nexit\n").await;

        assert!(out.contains("PDF report saved to"));
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }
}
