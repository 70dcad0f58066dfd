use super::*;
use crate::summary::Metric;
use colored::*;
use std::fmt::Write;

const NO_DATA: &str = "n/a (no data)";

pub struct TextGenerator {
    color: bool,
}

impl TextGenerator {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint(text, |t| t.bright_cyan().bold())
    }

    fn metric(&self, metric: &Metric, render: impl Fn(f64) -> String) -> String {
        match metric.get() {
            Some(value) => self.paint(&render(value), |t| t.bright_white()),
            None => self.paint(NO_DATA, |t| t.dimmed()),
        }
    }
}

impl OutputGenerator for TextGenerator {
    fn generate(&mut self, report: &SummaryReport) -> Result<String> {
        let mut out = String::new();

        writeln!(out, "{}", self.heading("Top committers"))?;
        if report.top_committers.is_empty() {
            writeln!(out, "  {}", self.paint("no commits", |t| t.dimmed()))?;
        }
        let width = report
            .top_committers
            .iter()
            .map(|c| c.author.chars().count())
            .max()
            .unwrap_or(0);
        for (rank, contributor) in report.top_committers.iter().enumerate() {
            writeln!(
                out,
                "  {}. {:<width$}  {}",
                rank + 1,
                contributor.author,
                contributor.commits,
                width = width
            )?;
        }
        writeln!(
            out,
            "  {} commits by {} authors",
            report.total_commits, report.distinct_authors
        )?;

        let close = &report.close_rate;
        writeln!(out)?;
        writeln!(out, "{}", self.heading("Issue close rate"))?;
        writeln!(
            out,
            "  {} ({} closed of {} issues)",
            self.metric(&close.rate, |rate| format!("{:.1}%", rate * 100.0)),
            close.closed,
            close.total
        )?;

        let duration = &report.open_duration;
        writeln!(out)?;
        writeln!(out, "{}", self.heading("Average issue open duration"))?;
        writeln!(
            out,
            "  {} (over {} closed issues)",
            self.metric(&duration.average_days, |days| format!("{:.2} days", days)),
            duration.qualifying
        )?;
        if duration.inverted > 0 {
            writeln!(
                out,
                "  {}",
                self.paint(
                    &format!(
                        "{} closed issues ignored: closed before created",
                        duration.inverted
                    ),
                    |t| t.yellow()
                )
            )?;
        }

        Ok(out)
    }
}
