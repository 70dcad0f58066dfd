use super::*;
use anyhow::Context;
use std::fs;
use tracing::info;

pub struct Reporter {
    format: OutputFormat,
    output_path: Option<String>,
    color: bool,
}

impl Reporter {
    /// Without `output_path` the report goes to stdout. Colors are only
    /// used on stdout.
    pub fn new(format: &str, output_path: Option<&str>, color: bool) -> Result<Self> {
        let format = OutputFormat::from(format);
        let output_path = output_path.map(|path| add_file_extension(path, &format));

        Ok(Self {
            format,
            color: color && output_path.is_none(),
            output_path,
        })
    }

    pub fn render(&self, report: &SummaryReport) -> Result<String> {
        match self.format {
            OutputFormat::Text => TextGenerator::new(self.color).generate(report),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        }
    }

    pub fn generate_report(&mut self, report: &SummaryReport) -> Result<()> {
        let content = self.render(report)?;

        match &self.output_path {
            Some(path) => {
                fs::write(path, content)
                    .with_context(|| format!("Failed to write report to {}", path))?;
                info!("Report saved to {}", path);
            }
            None => print!("{}", content),
        }
        Ok(())
    }
}
