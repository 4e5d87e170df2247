use crate::generator::GenerationSummary;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// End-of-run summary printed by the CLI
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub people: usize,
    pub output_dir: PathBuf,
    pub rows_file: PathBuf,

    #[serde(flatten)]
    pub summary: GenerationSummary,
}

impl RunReport {
    pub fn new(
        seed: u64,
        people: usize,
        output_dir: &Path,
        rows_file: &Path,
        summary: &GenerationSummary,
    ) -> Self {
        Self {
            seed,
            people,
            output_dir: output_dir.to_path_buf(),
            rows_file: rows_file.to_path_buf(),
            summary: summary.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Generation Report")?;
        writeln!(f, "=================")?;
        writeln!(f)?;
        writeln!(f, "Seed:           {}", self.seed)?;
        writeln!(f, "People:         {}", self.people)?;
        writeln!(f, "Studies:        {}", self.summary.studies)?;
        writeln!(f, "Partial:        {}", self.summary.partial_studies)?;
        writeln!(f, "Images:         {}", self.summary.images)?;
        writeln!(f, "Output:         {}", self.output_dir.display())?;
        writeln!(f, "Rows:           {}", self.rows_file.display())?;

        if !self.summary.modalities.is_empty() {
            writeln!(f)?;
            writeln!(f, "Studies by Modality")?;
            writeln!(f, "-------------------")?;
            for (modality, count) in &self.summary.modalities {
                writeln!(f, "{:<15} {}", format!("{}:", modality), count)?;
            }
        }

        Ok(())
    }
}
