pub mod report;

use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};
use crate::layout::FileSystemLayout;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for dicomgen
#[derive(Parser, Debug)]
#[command(name = "dicomgen")]
#[command(about = "Synthetic DICOM study generator")]
#[command(version)]
pub struct Cli {
    /// Directory to write DICOM files or tables into
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// JSON array of people to generate studies for
    #[arg(long, value_name = "FILE")]
    pub people: PathBuf,

    /// Random seed; a random one is chosen and logged when omitted
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Comma separated modality codes (default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub modalities: Vec<String>,

    /// Maximum number of images across the whole run
    #[arg(long)]
    pub max_images: Option<usize>,

    /// Do not write pixel data
    #[arg(long)]
    pub no_pixels: bool,

    /// Write study, series and image tables instead of DICOM files
    #[arg(long)]
    pub csv: bool,

    /// Directory layout for DICOM files
    #[arg(short, long, default_value = "study-year-month-day")]
    pub layout: LayoutArg,

    /// Latest study date for people still alive, YYYY-MM-DD (default: today)
    #[arg(long, value_parser = parse_reference_date)]
    pub reference_date: Option<NaiveDate>,

    /// Where to write the per-person study UIDs (default: OUTPUT_DIR/studies.csv)
    #[arg(long, value_name = "FILE")]
    pub rows_file: Option<PathBuf>,

    /// Output format of the run report
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Translates the arguments into a generator configuration
    pub fn config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::new(&self.output_dir)
            .with_modalities(self.modalities.iter().filter(|m| !m.trim().is_empty()).cloned())
            .no_pixels(self.no_pixels)
            .with_layout(self.layout.into());
        if self.csv {
            config = config.tabular();
        }
        if let Some(maximum) = self.max_images {
            config = config.with_maximum_images(maximum);
        }
        if let Some(date) = self.reference_date {
            config = config.with_reference_date(date);
        }
        config
    }

    pub fn rows_path(&self) -> PathBuf {
        self.rows_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join("studies.csv"))
    }
}

fn parse_reference_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| GeneratorError::config(format!("invalid date '{}': {}", s, e)))
}

/// Directory layout options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    /// All files in the output directory
    Flat,
    /// One directory per study
    StudyUid,
    /// Study date directories, then one per study
    StudyYearMonthDay,
    /// Study date directories, then one per accession number
    StudyYearMonthDayAccession,
}

impl From<LayoutArg> for FileSystemLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Flat => FileSystemLayout::Flat,
            LayoutArg::StudyUid => FileSystemLayout::StudyUid,
            LayoutArg::StudyYearMonthDay => FileSystemLayout::StudyYearMonthDay,
            LayoutArg::StudyYearMonthDayAccession => FileSystemLayout::StudyYearMonthDayAccession,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputMode;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["dicomgen", "out", "--people", "people.json"]).unwrap();
        let config = cli.config();
        assert!(config.modalities.is_empty());
        assert_eq!(config.maximum_images, None);
        assert_eq!(
            config.output,
            OutputMode::Files {
                layout: FileSystemLayout::StudyYearMonthDay
            }
        );
        assert_eq!(cli.rows_path(), PathBuf::from("out/studies.csv"));
    }

    #[test]
    fn test_parse_full() {
        let cli = Cli::try_parse_from([
            "dicomgen",
            "out",
            "--people",
            "p.json",
            "--seed",
            "7",
            "--modalities",
            "CT,MR",
            "--max-images",
            "20",
            "--no-pixels",
            "--layout",
            "flat",
            "--reference-date",
            "2019-12-31",
            "--rows-file",
            "rows.csv",
            "--format",
            "json",
        ])
        .unwrap();

        let config = cli.config();
        assert_eq!(cli.seed, Some(7));
        assert_eq!(config.modalities, vec!["CT", "MR"]);
        assert_eq!(config.maximum_images, Some(20));
        assert!(config.no_pixels);
        assert_eq!(config.output, OutputMode::Files { layout: FileSystemLayout::Flat });
        assert_eq!(config.reference_date, NaiveDate::from_ymd_opt(2019, 12, 31).unwrap());
        assert_eq!(cli.rows_path(), PathBuf::from("rows.csv"));
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn test_csv_selects_tabular() {
        let cli = Cli::try_parse_from(["dicomgen", "out", "--people", "p.json", "--csv"]).unwrap();
        assert_eq!(cli.config().output, OutputMode::Tabular);
    }

    #[test]
    fn test_bad_reference_date() {
        let result = Cli::try_parse_from([
            "dicomgen",
            "out",
            "--people",
            "p.json",
            "--reference-date",
            "31/12/2019",
        ]);
        assert!(result.is_err());
    }
}
