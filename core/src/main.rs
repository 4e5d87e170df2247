use clap::Parser;
use dicomgen_core::cli::report::RunReport;
use dicomgen_core::cli::{Cli, OutputFormat};
use dicomgen_core::{read_people, write_test_data, DicomDataGenerator, Result, Statistics};
use log::{error, info};
use std::fs::File;
use std::io::BufWriter;
use std::process;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match run(&cli) {
        Ok(report) => output_report(&report, cli.format),
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

fn run(cli: &Cli) -> Result<RunReport> {
    let people = read_people(&cli.people)?;
    info!("Loaded {} people from {}", people.len(), cli.people.display());

    let seed = cli.seed.unwrap_or_else(rand::random);
    let config = cli.config();
    let stats = Statistics::shared()?;

    // validates modalities before anything is written
    let mut generator = DicomDataGenerator::new(stats, &config, seed)?;

    let rows_path = cli.rows_path();
    if let Some(parent) = rows_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let rows = BufWriter::new(File::create(&rows_path)?);
    write_test_data(&mut generator, &people, rows)?;
    generator.finish()?;

    Ok(RunReport::new(
        seed,
        people.len(),
        &config.output_dir,
        &rows_path,
        generator.summary(),
    ))
}

fn output_report(report: &RunReport, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", report),
        OutputFormat::Json => match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize to JSON: {}", e);
                eprintln!("Error: Failed to serialize to JSON: {}", e);
                process::exit(1);
            }
        },
    }
}
