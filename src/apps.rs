use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};

use crate::config::CorpusConfig;
use crate::constants::corpus::{DEFAULT_JSON_DIR, DEFAULT_OUTPUT_DIR};
use crate::corpus::{assemble, write_corpus};
use crate::metrics::CorpusSummary;
use crate::report::{invalid_words_report, problems_report, write_report};

#[derive(Debug, Parser)]
#[command(
    name = "json2corpus",
    disable_help_subcommand = true,
    about = "Flatten scraped survey questionnaires into a question corpus",
    long_about = "Normalize, explode, traverse, and validate every survey JSON document, then write the full and light corpus tables, the notes table, and the problems reports.",
    after_help = "Set RUST_LOG (e.g. RUST_LOG=qbank=debug) to control log verbosity."
)]
struct Json2CorpusCli {
    #[arg(
        long = "json-dir",
        value_name = "DIR",
        default_value = DEFAULT_JSON_DIR,
        help = "Directory holding the survey JSON documents"
    )]
    json_dir: PathBuf,
    #[arg(
        long = "output-dir",
        value_name = "DIR",
        default_value = DEFAULT_OUTPUT_DIR,
        help = "Directory receiving tables and reports"
    )]
    output_dir: PathBuf,
    #[arg(
        long = "scrape-status",
        value_name = "CSV",
        help = "Scrape-status sheet with 'Filename (includes formtype)' and 'Validated?' columns"
    )]
    scrape_status: Option<PathBuf>,
    #[arg(
        long = "only-validated",
        requires = "scrape_status",
        help = "Process only documents marked validated in the scrape-status sheet"
    )]
    only_validated: bool,
    #[arg(
        long = "survey-names",
        value_name = "CSV",
        help = "Two-column survey_number,survey_name table"
    )]
    survey_names: Option<PathBuf>,
    #[arg(
        long = "per-document-csv",
        help = "Also write one table per document under <output-dir>/documents"
    )]
    per_document_csv: bool,
    #[arg(long = "no-notes", help = "Skip the notes table")]
    no_notes: bool,
    #[arg(long, help = "Process documents one at a time")]
    sequential: bool,
    #[arg(long, help = "Descend into subdirectories of the json directory")]
    recursive: bool,
    #[arg(
        long = "report-only",
        help = "Write only the problems and invalid-words reports"
    )]
    report_only: bool,
}

impl Json2CorpusCli {
    fn into_config(self) -> CorpusConfig {
        let mut config = CorpusConfig::new(self.json_dir)
            .with_output_dir(self.output_dir)
            .with_per_document_csv(self.per_document_csv)
            .with_notes(!self.no_notes)
            .with_parallel(!self.sequential)
            .with_recursive(self.recursive);
        if let Some(status) = self.scrape_status {
            config = config.with_scrape_status(status, self.only_validated);
        }
        if let Some(names) = self.survey_names {
            config = config.with_survey_names(names);
        }
        config
    }
}

/// Run the `json2corpus` command line. `args_iter` excludes the program name.
pub fn run_json2corpus<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<Json2CorpusCli, _>(
        std::iter::once("json2corpus".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };
    let report_only = cli.report_only;
    let config = cli.into_config();

    let corpus = assemble(&config)?;

    let problems_path = config.output_path(&config.files.problems_report);
    write_report(&problems_path, &problems_report(&corpus.documents))?;
    let invalid_path = config.output_path(&config.files.invalid_words_report);
    write_report(&invalid_path, &invalid_words_report(&corpus.documents))?;
    println!("Wrote {}", problems_path.display());
    println!("Wrote {}", invalid_path.display());

    if !report_only {
        write_corpus(&corpus, &config)?;
        println!("Wrote {}", config.output_path(&config.files.full).display());
        println!("Wrote {}", config.output_path(&config.files.light).display());
    }

    print_summary(&corpus.summary());
    Ok(())
}

fn print_summary(summary: &CorpusSummary) {
    println!("=== corpus summary ===");
    println!("documents processed : {}", summary.processed);
    println!("documents skipped   : {}", summary.failed);
    println!("with problems       : {}", summary.documents_with_problems);
    println!("rows                : {}", summary.rows);
    println!("duplicate uids      : {}", summary.duplicate_rows);
    println!("notes               : {}", summary.notes);
    match summary.largest_survey() {
        Some(largest) => println!(
            "surveys             : {} (largest {} at {:.1}%)",
            summary.surveys.len(),
            largest.survey,
            largest.share * 100.0
        ),
        None => println!("surveys             : 0"),
    }
    for entry in &summary.surveys {
        let survey = if entry.survey.is_empty() {
            "<none>"
        } else {
            entry.survey.as_str()
        };
        println!(
            "  {survey:<8} {:>7} rows  {:>5.1}%",
            entry.rows,
            entry.share * 100.0
        );
    }
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Json2CorpusCli {
        parse_cli::<Json2CorpusCli, _>(std::iter::once("json2corpus").chain(args.iter().copied()))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn defaults_follow_published_layout() {
        let config = parse(&[]).into_config();
        assert_eq!(config.json_dir, PathBuf::from("data/jsons"));
        assert_eq!(config.output_dir, PathBuf::from("data"));
        assert!(config.parallel);
        assert!(config.write_notes);
    }

    #[test]
    fn flags_map_onto_config() {
        let config = parse(&[
            "--json-dir",
            "in",
            "--output-dir",
            "out",
            "--scrape-status",
            "status.csv",
            "--only-validated",
            "--survey-names",
            "names.csv",
            "--per-document-csv",
            "--sequential",
        ])
        .into_config();
        assert_eq!(config.scrape_status, Some(PathBuf::from("status.csv")));
        assert!(config.only_validated);
        assert_eq!(config.survey_names, Some(PathBuf::from("names.csv")));
        assert!(config.per_document_csv);
        assert!(!config.parallel);
    }

    #[test]
    fn only_validated_requires_status_sheet() {
        let result = parse_cli::<Json2CorpusCli, _>(["json2corpus", "--only-validated"]);
        assert!(result.is_err());
    }

    #[test]
    fn help_is_not_an_error() {
        let result = parse_cli::<Json2CorpusCli, _>(["json2corpus", "--help"]).unwrap();
        assert!(result.is_none());
    }
}
