use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use metadiff_diff::{
    CompareConfig, Comparison, DialectChoice, ModeSelection, compare, format_report,
    raw_line_count,
};
use metadiff_xml::{Dialect, parse_elements};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "meta-diff")]
#[command(about = "Compare two text or XML metadata files regardless of order")]
struct Cli {
    before: PathBuf,
    after: PathBuf,

    /// Comparison strategy; auto picks XML when either file looks like XML.
    #[arg(long, value_enum)]
    mode: Option<CliMode>,

    #[arg(long)]
    json: bool,

    /// TOML file with comparison options and extra identity rules.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    dialect: Option<CliDialect>,

    #[arg(long)]
    case_insensitive: bool,

    #[arg(long)]
    keep_empty: bool,

    #[arg(long)]
    no_trim: bool,

    #[arg(long)]
    keep_comments: bool,

    #[arg(long)]
    keep_whitespace: bool,

    /// Only list entries containing this text (counts are unaffected).
    #[arg(long)]
    filter: Option<String>,

    /// Log more to stderr (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    Auto,
    Lines,
    Xml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliDialect {
    Salesforce,
    Generic,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let before_text = fs::read_to_string(&cli.before)?;
    let after_text = fs::read_to_string(&cli.after)?;

    let config = build_config(&cli)?;
    let dialect = config.build_dialect();
    info!(
        mode = ?config.mode,
        dialect = dialect.dialect_name(),
        rules = config.rules.key_fields.len(),
        "loaded configuration"
    );

    let mut comparison = compare(&before_text, &after_text, &config, dialect.as_ref());

    let nothing_parsed = matches!(
        &comparison,
        Comparison::Xml(result) if result.stats.total_before == 0 && result.stats.total_after == 0
    );
    if nothing_parsed {
        report_parse_failures(
            [
                (cli.before.as_path(), before_text.as_str()),
                (cli.after.as_path(), after_text.as_str()),
            ],
            &config,
            dialect.as_ref(),
        );
    }

    if let Some(query) = cli.filter.as_deref() {
        comparison = match comparison {
            Comparison::Lines(result) => Comparison::Lines(result.filtered(query)),
            Comparison::Xml(result) => Comparison::Xml(result.filtered(query)),
        };
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        println!(
            "{}",
            format_report(
                &comparison,
                &label(&cli.before, &before_text),
                &label(&cli.after, &after_text),
            )
        );
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file values, then command-line overrides.
fn build_config(cli: &Cli) -> Result<CompareConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => CompareConfig::load(path)?,
        None => CompareConfig::default(),
    };

    if let Some(mode) = cli.mode {
        config.mode = match mode {
            CliMode::Auto => ModeSelection::Auto,
            CliMode::Lines => ModeSelection::Lines,
            CliMode::Xml => ModeSelection::Xml,
        };
    }
    if let Some(dialect) = cli.dialect {
        config.dialect = match dialect {
            CliDialect::Salesforce => DialectChoice::Salesforce,
            CliDialect::Generic => DialectChoice::Generic,
        };
    }
    if cli.case_insensitive {
        config.lines.case_insensitive = true;
    }
    if cli.keep_empty {
        config.lines.ignore_empty = false;
    }
    if cli.no_trim {
        config.lines.trim_whitespace = false;
    }
    if cli.keep_comments {
        config.xml.ignore_comments = false;
    }
    if cli.keep_whitespace {
        config.xml.normalize_whitespace = false;
    }

    Ok(config)
}

/// An all-zero XML result also means "failed to parse"; say which file failed.
fn report_parse_failures(
    sides: [(&Path, &str); 2],
    config: &CompareConfig,
    dialect: &dyn Dialect,
) {
    for (path, text) in sides {
        let parsed = parse_elements(text, &config.xml, dialect);
        if let Some(error) = parsed.error {
            eprintln!("warning: {} is not well-formed XML: {error}", path.display());
        }
    }
}

fn label(path: &Path, text: &str) -> String {
    format!("{} ({} lines)", path.display(), raw_line_count(text))
}
