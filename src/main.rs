use clap::{Parser, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;

use template_translator::logging::{init_logging, level_for};
use template_translator::{
    HttpQueryApi, LanguageCode, TranslateError, TranslateOutcome, TranslationReport, Translator,
    TranslatorConfig,
};

/// What to print on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Result object with wikitext, ignoredTemplates and ignoredParameters
    Json,
    /// Translated wikitext only
    Text,
    /// Translated wikitext with untranslated names bracketed by « »
    Highlight,
}

#[derive(Parser)]
#[command(name = "template-translator")]
#[command(about = "Translate wikitext template and parameter names between Wikipedia languages")]
struct Args {
    /// Input wikitext file (stdin when omitted)
    input: Option<PathBuf>,

    /// Source language code (e.g. en)
    #[arg(long)]
    from: String,

    /// Target language code (e.g. it)
    #[arg(long)]
    to: String,

    /// YAML file overriding API endpoints and client settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Highlight)]
    format: Format,

    /// Never insert marker characters, even in highlight mode
    #[arg(long)]
    no_marker: bool,

    /// Quiet mode - no summary on stderr
    #[arg(short, long)]
    quiet: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn read_input(input: Option<&PathBuf>) -> io::Result<String> {
    match input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn run(args: &Args, wikitext: &str) -> Result<TranslateOutcome, TranslateError> {
    let config = match &args.config {
        Some(path) => TranslatorConfig::load(path)?,
        None => TranslatorConfig::default(),
    };
    let from = LanguageCode::new(&args.from)?;
    let to = LanguageCode::new(&args.to)?;
    let allow_marker = args.format == Format::Highlight && !args.no_marker;

    let api = HttpQueryApi::new(&config)?;
    let translator = Translator::new(api, config);
    translator.translate(wikitext, &from, &to, allow_marker)
}

/// Alternate segments are untranslated names.
fn highlight(outcome: &TranslateOutcome) -> String {
    outcome
        .segments()
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            if index % 2 == 1 {
                format!("«{segment}»")
            } else {
                segment.to_string()
            }
        })
        .collect()
}

fn print_summary(report: &TranslationReport) {
    if report.is_complete() {
        eprintln!("All templates and parameters translated.");
        return;
    }
    for (template, reason) in &report.ignored_templates {
        eprintln!("template {template:?}: {reason}");
    }
    for (template, params) in &report.ignored_parameters {
        for (param, reason) in params {
            eprintln!("template {template:?} parameter {param:?}: {reason}");
        }
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    init_logging(level_for(args.verbose, args.quiet));

    let wikitext = read_input(args.input.as_ref())?;

    let outcome = match run(&args, &wikitext) {
        Ok(outcome) => outcome,
        Err(e) => {
            // Only the category reaches the user; details go to the debug log.
            debug!(error = %e, "translation failed");
            eprintln!("Error: {}", e.kind());
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&outcome.report)?;
            writeln!(out, "{json}")?;
        }
        Format::Text => write!(out, "{}", outcome.report.wikitext)?,
        Format::Highlight => write!(out, "{}", highlight(&outcome))?,
    }
    out.flush()?;

    if !args.quiet && args.format != Format::Json {
        print_summary(&outcome.report);
    }

    Ok(())
}
