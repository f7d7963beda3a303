use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser};
use color_eyre::eyre::Result;
use tracing::{debug, info};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use untrans_audit::{
    apply_ignore, build_summary, reconcile, untranslated, AuditSummary, IgnoreList, LanguageSet,
};
use untrans_core::{
    default_languages, to_translateable, to_translated, LanguageConfig, ResourceNaming,
};

const DEFAULT_IGNORE_FILE: &str = "ignore.regx.txt";

#[derive(Parser)]
#[command(
    name = "untrans",
    version,
    about = "Audit Porchlight string resources for missing and stale translations",
    disable_help_flag = true
)]
struct Cli {
    /// Directory containing PorchlightStrings.resx and its translations
    #[arg(short = 'p', long)]
    path: Option<PathBuf>,

    /// Ignore-pattern file, one regular expression per line
    #[arg(long, default_value = DEFAULT_IGNORE_FILE)]
    ignore: PathBuf,

    /// Print a translation report instead of listing untranslated strings
    #[arg(long, default_value_t = false)]
    report_only: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Print help
    #[arg(short = 'h', long = "help", short_alias = '?', action = ArgAction::Help)]
    help: Option<bool>,
}

fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = rolling::daily("logs", "untrans.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // stdout is reserved for audit output, so console logs go to stderr.
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = init_tracing();

    let cli = Cli::parse();
    let config = untrans_config::load_config().unwrap_or_default();

    let Some(base_path) = cli.path.clone() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let use_color = !cli.no_color
        && std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none();

    run(&cli, config, &base_path, use_color)
}

fn run(
    cli: &Cli,
    config: untrans_config::UntransConfig,
    base_path: &std::path::Path,
    use_color: bool,
) -> Result<()> {
    info!("▶ Auditing resources under {}", base_path.display());

    let report_only = cli.report_only || config.report_only.unwrap_or(false);
    let ignore_path = config
        .ignore_file
        .filter(|_| cli.ignore == PathBuf::from(DEFAULT_IGNORE_FILE))
        .map(PathBuf::from)
        .unwrap_or_else(|| cli.ignore.clone());
    let languages: Vec<LanguageConfig> = match config.languages {
        Some(list) => list
            .into_iter()
            .map(|l| LanguageConfig {
                name: l.name,
                code: l.code,
            })
            .collect(),
        None => default_languages(),
    };
    let naming = ResourceNaming::default();

    let source_path = naming.source_path(base_path);
    let Some(source) = untrans_parsers_resx::load_resx(&source_path)? else {
        eprintln!("✖ source resource file not found: {}", source_path.display());
        std::process::exit(2);
    };
    debug!("loaded {} source strings", source.len());

    let Some(ignore) = IgnoreList::load(&ignore_path)? else {
        eprintln!("✖ ignore file not found: {}", ignore_path.display());
        std::process::exit(2);
    };

    let raw = to_translateable(source);
    let mut filtered = apply_ignore(&raw, Some(&ignore));
    debug!(
        "{} of {} strings remain after {} ignore pattern(s)",
        filtered.len(),
        raw.len(),
        ignore.len()
    );

    let mut sets = Vec::new();
    for language in &languages {
        let path = naming.translation_path(base_path, &language.code);
        match untrans_parsers_resx::load_resx(&path)? {
            Some(store) => {
                debug!("{}: {} entries", language.name, store.len());
                sets.push(LanguageSet {
                    language: language.clone(),
                    entries: to_translated(store),
                });
            }
            None => debug!("{}: no resource file at {}", language.name, path.display()),
        }
    }

    reconcile(&mut filtered, &mut sets);

    if report_only {
        let summary = build_summary(&raw, &filtered, ignore.len(), &sets);
        print_summary(&summary, use_color);
    } else {
        for record in untranslated(&filtered) {
            println!("{}\t{}", record.key, record.payload);
        }
    }

    info!("✔ Audit finished");
    Ok(())
}

fn print_summary(summary: &AuditSummary, use_color: bool) {
    println!("Total translateable strings: {}", summary.raw_translateable);
    println!("Ignore patterns applied: {}", summary.ignore_patterns);
    println!("Translateable after ignore: {}", summary.translateable);
    if use_color {
        use owo_colors::OwoColorize;
        if summary.untranslated > 0 {
            println!("Untranslated: {}", summary.untranslated.red());
        } else {
            println!("Untranslated: {}", summary.untranslated.green());
        }
    } else {
        println!("Untranslated: {}", summary.untranslated);
    }
    println!();
    println!("Stale keys:");
    for lang in &summary.languages {
        println!(
            "-- {}: {} of {} strings are stale",
            lang.name, lang.stale, lang.total
        );
    }
}
