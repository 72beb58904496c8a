use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use simplesearch::index::stats::show_stats;
use simplesearch::index::{SearchConfig, SearchIndex, build_index_with_threads, verify_round_trip};
use simplesearch::output::print_report;
use simplesearch::repl::Repl;
use simplesearch::session::SearchSession;
use simplesearch::utils::AppConfig;
use std::io;
use std::path::{Path, PathBuf};
use termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "simplesearch")]
#[command(about = "Word and phrase search over a directory of text files")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory to index before entering the shell
    directory: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

/// Overrides for the settings in config.json
#[derive(Args)]
struct ConfigArgs {
    /// Distinguish upper and lower case
    #[arg(long, global = true)]
    case_sensitive: bool,

    /// Keep punctuation attached to words
    #[arg(long, global = true)]
    keep_punctuation: bool,

    /// End-of-word symbol; must not occur in any indexed word
    #[arg(long, global = true)]
    end_indicator: Option<char>,

    /// Maximum number of documents per report
    #[arg(long, global = true)]
    max_report: Option<usize>,

    /// Extension of the files to index
    #[arg(long, global = true)]
    ext: Option<String>,

    /// Reader threads (0 = number of CPUs)
    #[arg(short, long, global = true)]
    threads: Option<usize>,
}

/// Where an index comes from
#[derive(Args)]
#[group(required = true, multiple = false)]
struct Source {
    /// Build the index from this directory
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Load a saved session
    #[arg(long)]
    session: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index and save it as a session file
    Index {
        /// Directory of documents
        path: PathBuf,

        /// Session file to write
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Run one query and print the report
    Search {
        #[command(flatten)]
        source: Source,

        /// Query words; end with -p for comma separated phrases
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,
    },
    /// Show index statistics
    Stats {
        #[command(flatten)]
        source: Source,
    },
    /// Check that every document can be rebuilt word for word from the index
    Verify {
        /// Directory of documents
        path: PathBuf,
    },
}

impl ConfigArgs {
    fn apply(&self, app: &mut AppConfig) -> Result<()> {
        let search = &mut app.search;
        if self.case_sensitive {
            search.case_sensitive = true;
        }
        if self.keep_punctuation {
            search.ignore_punctuation = false;
        }
        if let Some(c) = self.end_indicator {
            search.end_indicator = c;
        }
        if let Some(n) = self.max_report {
            search.maximum_report = n;
        }
        if let Some(ref ext) = self.ext {
            search.file_extension = ext.trim_start_matches('.').to_string();
        }
        if let Some(threads) = self.threads {
            app.threads = threads;
        }
        search.validate()?;
        Ok(())
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut app = AppConfig::load()?;
    cli.config.apply(&mut app)?;
    let threads = app.effective_threads();
    let color = !cli.no_color;

    match cli.command {
        Some(Commands::Index { path, output }) => {
            let index = build_index_with_threads(&path, app.search, threads, false)?;
            let documents = index.document_count();
            SearchSession::new(index)
                .save(&output)
                .with_context(|| format!("Failed to save session to {}", output.display()))?;
            println!(
                "{} files read in directory {}, session saved to {}",
                documents,
                path.display(),
                output.display()
            );
        }
        Some(Commands::Search { source, query }) => {
            let mut session = open_session(&source, app.search, threads)?;
            let report = session.search_str(&query.join(" "));
            print_report(&report, color)?;
        }
        Some(Commands::Stats { source }) => {
            let session = open_session(&source, app.search, threads)?;
            show_stats(session.index(), source.session.as_deref())?;
        }
        Some(Commands::Verify { path }) => {
            let index = build_index_with_threads(&path, app.search, threads, false)?;
            verify(&path, &index, threads)?;
        }
        None => {
            let choice = if color {
                ColorChoice::Auto
            } else {
                ColorChoice::Never
            };
            let stdin = io::stdin();
            let mut repl = Repl::new(stdin.lock(), StandardStream::stdout(choice), app.search, threads);
            repl.run(cli.directory.as_deref())?;
        }
    }

    Ok(())
}

fn open_session(source: &Source, config: SearchConfig, threads: usize) -> Result<SearchSession> {
    if let Some(ref path) = source.session {
        return SearchSession::load(path)
            .with_context(|| format!("Failed to load session {}", path.display()));
    }
    match source.dir {
        Some(ref dir) => {
            let index = build_index_with_threads(dir, config, threads, true)?;
            Ok(SearchSession::new(index))
        }
        None => bail!("Either --dir or --session is required"),
    }
}

fn verify(path: &Path, index: &SearchIndex, threads: usize) -> Result<()> {
    let report = verify_round_trip(path, index, threads)?;
    if !report.is_ok() {
        for name in &report.mismatched {
            eprintln!("mismatch: {}", name);
        }
        bail!(
            "{} of {} documents could not be rebuilt from the index",
            report.mismatched.len(),
            report.documents_checked
        );
    }
    println!(
        "All {} documents rebuilt word for word from the index",
        report.documents_checked
    );
    Ok(())
}
