use std::{
    io::{self, IsTerminal},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use boolsearch::{
    BuildOptions,
    DataDir,
    IndexHandle,
    IndexOrigin,
    LoadedIndex,
    QueryParser,
    QuerySyntax,
    Tokenizer,
    builder::{self, Progress},
    cli::{BuildArgs, Cli, Command, ReplArgs, SearchArgs, StatusArgs},
    data_dir,
    error,
    index_cache::{self, CacheStatus},
    repl::{self, Session},
    search,
};
use clap::Parser;
use kdam::BarExt;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("BOOLSEARCH_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Shows build progress on stderr when it is a terminal.
struct ProgressBar {
    bar: Mutex<Option<kdam::Bar>>,
}

impl ProgressBar {
    fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }
}

impl Progress for ProgressBar {
    fn start(&self, total: usize) {
        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(kdam::tqdm!(total = total, desc = "Indexing"));
        }
    }

    fn advance(&self) {
        if let Ok(mut guard) = self.bar.lock()
            && let Some(bar) = guard.as_mut()
        {
            if let Err(e) = bar.update(1) {
                tracing::trace!("progress bar update failed: {e}");
            }
        }
    }

    fn finish(&self) {
        if let Ok(mut guard) = self.bar.lock()
            && let Some(mut bar) = guard.take()
        {
            if let Err(e) = bar.refresh() {
                tracing::trace!("progress bar refresh failed: {e}");
            }
            eprintln!();
        }
    }
}

struct Context {
    data_dir: DataDir,
    corpus_dir: PathBuf,
    parser: QueryParser,
    build_options: BuildOptions,
}

impl Context {
    fn from_cli(cli: &Cli) -> error::Result<Self> {
        let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
        let corpus_dir = data_dir::resolve_corpus_dir(cli.corpus.as_deref());
        let tokenizer = Tokenizer::new(cli.alphabet);

        let syntax = if cli.english_operators {
            QuerySyntax::english()
        } else {
            QuerySyntax::default()
        };
        let parser = QueryParser::new(tokenizer).with_syntax(syntax);

        let progress: Option<Arc<dyn Progress>> = if io::stderr().is_terminal()
        {
            Some(Arc::new(ProgressBar::new()))
        } else {
            None
        };

        Ok(Self {
            data_dir,
            corpus_dir,
            parser,
            build_options: BuildOptions {
                tokenizer,
                strip_markup: cli.html,
                cancel: None,
                progress,
            },
        })
    }

    fn cache_path(&self) -> PathBuf {
        self.data_dir.index_cache()
    }

    fn load_index(&self, force: bool) -> LoadedIndex {
        if force {
            builder::rebuild(
                &self.corpus_dir,
                &self.cache_path(),
                &self.build_options,
            )
        } else {
            builder::load_or_build(
                &self.corpus_dir,
                &self.cache_path(),
                &self.build_options,
            )
        }
    }
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Some(Command::Completions(args)) = &cli.command {
        args.generate();
        return Ok(());
    }

    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        None => cmd_repl(&ctx, &ReplArgs::default())?,
        Some(Command::Repl(args)) => cmd_repl(&ctx, &args)?,
        Some(Command::Build(args)) => cmd_build(&ctx, &args),
        Some(Command::Search(args)) => cmd_search(&ctx, &args)?,
        Some(Command::Status(args)) => cmd_status(&ctx, &args),
        Some(Command::Completions(_)) => {}
    }

    Ok(())
}

fn cmd_repl(ctx: &Context, args: &ReplArgs) -> error::Result<()> {
    let loaded = ctx.load_index(false);
    let session = Session {
        handle: IndexHandle::new(loaded.index),
        parser: ctx.parser.clone(),
        corpus_dir: ctx.corpus_dir.clone(),
        cache_path: ctx.cache_path(),
        build_options: ctx.build_options.clone(),
        show_urls: args.show_urls,
    };

    repl::run(&session, io::stdin().lock(), io::stdout().lock())
}

fn cmd_build(ctx: &Context, args: &BuildArgs) {
    let loaded = ctx.load_index(args.force);

    match &loaded.origin {
        IndexOrigin::Cache => {
            eprintln!(
                "Index cache is up to date: {}",
                ctx.cache_path().display()
            );
        }
        IndexOrigin::Built(report) => {
            for failure in &report.failures {
                eprintln!("  Skipped {failure}");
            }
            eprintln!(
                "Indexed {} documents ({} skipped)",
                report.documents_indexed,
                report.failures.len()
            );
        }
        IndexOrigin::Unavailable => {
            eprintln!(
                "No corpus found at {}; nothing to index.",
                ctx.corpus_dir.display()
            );
        }
    }
    eprintln!(
        "{} terms, {} documents",
        loaded.index.term_count(),
        loaded.index.document_count()
    );
}

fn cmd_search(ctx: &Context, args: &SearchArgs) -> error::Result<()> {
    let loaded = ctx.load_index(false);
    let ids = search::execute_search(&ctx.parser, &loaded.index, &args.query)?;

    if args.json {
        println!("{}", search::format_json(&args.query, &ids, &loaded.index));
    } else if args.show_urls {
        let mut out = io::stdout().lock();
        search::write_with_sources(&mut out, &ids, &loaded.index)?;
    } else {
        println!("{}", search::format_ids(&ids));
    }
    Ok(())
}

fn cmd_status(ctx: &Context, args: &StatusArgs) {
    let cache_path = ctx.cache_path();
    let cache = index_cache::probe(&cache_path);
    let settings = ctx.build_options.settings();
    let index = index_cache::load(&cache_path, settings);
    let (terms, documents) = index
        .as_ref()
        .map_or((0, 0), |i| (i.term_count(), i.document_count()));
    let cache_bytes = match cache {
        CacheStatus::Present { bytes } => Some(bytes),
        CacheStatus::Missing => None,
    };

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "data_dir": ctx.data_dir.root().display().to_string(),
                "corpus_dir": ctx.corpus_dir.display().to_string(),
                "alphabet": settings.alphabet,
                "strip_markup": settings.strip_markup,
                "cache": cache_path.display().to_string(),
                "cache_bytes": cache_bytes,
                "cache_valid": index.is_some(),
                "terms": terms,
                "documents": documents,
            })
        );
    } else {
        println!("Data directory: {}", ctx.data_dir.root().display());
        println!("Corpus: {}", display_or_missing(&ctx.corpus_dir));
        println!(
            "Tokenizer: {:?}{}",
            settings.alphabet,
            if settings.strip_markup { ", markup stripped" } else { "" }
        );
        match (cache_bytes, index.is_some()) {
            (Some(bytes), true) => {
                println!("Index cache: {} ({bytes} bytes)", cache_path.display())
            }
            (Some(_), false) => println!(
                "Index cache: {} (unusable with these settings)",
                cache_path.display()
            ),
            (None, _) => println!("Index cache: none"),
        }
        println!("Terms: {terms}");
        println!("Documents: {documents}");
    }
}

fn display_or_missing(path: &Path) -> String {
    if path.is_dir() {
        path.display().to_string()
    } else {
        format!("{} (missing)", path.display())
    }
}
