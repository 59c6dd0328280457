use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::tokenizer::Alphabet;

#[derive(Debug, Parser)]
#[command(
    name = "boolsearch",
    about = "Boolean keyword search over a crawled document corpus"
)]
pub struct Cli {
    /// Override the XDG data directory holding the index cache
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory with the crawler's index.txt and <id>.txt files
    #[arg(long, global = true)]
    pub corpus: Option<PathBuf>,

    /// Letters that make up index terms
    #[arg(long, value_enum, default_value_t = Alphabet::Cyrillic, global = true)]
    pub alphabet: Alphabet,

    /// Corpus files are page source; strip markup before indexing
    #[arg(long, global = true)]
    pub html: bool,

    /// Use AND/OR instead of И/ИЛИ as query operators
    #[arg(long, global = true)]
    pub english_operators: bool,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Answer queries read from stdin, one per line (default)
    Repl(ReplArgs),
    /// Build the index, or reuse the cached one
    Build(BuildArgs),
    /// Run a single query
    Search(SearchArgs),
    /// Show data directory and index statistics
    Status(StatusArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Repl --

#[derive(Debug, Default, Parser)]
pub struct ReplArgs {
    /// Print the source URL of every match
    #[arg(long)]
    pub show_urls: bool,
}

// -- Build --

#[derive(Debug, Parser)]
pub struct BuildArgs {
    /// Ignore the cache and rebuild from the corpus
    #[arg(short, long)]
    pub force: bool,
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The boolean query, e.g. "кот И !мышь"
    pub query: String,

    /// Print the source URL of every match
    #[arg(long)]
    pub show_urls: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Status --

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "boolsearch",
            &mut std::io::stdout(),
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn no_subcommand_means_repl() {
        let cli = Cli::parse_from(["boolsearch"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.alphabet, Alphabet::Cyrillic);
        assert!(!cli.html);
    }

    #[test]
    fn parse_search_with_global_flags() {
        let cli = Cli::parse_from([
            "boolsearch",
            "search",
            "кот И !мышь",
            "--corpus",
            "/srv/pages",
            "--alphabet",
            "latin",
            "-vv",
        ]);
        assert_eq!(cli.corpus, Some(PathBuf::from("/srv/pages")));
        assert_eq!(cli.alphabet, Alphabet::Latin);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Command::Search(args)) => {
                assert_eq!(args.query, "кот И !мышь");
                assert!(!args.json);
                assert!(!args.show_urls);
            }
            other => panic!("expected search command, got {other:?}"),
        }
    }

    #[test]
    fn parse_build_force() {
        let cli = Cli::parse_from(["boolsearch", "build", "--force"]);
        assert!(matches!(
            cli.command,
            Some(Command::Build(BuildArgs { force: true }))
        ));
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
