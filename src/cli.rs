use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::search::DEFAULT_TOP_K;

#[derive(Debug, Parser)]
#[command(
    name = "helpdesk",
    about = "Search a local support knowledge base"
)]
pub struct Cli {
    /// Override the knowledge-base directory
    #[arg(long, global = true)]
    pub kb_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rank knowledge-base passages against a question
    Search(SearchArgs),
    /// List indexed documents
    List(ListArgs),
    /// Print the passages of one document
    Get(GetArgs),
    /// Show knowledge-base status and statistics
    Status(StatusArgs),
    /// Start MCP server for AI agent integration
    Mcp,
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The question to search for
    pub query: String,

    /// Maximum number of passages to return
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_K)]
    pub count: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// -- List --

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Only list filenames matching this glob
    #[arg(long)]
    pub pattern: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Get --

#[derive(Debug, Parser)]
pub struct GetArgs {
    /// Filename of the document (e.g. pricing.md)
    pub filename: String,

    /// Output as JSON
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
            "helpdesk",
            &mut std::io::stdout(),
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parse_search_defaults() {
        let cli = Cli::parse_from(["helpdesk", "search", "refund policy"]);
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.query, "refund policy");
                assert_eq!(args.count, DEFAULT_TOP_K);
                assert!(!args.json);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "helpdesk", "list", "--kb-dir", "/tmp/kb", "-vv", "--pattern", "*.md",
        ]);
        assert_eq!(cli.kb_dir, Some(PathBuf::from("/tmp/kb")));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::List(args) => {
                assert_eq!(args.pattern.as_deref(), Some("*.md"));
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
