use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

use quiver::Category;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "quiver",
    about = "Tiered registry of agent definitions",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/quiver/logs/quiver.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to quiver.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List resolved agents
    List {
        /// Only agents in this category
        #[arg(long)]
        category: Option<Category>,

        /// Only agents installed in the global or local tier
        #[arg(long, conflicts_with = "available")]
        installed: bool,

        /// Only agents not yet installed
        #[arg(long)]
        available: bool,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show one resolved agent
    Show {
        /// Agent name
        name: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Install an agent into the global (or local) tier
    Install {
        /// Agent name
        name: String,

        /// Install into the project-local tier
        #[arg(long)]
        local: bool,

        /// Reinstall over an existing copy
        #[arg(long)]
        force: bool,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Remove the installed copy of an agent
    Uninstall {
        /// Agent name
        name: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Update an installed agent to the newest available version
    Update {
        /// Agent name
        name: String,

        /// Rewrite even when no newer version is offered
        #[arg(long)]
        force: bool,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Search agents by name, description, tags, and keywords
    Search {
        /// Whitespace-separated terms; all must match
        query: String,

        /// Only agents in this category
        #[arg(long)]
        category: Option<Category>,

        /// Only agents carrying any of these tags
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Maximum number of results
        #[arg(long, default_value_t = quiver::registry::search::DEFAULT_LIMIT)]
        limit: usize,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Validate an agent definition file
    Validate {
        /// Path to the Markdown file
        path: PathBuf,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// List retained backups
    Backups {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Restore a directory from a backup
    Restore {
        /// Backup id (see `quiver backups`)
        id: String,
    },

    /// Show the category catalog
    Catalog {
        /// Report where the catalog and agents disagree
        #[arg(long)]
        check: bool,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
