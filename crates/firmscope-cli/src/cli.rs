//! CLI argument definitions for Firmscope.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `profile` | Aggregate a full company profile from every source |
//! | `extract` | Run the field extractor over local text |
//! | `sources` | List registered sources and their merge priority |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings/errors as failures (exit 5) |
//! | `--mock` | `false` | Offline mode with deterministic data |
//! | `--source` | `all` | Restrict collection to one source |
//! | `--timeout-ms` | `45000` | Per-source time budget |
//! | `--quiet` | `false` | Suppress progress output on stderr |
//!
//! # Examples
//!
//! ```bash
//! # Aggregate a profile
//! firmscope profile "Acme Corp" --pretty
//!
//! # Offline run with deterministic data
//! firmscope profile Acme --mock
//!
//! # Only consult the funding database
//! firmscope profile Acme --source crunchbase
//!
//! # Extract facts from saved text
//! firmscope extract notes.txt --hint funding --hint leadership
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use firmscope_core::{FieldKind, SourceId};

/// 🔍 Firmscope - Multi-source company profiling CLI
///
/// Collect company facts from several independent web sources (funding
/// database, professional network, web search, direct-site fallback), merge
/// them with a deterministic priority policy, and derive secondary metrics.
#[derive(Debug, Parser)]
#[command(
    name = "firmscope",
    author,
    version,
    about = "Multi-source company profiling CLI",
    long_about = "Firmscope assembles a company profile from several independent, unreliable \
web data sources. Features include:\n\
\n\
  • Per-source collectors with pacing, bounded retry, and timeouts\n\
  • Deterministic priority-ordered merge of conflicting values\n\
  • Derived metrics (company age, funding stage, employee size)\n\
  • Structured JSON output with run metadata\n\
\n\
Use 'firmscope <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    ///
    /// Useful for CI pipelines that need every source to answer.
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Offline mode: collectors return deterministic data, no network I/O.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Restrict collection to a single source.
    #[arg(long, global = true, value_enum, default_value_t = SourceSelector::All)]
    pub source: SourceSelector,

    /// Per-source time budget in milliseconds.
    #[arg(long, global = true, default_value_t = 45_000)]
    pub timeout_ms: u64,

    /// Suppress progress output on stderr.
    #[arg(long, global = true, default_value_t = false)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Source restriction for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    /// Consult every registered source.
    All,
    /// Funding database only.
    Crunchbase,
    /// Professional network only.
    Linkedin,
    /// General web search only.
    Websearch,
    /// Direct-site fallback only.
    Directweb,
}

impl SourceSelector {
    pub fn only(self) -> Option<SourceId> {
        match self {
            Self::All => None,
            Self::Crunchbase => Some(SourceId::Crunchbase),
            Self::Linkedin => Some(SourceId::Linkedin),
            Self::Websearch => Some(SourceId::Websearch),
            Self::Directweb => Some(SourceId::Directweb),
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// 🏢 Aggregate a full company profile.
    ///
    /// Runs every registered source collector once, merges the partial
    /// records, computes derived metrics, and prints the profile with run
    /// metadata. Per-source failures are reported in the envelope's errors
    /// without failing the run.
    ///
    /// # Examples
    ///
    ///   firmscope profile "Acme Corp"
    ///   firmscope profile Acme --mock --pretty
    ///   firmscope profile Acme --source linkedin
    Profile(ProfileArgs),

    /// 📄 Extract typed facts from local text.
    ///
    /// Runs the pure field extractor over a file (or stdin with `-`),
    /// optionally hinted at the field families to look for.
    ///
    /// # Examples
    ///
    ///   firmscope extract notes.txt
    ///   cat article.txt | firmscope extract - --hint funding
    Extract(ExtractArgs),

    /// 🔌 List registered sources and their merge priority.
    Sources(SourcesArgs),
}

/// Arguments for the `profile` command.
#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Company name to profile (arbitrary text, must be non-empty).
    pub company: String,
}

/// Arguments for the `extract` command.
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Path to a text file, or `-` for stdin.
    pub input: String,

    /// Field families to look for; repeatable. Omit to extract everything.
    #[arg(long, value_enum)]
    pub hint: Vec<HintArg>,
}

/// Field-family hint accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HintArg {
    Funding,
    Leadership,
    Financials,
    Headcount,
    Profile,
}

impl From<HintArg> for FieldKind {
    fn from(value: HintArg) -> Self {
        match value {
            HintArg::Funding => FieldKind::Funding,
            HintArg::Leadership => FieldKind::Leadership,
            HintArg::Financials => FieldKind::Financials,
            HintArg::Headcount => FieldKind::Headcount,
            HintArg::Profile => FieldKind::Profile,
        }
    }
}

/// Arguments for the `sources` command.
#[derive(Debug, Args)]
pub struct SourcesArgs {
    /// Include the role description for each source.
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}
