use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "sol", about = concat!("sol v", env!("CARGO_PKG_VERSION"), " - todo.txt lists and source comment scanning"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use a configuration file other than the default
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Task file to work on (default: `todo_file` from the config)
    #[arg(short = 'f', long, global = true)]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List open and completed tasks, optionally filtered by terms
    #[command(alias = "ls")]
    List(ListArgs),
    /// List completed tasks
    #[command(alias = "listdone")]
    Done,
    /// List prioritized tasks, optionally limited to a letter class like `A-C`
    #[command(aliases = ["listpriority", "lsp"])]
    Listpri(ListPriArgs),
    /// Add a task
    Add(AddArgs),
    /// Mark tasks complete
    #[command(aliases = ["do", "tick"])]
    Check(IndexArgs),
    /// Mark tasks open again
    #[command(alias = "untick")]
    Uncheck(IndexArgs),
    /// Flip tasks between open and complete
    Toggle(IndexArgs),
    /// Set a task's priority
    #[command(alias = "priority")]
    Pri(PriArgs),
    /// Remove the priority of tasks
    #[command(aliases = ["deprioritize", "dp"])]
    Depri(IndexArgs),
    /// Delete tasks
    #[command(aliases = ["remove", "delete", "del"])]
    Rm(IndexArgs),
    /// Add text to the end of a task
    Append(TextArgs),
    /// Add text to the start of a task
    Prepend(TextArgs),
    /// Replace a task with a new line
    Replace(TextArgs),
    /// Sort the task file
    #[command(alias = "order")]
    Sort,
    /// Remove duplicate tasks
    #[command(alias = "deduplicate")]
    Dedup,
    /// Find tasks by message, priority, context, project or keyword
    #[command(alias = "filter")]
    Search(SearchArgs),
    /// List context tags in use
    #[command(alias = "lsc")]
    Contexts,
    /// List project tags in use
    #[command(alias = "lsprj")]
    Projects,
    /// Scan a source tree for TODO-style comments
    Scan(ScanArgs),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args, Default)]
pub struct ListArgs {
    /// Terms every listed task must contain; `/term` excludes, `a/b` means either
    pub terms: Vec<String>,
}

#[derive(Args)]
pub struct ListPriArgs {
    /// Priority letters and ranges, e.g. `A`, `AB` or `A-C` (default: any)
    pub priorities: Option<String>,
    /// Terms every listed task must contain, as for `list`
    pub terms: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SearchTarget {
    #[value(alias = "msg")]
    Message,
    Priority,
    Context,
    Project,
    Keyword,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for (`key:value` for keywords)
    pub query: String,
    /// Field to search
    #[arg(long = "by", value_enum, default_value_t = SearchTarget::Message)]
    pub target: SearchTarget,
    /// Require an exact match instead of a substring
    #[arg(long)]
    pub strict: bool,
    /// Compare case-sensitively
    #[arg(long = "case-sensitive", short = 's')]
    pub case_sensitive: bool,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// The task line, e.g. `(A) Call mom @phone`
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
    /// Stamp today's date as the creation date
    #[arg(short = 't', long)]
    pub date: bool,
    /// Insert at this position instead of appending
    #[arg(short, long)]
    pub index: Option<usize>,
}

#[derive(Args)]
pub struct IndexArgs {
    /// Task numbers as shown by `list`
    #[arg(required = true, num_args = 1..)]
    pub indices: Vec<usize>,
}

#[derive(Args)]
pub struct PriArgs {
    /// Task number as shown by `list`
    pub index: usize,
    /// Priority letter A-Z
    pub priority: String,
}

#[derive(Args)]
pub struct TextArgs {
    /// Task number as shown by `list`
    pub index: usize,
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

// ---------------------------------------------------------------------------
// Scan args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ScanArgs {
    /// Root of the tree to scan (default: current directory)
    pub path: Option<PathBuf>,
    /// Use this profile instead of detecting one
    #[arg(short, long)]
    pub profile: Option<String>,
    /// Merge the results into this task file instead of printing them
    #[arg(long)]
    pub into: Option<PathBuf>,
}
