//! CLI argument parsing.
//!
//! `serve` runs the MCP server; the other commands perform a single call and
//! print its JSON result, which is handy for checking an engine by hand.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cyberchef-mcp",
    version,
    about = "MCP server for the CyberChef recipe baking API",
    after_help = "Examples:\n  cyberchef-mcp serve\n  cyberchef-mcp bake --input 68656c6c6f --recipe '[{\"op\": \"From Hex\"}]'\n  cyberchef-mcp batch-bake --input a --input b --recipe '[{\"op\": \"To Upper case\"}]'\n  cyberchef-mcp magic --input SGVsbG8= --depth 4\n  cyberchef-mcp operations --category 'Data format'",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Engine base URL (overrides CYBERCHEF_API_URL)
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Operation catalog JSON to use instead of the built-in one
    #[arg(long, value_name = "PATH", global = true)]
    pub catalog: Option<PathBuf>,

    /// Emit debug logs on stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the MCP server on stdio
    Serve,
    Bake(BakeArgs),
    BatchBake(BatchBakeArgs),
    Magic(MagicArgs),
    /// List operation categories
    Categories,
    Operations(OperationsArgs),
}

#[derive(Parser, Debug)]
#[command(about = "Run a recipe against one input")]
pub struct BakeArgs {
    /// Input data
    #[arg(long, value_name = "TEXT")]
    pub input: String,

    /// Recipe as JSON, e.g. '[{"op": "From Hex"}]'
    #[arg(long, value_name = "JSON")]
    pub recipe: String,
}

#[derive(Parser, Debug)]
#[command(about = "Run a recipe against several inputs")]
pub struct BatchBakeArgs {
    /// Input data; repeat for each batch item
    #[arg(long = "input", value_name = "TEXT", required = true)]
    pub inputs: Vec<String>,

    /// Recipe as JSON, e.g. '[{"op": "To Upper case"}]'
    #[arg(long, value_name = "JSON")]
    pub recipe: String,
}

#[derive(Parser, Debug)]
#[command(about = "Detect how the input is encoded")]
pub struct MagicArgs {
    /// Input data
    #[arg(long, value_name = "TEXT")]
    pub input: String,

    /// Levels of recursion to attempt
    #[arg(long, default_value_t = 3)]
    pub depth: u32,

    /// Run additional operations (much slower)
    #[arg(long)]
    pub intensive_mode: bool,

    /// Consider all supported languages
    #[arg(long)]
    pub extensive_language_support: bool,

    /// Known plaintext string or regex
    #[arg(long, value_name = "TEXT", default_value = "")]
    pub crib: String,
}

#[derive(Parser, Debug)]
#[command(about = "List operations in a category")]
pub struct OperationsArgs {
    /// Category name, e.g. "Data format"
    #[arg(long, value_name = "NAME")]
    pub category: String,
}
