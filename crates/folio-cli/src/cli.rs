use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use folio_core::codec::RestoreMode;
use folio_core::editor::Direction;
use folio_core::{BlockKind, VERSION};

/// Folio - a local catalog of project pages
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the store file
    #[arg(short, long, global = true, env = "FOLIO_STORE")]
    pub store: Option<String>,

    /// Path to the config file
    #[arg(long, global = true, env = "FOLIO_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose diagnostics on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use ASCII symbols only
    #[arg(long, global = true)]
    pub ascii: bool,
}

/// Output flags shared by read commands
#[derive(Args, Clone, Default)]
pub struct OutputArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Output format (plain, pretty, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,
}

/// Arguments for the `login` command
#[derive(Args)]
pub struct LoginArgs {
    /// Fail instead of prompting when FOLIO_SECRET is unset
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `status` command
#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Address of one project
#[derive(Args, Clone)]
pub struct ProjectRef {
    /// Category id (e.g. "minecraft")
    #[arg(value_name = "CATEGORY")]
    pub category: String,

    /// Project name or slug
    #[arg(value_name = "PROJECT")]
    pub project: String,
}

#[derive(Subcommand)]
pub enum CategorySubcommand {
    /// List categories
    List(CategoryListArgs),
    /// Add a category
    Add(CategoryAddArgs),
    /// Change a category's display name (its id stays the same)
    Rename(CategoryRenameArgs),
    /// Delete a category and all of its project pages
    Delete(CategoryDeleteArgs),
}

#[derive(Args)]
pub struct CategoryListArgs {
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct CategoryAddArgs {
    /// Display name
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(Args)]
pub struct CategoryRenameArgs {
    /// Category id
    #[arg(value_name = "CATEGORY")]
    pub category: String,

    /// New display name
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(Args)]
pub struct CategoryDeleteArgs {
    /// Category id
    #[arg(value_name = "CATEGORY")]
    pub category: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// List projects in a category
    List(ProjectListArgs),
    /// Add a project to a category
    Add(ProjectNameArgs),
    /// Remove a project and its page
    Remove(ProjectRemoveArgs),
    /// Show a project page
    Show(ProjectShowArgs),
    /// Change a project page title
    Rename(ProjectRenameArgs),
}

#[derive(Args)]
pub struct ProjectListArgs {
    /// Category id
    #[arg(value_name = "CATEGORY")]
    pub category: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct ProjectNameArgs {
    /// Category id
    #[arg(value_name = "CATEGORY")]
    pub category: String,

    /// Project display name
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(Args)]
pub struct ProjectRemoveArgs {
    #[command(flatten)]
    pub target: ProjectNameArgs,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ProjectShowArgs {
    #[command(flatten)]
    pub target: ProjectRef,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct ProjectRenameArgs {
    #[command(flatten)]
    pub target: ProjectRef,

    /// New page title
    #[arg(value_name = "TITLE")]
    pub title: String,
}

#[derive(Subcommand)]
pub enum BlockSubcommand {
    /// Insert a block
    Add(BlockAddArgs),
    /// Replace a block's text or image URL
    Edit(BlockEditArgs),
    /// Delete a block
    Delete(BlockIndexArgs),
    /// Move a block one step up or down
    Move(BlockMoveArgs),
}

#[derive(Args)]
pub struct BlockAddArgs {
    #[command(flatten)]
    pub target: ProjectRef,

    /// Block kind (text, title, image)
    #[arg(long, default_value = "text")]
    pub kind: BlockKind,

    /// Insert at this index (default: append)
    #[arg(long, value_name = "INDEX")]
    pub at: Option<usize>,

    /// Initial payload instead of the placeholder
    #[arg(long, value_name = "TEXT")]
    pub text: Option<String>,
}

#[derive(Args)]
pub struct BlockEditArgs {
    #[command(flatten)]
    pub target: ProjectRef,

    /// Block index (0-based)
    #[arg(value_name = "INDEX")]
    pub index: usize,

    /// New payload
    #[arg(value_name = "TEXT")]
    pub text: String,
}

#[derive(Args)]
pub struct BlockIndexArgs {
    #[command(flatten)]
    pub target: ProjectRef,

    /// Block index (0-based)
    #[arg(value_name = "INDEX")]
    pub index: usize,
}

#[derive(Args)]
pub struct BlockMoveArgs {
    #[command(flatten)]
    pub target: ProjectRef,

    /// Block index (0-based)
    #[arg(value_name = "INDEX")]
    pub index: usize,

    /// Direction (up, down)
    #[arg(value_name = "DIRECTION")]
    pub direction: Direction,
}

/// Arguments for the `edit` command
#[derive(Args)]
pub struct EditArgs {
    #[command(flatten)]
    pub target: ProjectRef,
}

#[derive(Subcommand)]
pub enum ExportSubcommand {
    /// Export one project page
    Project(ExportProjectArgs),
    /// Export the category list
    Catalog(ExportDestArgs),
    /// Export every project page
    All(ExportAllArgs),
}

#[derive(Args)]
pub struct ExportDestArgs {
    /// Directory to write the file into
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub dir: String,

    /// Print the envelope to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

#[derive(Args)]
pub struct ExportProjectArgs {
    #[command(flatten)]
    pub target: ProjectRef,

    #[command(flatten)]
    pub dest: ExportDestArgs,
}

#[derive(Args)]
pub struct ExportAllArgs {
    /// Include the category list (full backup)
    #[arg(long)]
    pub include_categories: bool,

    #[command(flatten)]
    pub dest: ExportDestArgs,
}

/// Restore strategy for bulk imports
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ImportMode {
    /// Replace stored pages with the file's pages
    #[default]
    Replace,
    /// Keep stored pages and add or overwrite the file's pages
    Merge,
}

impl From<ImportMode> for RestoreMode {
    fn from(mode: ImportMode) -> Self {
        match mode {
            ImportMode::Replace => RestoreMode::Replace,
            ImportMode::Merge => RestoreMode::Merge,
        }
    }
}

/// Arguments for the `import` command
#[derive(Args)]
pub struct ImportArgs {
    /// Envelope file to import
    #[arg(value_name = "FILE", required_unless_present = "dir")]
    pub file: Option<String>,

    /// Import every `<category>_<project>.json` export in this folder
    #[arg(long, value_name = "DIR", conflicts_with_all = ["file", "into"])]
    pub dir: Option<String>,

    /// Restore strategy for multi-project files
    #[arg(long, value_enum, default_value_t = ImportMode::Replace)]
    pub mode: ImportMode,

    /// Load the file into this project's page instead of its own address
    #[arg(long, num_args = 2, value_names = ["CATEGORY", "PROJECT"])]
    pub into: Option<Vec<String>>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum SecretSubcommand {
    /// Store a local secret override
    Set(SecretSetArgs),
}

#[derive(Args)]
pub struct SecretSetArgs {
    /// New secret (prompted with confirmation when omitted)
    #[arg(value_name = "SECRET")]
    pub value: Option<String>,

    /// Fail instead of prompting when no secret is given
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open an editing session
    Login(LoginArgs),

    /// End the editing session
    Logout,

    /// Show session and store status
    Status(StatusArgs),

    /// Manage categories
    #[command(subcommand)]
    Category(CategorySubcommand),

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectSubcommand),

    /// Edit project page blocks
    #[command(subcommand)]
    Block(BlockSubcommand),

    /// Edit a project page interactively with autosave
    Edit(EditArgs),

    /// Export pages to JSON files
    #[command(subcommand)]
    Export(ExportSubcommand),

    /// Import a JSON export
    Import(ImportArgs),

    /// Manage the shared secret
    #[command(subcommand)]
    Secret(SecretSubcommand),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
