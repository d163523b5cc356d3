use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quill")]
#[command(version)]
#[command(about = "Sign in to Microsoft Graph, send mail, upload files and explore the API")]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  quill login                           Open the Microsoft sign-in page
  quill complete-login <redirect-url>   Finish sign-in with the redirect URL
  quill whoami                          Show the signed-in user
  quill send-mail                       Send yourself the welcome message
  quill upload ./notes.docx             Upload a file to OneDrive")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding config.toml (defaults to the platform config dir)
    #[arg(long, global = true, env = "QUILL_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Print sign-in URLs instead of opening them in the browser
    #[arg(long, global = true)]
    pub no_browser: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Graph(GraphCommand),

    /// Run a document operation against a local text file
    Doc {
        #[arg(value_enum)]
        action: DocAction,
        /// Text file standing in for the document body
        file: PathBuf,
        /// Text to select before running the operation (whole body by default)
        #[arg(short, long)]
        select: Option<String>,
    },

    /// Open the sign-in page in a dialog, or replay a dialog event
    Dialog {
        /// Lifecycle code reported by the host (12002-12007)
        #[arg(long, conflicts_with = "message")]
        code: Option<i32>,
        /// Message posted by the dialog page
        #[arg(long)]
        message: Option<String>,
    },
}

/// Commands that need the signed-in session.
#[derive(Subcommand)]
pub enum GraphCommand {
    /// Start an interactive sign-in
    Login,

    /// Finish sign-in with the URL the browser was redirected to
    CompleteLogin {
        /// Full redirect URL, including `code` and `state`
        url: String,
    },

    /// Sign out and forget the cached session and profile
    Logout,

    /// Show the signed-in user's profile
    Whoami,

    /// Send the welcome message to the signed-in user
    SendMail,

    /// Upload a file to the configured OneDrive folder
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  quill upload                  Upload the built-in sample document
  quill upload ./report.docx    Upload a local file")]
    Upload {
        /// File to upload; the built-in sample document when omitted
        path: Option<PathBuf>,
    },

    /// POST a body to a Microsoft Graph URL
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  quill explore https://graph.microsoft.com/v1.0/me/events '{\"subject\":\"Sync\"}'")]
    Explore {
        /// Absolute Graph URL or a path relative to the configured base URL
        url: String,
        /// JSON request body; sent without a body when omitted
        body: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DocAction {
    /// Replace the body with the sample text
    Sample,
    /// Bold and highlight the longest word in the selection
    Highlight,
    /// Show the selected text
    Selection,
}
