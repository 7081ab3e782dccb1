//! CLI command definitions and argument parsing

use clap::Parser;
use clap::Subcommand;

use crate::rag::GenerationMode;

#[derive(Parser)]
#[command(name = "agrisense")]
#[command(about = "AgriSense farming assistant: chat API, one-shot questions and data loading")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Disable CORS
        #[arg(long)]
        no_cors: bool,
    },
    /// Answer one question and print the JSON response
    Ask {
        /// JSON payload: {"message": ..., "language": ..., "farmer_profile": {...}}
        payload: Option<String>,
        /// Question text, used instead of a JSON payload
        #[arg(short, long, conflicts_with = "payload")]
        message: Option<String>,
        /// Answer language when using --message (english, hindi, punjabi)
        #[arg(short, long, default_value = "english")]
        language: String,
        /// Generation mode (default: from config)
        #[arg(long, value_enum)]
        mode: Option<GenerationMode>,
    },
    /// Load farmer profiles into the context collection
    Populate {
        /// Path to a JSON array of farmer profiles
        #[arg(default_value = "data/farmers.json")]
        file: String,
    },
    /// Store a question and answer pair for future cache hits
    Remember {
        /// The question as the farmer asked it
        question: String,
        /// The answer to return for similar questions
        answer: String,
        /// Farmer id recorded with the interaction
        #[arg(long)]
        farmer_id: Option<String>,
        /// Farmer location recorded with the interaction
        #[arg(long)]
        location: Option<String>,
    },
    /// Show collection statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show current configuration
    Config,
}
