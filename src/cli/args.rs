use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "daybook", version, author, about = "A daily journal with streaks and writing prompts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// First-run setup wizard (name, profile id, prompt carousel)
    Setup {
        /// Reset existing configuration
        #[arg(long)]
        reset: bool,
    },
    /// Write a new journal entry
    New {
        /// Entry text
        content: String,
        #[arg(long)]
        title: Option<String>,
        /// Mood: very-sad, sad, neutral, happy, very-happy
        #[arg(long, default_value = "neutral")]
        mood: String,
        /// Category id or title
        #[arg(long)]
        category: Option<String>,
        /// Attach an image (repeatable)
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    /// List entries grouped by day
    List {
        /// Only show the most recent N entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show a single entry
    Show {
        id: String,
    },
    /// Edit an entry
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        mood: Option<String>,
        /// Category id or title; "none" clears it
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete an entry
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show current and longest streak
    Streak,
    /// Draw writing prompts, weighted
    Prompt {
        /// How many prompts to draw
        #[arg(long, default_value = "1")]
        count: usize,
        /// Only draw from prompts with this tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// Daily prompt management
    Prompts {
        #[command(subcommand)]
        action: PromptCommands,
    },
    /// Category management
    Categories {
        #[command(subcommand)]
        action: CategoryCommands,
    },
    /// Export all entries to stdout
    Export {
        /// JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum PromptCommands {
    /// List prompts
    List {
        /// Include inactive prompts
        #[arg(long)]
        all: bool,
    },
    /// Show a prompt
    Show {
        id: String,
    },
    /// Add a prompt
    Add {
        title: String,
        /// The question itself
        prompt: String,
        #[arg(long)]
        emoji: Option<String>,
        /// Category id or title
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        mood: Option<String>,
        /// Relative weight (default 1)
        #[arg(long)]
        weight: Option<f64>,
        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Activate or deactivate a prompt
    Toggle {
        id: String,
        /// Deactivate instead of activate
        #[arg(long)]
        off: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// List categories
    List,
    /// Add a category
    Add {
        title: String,
        /// Hex color, e.g. #22c55e
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename or recolor a category
    Update {
        /// Category id or title
        category: String,
        #[arg(long)]
        title: Option<String>,
        /// New color; "none" clears it
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a category (entries keep existing, uncategorized)
    Delete {
        /// Category id or title
        category: String,
    },
}
