//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for ai-workflow.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ai_workflow::schema::SchemaKind;

/// ai-workflow - Structured AI workflow runner
///
/// Sends a request to a generative model under a workflow persona, validates
/// the answer against a strict schema, and retries transient failures.
#[derive(Parser, Debug)]
#[command(name = "ai-workflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "AI_WORKFLOW_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a workflow and print the validated result as JSON
    Run(RunArgs),

    /// Inspect workflow personas
    Persona {
        #[command(subcommand)]
        subcommand: PersonaSubcommand,
    },

    /// Inspect output schemas
    Schema {
        #[command(subcommand)]
        subcommand: SchemaSubcommand,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Arguments for `run`
#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Workflow id (doc-manager, audit, knowledge, community, or any other)
    #[arg(short, long)]
    pub workflow: String,

    /// Request text
    #[arg(short, long, conflicts_with = "input_file", required_unless_present = "input_file")]
    pub input: Option<String>,

    /// Read the request text from a file
    #[arg(long)]
    pub input_file: Option<PathBuf>,

    /// Output schema (defaults to the workflow's own schema)
    #[arg(short, long)]
    pub schema: Option<SchemaKind>,

    /// Per-attempt time limit in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Retries after the first attempt
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Answer from this file instead of calling the model service
    #[arg(long)]
    pub mock_response: Option<PathBuf>,

    /// Pretty-print the result
    #[arg(long)]
    pub pretty: bool,
}

/// Persona subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PersonaSubcommand {
    /// List bound workflows and the fallback persona
    List,

    /// Show the persona a workflow id resolves to
    Resolve {
        /// Workflow id
        workflow: String,
    },
}

/// Schema subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SchemaSubcommand {
    /// Print the JSON Schema for a kind
    Show {
        /// Schema kind: document, audit, knowledge, community
        kind: SchemaKind,
    },

    /// List schema kinds and the workflows that use them by default
    List,
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration (API key masked)
    Show,

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate,
}
