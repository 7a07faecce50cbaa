//! ai-workflow - Structured AI workflow runner
//!
//! This is the main entry point for the ai-workflow binary. It loads
//! configuration, wires a model backend into the workflow controller and
//! prints validated results as JSON on stdout.

mod cli;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ai_workflow::backend::{MockBackend, ModelBackend, OpenAiBackend, OpenAiConfig};
use ai_workflow::config::{self, WorkflowConfig};
use ai_workflow::error::{Error, Result};
use ai_workflow::logging;
use ai_workflow::persona::{PersonaRegistry, AUDIT, COMMUNITY, DOC_MANAGER, KNOWLEDGE};
use ai_workflow::schema::{SchemaCatalog, SchemaContract, SchemaKind, StructuralSchema};
use ai_workflow::workflow::{AgentInvoker, RetryPolicy, WorkflowController, WorkflowRequest};

use crate::cli::{Cli, Commands, ConfigSubcommand, PersonaSubcommand, RunArgs, SchemaSubcommand};

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Config { subcommand } => {
            // Config commands use minimal logging
            logging::init_simple(tracing::Level::WARN)?;
            handle_config_command(subcommand, cli.config.as_deref())
        }
        Commands::Schema { subcommand } => handle_schema_command(subcommand),
        Commands::Persona { subcommand } => {
            let config = WorkflowConfig::load(cli.config.as_deref())?;
            handle_persona_command(subcommand, &config)
        }
        Commands::Run(args) => {
            let config = WorkflowConfig::load(cli.config.as_deref())?;

            // The guards must be kept alive for the lifetime of the program
            let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

            info!(version = env!("CARGO_PKG_VERSION"), "Starting ai-workflow");
            run_workflow(args, config)
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Run
// ─────────────────────────────────────────────────────────────────

fn run_workflow(args: RunArgs, config: WorkflowConfig) -> Result<()> {
    let input = read_input(&args)?;
    let kind = match args.schema.or_else(|| SchemaKind::for_workflow(&args.workflow)) {
        Some(kind) => kind,
        None => {
            return Err(Error::Config(format!(
                "Workflow '{}' has no default schema; pass --schema",
                args.workflow
            )))
        }
    };

    let backend: Arc<dyn ModelBackend> = match args.mock_response {
        Some(ref path) => {
            warn!(path = %path.display(), "Using mock response instead of the model service");
            Arc::new(MockBackend::from_file(path)?)
        }
        None => Arc::new(OpenAiBackend::new(OpenAiConfig::from(&config.model))?),
    };

    let personas = Arc::new(PersonaRegistry::from_settings(&config.personas));
    let invoker = AgentInvoker::new(backend, config.invoker_settings());
    let controller =
        WorkflowController::new(personas, invoker, RetryPolicy::from_settings(&config.retry));

    let timeout_ms = args.timeout_ms.unwrap_or(config.retry.timeout_ms);
    let max_retries = args.max_retries.unwrap_or(config.retry.max_retries);

    debug!(
        workflow = %args.workflow,
        schema = %kind,
        timeout_ms,
        max_retries,
        "Workflow request prepared"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("ai-workflow")
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    let catalog = SchemaCatalog::load()?;
    let cancel = CancellationToken::new();

    let output = runtime.block_on(async {
        let watcher = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, cancelling workflow run");
                watcher.cancel();
            }
        });

        let job = Job {
            controller: &controller,
            workflow_id: &args.workflow,
            input: &input,
            timeout_ms,
            max_retries,
            pretty: args.pretty,
            cancel: &cancel,
        };

        match kind {
            SchemaKind::Document => job.execute(catalog.document.clone()).await,
            SchemaKind::Audit => job.execute(catalog.audit.clone()).await,
            SchemaKind::Knowledge => job.execute(catalog.knowledge.clone()).await,
            SchemaKind::Community => job.execute(catalog.community.clone()).await,
        }
    })?;

    println!("{}", output);
    Ok(())
}

/// One CLI workflow run, independent of the output type
struct Job<'a> {
    controller: &'a WorkflowController,
    workflow_id: &'a str,
    input: &'a str,
    timeout_ms: u64,
    max_retries: u32,
    pretty: bool,
    cancel: &'a CancellationToken,
}

impl Job<'_> {
    async fn execute<T: SchemaContract>(&self, schema: Arc<StructuralSchema<T>>) -> Result<String> {
        let request = WorkflowRequest::new(self.workflow_id, self.input, schema)
            .with_timeout_ms(self.timeout_ms)
            .with_max_retries(self.max_retries);

        let result = self.controller.run_with_cancel(request, self.cancel).await?;
        info!(attempts = result.attempts, "Workflow completed");

        if self.pretty {
            Ok(serde_json::to_string_pretty(&result.parsed)?)
        } else {
            Ok(result.raw)
        }
    }
}

fn read_input(args: &RunArgs) -> Result<String> {
    match (&args.input, &args.input_file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => read_file(path),
        (None, None) => Err(Error::Config("No input given; pass --input or --input-file".into())),
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::IoRead {
        path: path.to_path_buf(),
        source: e,
    })
}

// ─────────────────────────────────────────────────────────────────
// Inspection commands
// ─────────────────────────────────────────────────────────────────

/// Handle persona subcommands
fn handle_persona_command(subcommand: PersonaSubcommand, config: &WorkflowConfig) -> Result<()> {
    let registry = PersonaRegistry::from_settings(&config.personas);

    match subcommand {
        PersonaSubcommand::List => {
            println!("{:<16} PERSONA", "WORKFLOW");
            for binding in registry.bindings() {
                println!("{:<16} {}", binding.workflow_id, binding.persona.display_name);
            }
            println!("{:<16} {}", "(fallback)", registry.fallback().display_name);
        }
        PersonaSubcommand::Resolve { workflow } => {
            let persona = registry.resolve(&workflow);
            let source = if registry.is_bound(&workflow) {
                "bound"
            } else {
                "fallback"
            };
            println!("Workflow:  {}", workflow);
            println!("Persona:   {} ({})", persona.display_name, source);
            println!();
            println!("{}", persona.system_prompt());
        }
    }

    Ok(())
}

/// Handle schema subcommands
fn handle_schema_command(subcommand: SchemaSubcommand) -> Result<()> {
    let catalog = SchemaCatalog::load()?;

    match subcommand {
        SchemaSubcommand::Show { kind } => {
            println!("{}", serde_json::to_string_pretty(catalog.definition(kind))?);
        }
        SchemaSubcommand::List => {
            for kind in SchemaKind::all() {
                let workflows: Vec<&str> = [DOC_MANAGER, AUDIT, KNOWLEDGE, COMMUNITY]
                    .into_iter()
                    .filter(|id| SchemaKind::for_workflow(id) == Some(*kind))
                    .collect();
                println!("{:<12} {}", kind, workflows.join(", "));
            }
        }
    }

    Ok(())
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: ConfigSubcommand, config_path: Option<&str>) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let cfg = WorkflowConfig::load(config_path)?;
            println!("{}", toml::to_string_pretty(&cfg.redacted())?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration file created: {}", written.display());
        }
        ConfigSubcommand::Validate => {
            let cfg = WorkflowConfig::load(config_path)?;
            println!("Configuration is valid.");
            if cfg.api_key().is_none() {
                println!("Note: no API key configured; set AI_WORKFLOW_API_KEY before running workflows.");
            }
        }
    }

    Ok(())
}
