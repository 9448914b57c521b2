// ABOUTME: Entry point for the hrdesk binary.
// ABOUTME: Parses CLI arguments, initializes tracing, builds the orchestration graph, and serves or answers once.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use hrdesk_agent::{DeskBuilder, Graph, LlmClient, RouterKind, create_llm_client};
use hrdesk_server::{AppState, HrdeskConfig, create_router};
use hrdesk_store::{EmployeeDirectory, LogTransport, PolicyIndex};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "hrdesk=debug,tower_http=debug";

#[derive(Debug, Parser)]
#[command(name = "hrdesk", version, about = "HR help desk backed by a supervisor and three LLM workers")]
struct Cli {
    /// LLM provider: groq, openai, or anthropic. Overrides HRDESK_PROVIDER.
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Model name. Overrides HRDESK_MODEL.
    #[arg(long, global = true)]
    model: Option<String>,

    /// Routing strategy: llm or rules. Overrides HRDESK_ROUTER.
    #[arg(long, global = true)]
    router: Option<RouterKind>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (the default).
    Serve {
        /// Socket address to bind. Overrides HRDESK_BIND.
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Answer a single message and exit.
    Ask {
        message: String,

        /// Print the full turn outcome as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    let mut config = HrdeskConfig::from_env()?;
    if let Some(provider) = cli.provider {
        config.provider = provider.to_ascii_lowercase();
    }
    if let Some(model) = cli.model {
        config.model = Some(model);
    }
    if let Some(router) = cli.router {
        config.router = router;
    }

    let (client, model) = create_llm_client(&config.provider, config.model.as_deref())?;
    let graph = Arc::new(build_graph(&config, client)?);

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or(config.bind);
            let state = Arc::new(AppState::new(
                graph,
                config.provider.clone(),
                model.clone(),
                config.router,
            ));
            let app = create_router(state);

            let listener = tokio::net::TcpListener::bind(bind)
                .await
                .with_context(|| format!("failed to bind {}", bind))?;
            tracing::info!(
                %bind,
                provider = %config.provider,
                %model,
                router = %config.router,
                "hrdesk listening"
            );
            axum::serve(listener, app).await?;
        }
        Command::Ask { message, json } => {
            let outcome = graph.invoke(message, None).await?;
            if json {
                let path: Vec<String> = outcome.path.iter().map(|n| n.to_string()).collect();
                let report = serde_json::json!({
                    "turn_id": outcome.state.turn_id().to_string(),
                    "response": outcome.answer,
                    "path": path,
                    "supervisor_evaluations": outcome.supervisor_evaluations,
                    "worker_executions": outcome.worker_executions,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", outcome.answer);
            }
        }
    }

    Ok(())
}

/// Load the data sources named by `config` and wire them into a graph.
///
/// A missing policy document is a startup failure.
fn build_graph(config: &HrdeskConfig, client: Arc<dyn LlmClient>) -> anyhow::Result<Graph> {
    let policy_index = PolicyIndex::from_path(&config.policy_path)
        .context("the leave policy document is required at startup")?;
    tracing::info!(
        path = %config.policy_path.display(),
        chunks = policy_index.len(),
        "policy index ready"
    );

    let directory = match &config.employees_path {
        Some(path) => EmployeeDirectory::from_path(path)?,
        None => EmployeeDirectory::seeded()?,
    };
    tracing::info!(employees = directory.len(), "employee directory ready");

    let graph = DeskBuilder::new(client, Arc::new(policy_index))
        .directory(Arc::new(directory))
        .transport(Arc::new(LogTransport))
        .contacts(config.contacts.clone())
        .router_kind(config.router)
        .step_limit(config.step_limit)
        .build()?;
    Ok(graph)
}
