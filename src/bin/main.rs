use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use task_orchestrator::{LlmPlanner, Planner, Settings, api};

#[derive(Parser)]
#[command(name = "task-orchestrator")]
#[command(about = "LLM task orchestrator for browser and code agents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the orchestrator REST server
    Server {
        #[arg(short, long, default_value = "8080", env = "APP_PORT")]
        port: u16,
    },
    /// Execute a single task in the foreground and print the result
    Run { task: String },
    /// Plan a task without executing it (useful for prompt debugging)
    Plan { task: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("task_orchestrator=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Commands::Server { port } => {
            info!("Starting orchestrator server on port {}", port);

            let orchestrator = task_orchestrator::build_orchestrator(&settings)?;
            let app = api::create_router(orchestrator);

            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
            info!("Server listening on http://0.0.0.0:{}", port);

            axum::serve(listener, app).await?;
        }
        Commands::Run { task } => {
            let orchestrator = task_orchestrator::build_orchestrator(&settings)?;

            let task_id = Uuid::new_v4().to_string();
            info!(task_id, "running task in the foreground");

            let execution = orchestrator.execute_task(&task_id, &task).await;
            println!("{}", serde_json::to_string_pretty(&execution)?);
        }
        Commands::Plan { task } => {
            let llm: Arc<dyn task_orchestrator::LlmClient> =
                Arc::new(task_orchestrator::HttpLlmClient::new(
                    task_orchestrator::LlmClientConfig {
                        endpoint: settings.llm_endpoint.clone(),
                        api_key: settings.llm_api_key.clone(),
                        timeout_secs: settings.request_timeout_secs,
                    },
                )?);

            let planner = LlmPlanner::new(llm, settings.planner_model.clone());
            let plan = planner.plan(&task).await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
    }

    Ok(())
}
