//! `workflow-builder` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`     start the API server.
//! - `migrate`   run pending database migrations.
//! - `validate`  check a saved graph document.
//! - `run`       submit a graph document (or a stored workflow) for execution.
//! - `list`      list stored workflows.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use client::{ClientConfig, HttpClient, Session, WorkflowApi};
use editor::{EditorConfig, EditorEvent, GraphDocument, GraphEditor};

#[derive(Parser)]
#[command(name = "workflow-builder", about = "Workflow graph editor service and tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, env = "WORKFLOW_BIND", default_value = "0.0.0.0:8080")]
        bind: SocketAddr,
        #[arg(long, env = "DATABASE_URL", default_value = "sqlite://workflows.db")]
        database_url: String,
    },
    /// Run pending database migrations.
    Migrate {
        #[arg(long, env = "DATABASE_URL", default_value = "sqlite://workflows.db")]
        database_url: String,
    },
    /// Validate a saved graph document.
    Validate {
        /// Path to the graph JSON file (`{nodes, connections}`).
        path: PathBuf,
        /// Editor settings JSON file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Submit a graph for execution and print the console output.
    Run {
        /// Graph JSON file to run.
        #[arg(required_unless_present = "id")]
        path: Option<PathBuf>,
        /// Run a stored workflow instead of a file.
        #[arg(long, conflicts_with = "path")]
        id: Option<i64>,
        #[arg(long, env = "WORKFLOW_SERVER_URL", default_value = "http://127.0.0.1:8080")]
        server: String,
    },
    /// List stored workflows.
    List {
        #[arg(long, env = "WORKFLOW_SERVER_URL", default_value = "http://127.0.0.1:8080")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind, database_url } => {
            info!("Starting API server on {bind}");
            let pool = db::create_pool(&database_url, 10)
                .await
                .context("failed to connect to database")?;
            db::run_migrations(&pool).await.context("migration failed")?;
            api::serve(bind, pool).await?;
        }
        Command::Migrate { database_url } => {
            info!("Running migrations against {database_url}");
            let pool = db::create_pool(&database_url, 2)
                .await
                .context("failed to connect to database")?;
            db::run_migrations(&pool).await.context("migration failed")?;
            info!("Migrations applied successfully");
        }
        Command::Validate { path, config } => validate(&path, config.as_deref())?,
        Command::Run { path, id, server } => run(path.as_deref(), id, &server).await?,
        Command::List { server } => {
            let client = HttpClient::new(&ClientConfig::new(server))?;
            for workflow in client.list().await? {
                println!("{:>5}  {:<32}  {}", workflow.id, workflow.name, workflow.updated_at.format("%Y-%m-%d %H:%M"));
            }
        }
    }
    Ok(())
}

fn read_document(path: &Path) -> Result<GraphDocument> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read file {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not a graph document", path.display()))
}

fn print_notices(editor: &mut GraphEditor) {
    for event in editor.drain_events() {
        match event {
            EditorEvent::Notice(notice) => eprintln!("{notice}"),
            EditorEvent::Console(line) => println!("{line}"),
            _ => {}
        }
    }
}

fn validate(path: &Path, config: Option<&Path>) -> Result<()> {
    let config = match config {
        Some(p) => {
            let raw = std::fs::read_to_string(p).with_context(|| format!("cannot read config {}", p.display()))?;
            EditorConfig::from_json(&raw)?
        }
        None => EditorConfig::default(),
    };
    let mut editor = GraphEditor::new(config);
    let loaded = editor.load(read_document(path)?);
    print_notices(&mut editor);
    loaded?;

    for advisory in editor.advisories() {
        eprintln!("warning: {advisory}");
    }
    let ids: Vec<&str> = editor.nodes().iter().map(|n| n.id.as_str()).collect();
    let edges: Vec<(&str, &str)> = editor
        .connections()
        .iter()
        .map(|c| (c.source.as_str(), c.target.as_str()))
        .collect();
    match editor::dag::execution_order(&ids, &edges) {
        Ok(order) => println!("Graph is valid. Execution order: {}", order.join(" -> ")),
        Err(e) => println!("Graph loads, but cannot run: {e}"),
    }
    Ok(())
}

async fn run(path: Option<&Path>, id: Option<i64>, server: &str) -> Result<()> {
    let api = HttpClient::new(&ClientConfig::new(server))?;
    let mut session = Session::new(api, GraphEditor::default());

    let loaded = match (path, id) {
        (_, Some(id)) => session.open(id).await.map_err(anyhow::Error::from),
        (Some(path), None) => {
            let document = read_document(path)?;
            session.editor_mut().load(document).map_err(anyhow::Error::from)
        }
        (None, None) => bail!("either a file or --id is required"),
    };
    print_notices(session.editor_mut());
    loaded?;

    let result = session.run().await;
    print_notices(session.editor_mut());
    let response = result?;
    if response.status == editor::ExecutionStatus::Failed {
        bail!("workflow execution failed");
    }
    Ok(())
}
