//! clusterlens - inspect the active search-cluster connection

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use clusterlens_client::{
    AuthSettings, ClusterClient, ConnectionSettings, FileSettingsStorage, FnSettingsListener,
    SettingsStore, TaskGroupBy, TaskListResponse,
};
use parking_lot::RwLock;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clusterlens", version, about = "Inspect the active search-cluster connection")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store connection settings and verify them against the cluster
    Connect {
        /// Cluster base URL, e.g. http://localhost:9200
        #[arg(long)]
        host: String,
        /// Username for basic authentication
        #[arg(long, requires = "password")]
        username: Option<String>,
        /// Password for basic authentication
        #[arg(long, requires = "username")]
        password: Option<String>,
        /// Api-key id; a complete api-key pair takes precedence over basic credentials
        #[arg(long, requires = "api_key")]
        api_key_id: Option<String>,
        /// Api-key secret
        #[arg(long, requires = "api_key_id")]
        api_key: Option<String>,
    },
    /// Check that the stored connection still answers
    Ping,
    /// List the tasks currently executing on the cluster
    Tasks {
        /// How to group the task listing
        #[arg(long, value_enum, default_value = "none")]
        group_by: GroupBy,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum GroupBy {
    Nodes,
    Parents,
    None,
}

impl From<GroupBy> for TaskGroupBy {
    fn from(value: GroupBy) -> Self {
        match value {
            GroupBy::Nodes => TaskGroupBy::Nodes,
            GroupBy::Parents => TaskGroupBy::Parents,
            GroupBy::None => TaskGroupBy::None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let storage = Arc::new(FileSettingsStorage::new());
    let store = Arc::new(SettingsStore::new(storage));

    // Mirror the connection broadcast into a cell holding the active host,
    // the way the monitoring surface displays it.
    let active_host: Arc<RwLock<Option<String>>> = Arc::new(RwLock::new(None));
    let cell = active_host.clone();
    store.subscribe(Arc::new(FnSettingsListener::new(move |settings| {
        *cell.write() = Some(settings.host);
    })));

    let client = ClusterClient::new(store.clone())?;

    match cli.command {
        Command::Connect {
            host,
            username,
            password,
            api_key_id,
            api_key,
        } => {
            let auth = AuthSettings {
                username,
                password,
                api_key_id,
                api_key,
            };
            let mut settings = ConnectionSettings::new(&host);
            if auth != AuthSettings::default() {
                settings = settings.with_auth(auth);
            }

            store.initialize(settings)?;
            let info = client
                .ping()
                .await
                .context("cluster did not answer the liveness check")?;
            println!(
                "connected to {} ({}) - {}",
                info.cluster_name, info.version.number, info.tagline
            );
        }
        Command::Ping => {
            anyhow::ensure!(
                store.has_active_host(),
                "no connection configured, run `clusterlens connect` first"
            );
            let info = client.ping().await?;
            println!(
                "{} is alive: {} ({})",
                active_host.read().clone().unwrap_or_default(),
                info.cluster_name,
                info.version.number
            );
        }
        Command::Tasks { group_by } => {
            anyhow::ensure!(
                store.has_active_host(),
                "no connection configured, run `clusterlens connect` first"
            );
            let response = client.list_tasks(group_by.into()).await?;
            print_tasks(&response);
        }
    }

    Ok(())
}

fn print_tasks(response: &TaskListResponse) {
    let tasks = response.all_tasks();
    if tasks.is_empty() {
        println!("no tasks running");
        return;
    }

    for (id, task) in tasks {
        println!(
            "{:<30} {:<55} {}",
            id,
            task.action,
            task.running_time.as_deref().unwrap_or("-")
        );
        for child in &task.children {
            println!(
                "  └ {:<26} {:<55} {}",
                child.id,
                child.action,
                child.running_time.as_deref().unwrap_or("-")
            );
        }
    }
}
