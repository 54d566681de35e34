//! Campus Portal command-line client
//!
//! Logs in as one role and prints a view model as JSON

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use campus_portal::{
    config::Settings,
    models::Role,
    services::{LoggingNavigator, PortalServices},
    state::{ViewContext, ViewState},
    utils::logging,
    views::{
        AdminDashboardView, AssignedEventsView, EventCatalogView, EventManagerView, FacultyDashboardView,
        StudentDashboardView,
    },
};

#[derive(Parser)]
#[command(name = "campus-portal")]
#[command(about = "Client for the campus event-management portal", long_about = None)]
struct Cli {
    /// Configuration file (defaults to config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// admin, faculty or student
    role: Role,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the role's dashboard
    Dashboard,
    /// Print the events visible to the role
    Events,
    /// Print the signed-in identity
    Whoami,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config_path = cli.config.as_ref().map(|p| p.to_string_lossy().into_owned());
    let settings = Settings::load(config_path.as_deref()).context("failed to load configuration")?;
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}", campus_portal::info());
    let services = PortalServices::new(settings, Arc::new(LoggingNavigator))?;

    let identity = services
        .auth
        .login(cli.role, &cli.email, &cli.password)
        .await
        .context("login failed")?;
    info!(name = identity.display_name(), role = %cli.role, "Signed in");

    let output = match cli.command {
        Commands::Whoami => serde_json::to_value(&identity)?,
        Commands::Dashboard => dashboard(&services, cli.role).await?,
        Commands::Events => events(&services, cli.role).await?,
    };

    for toast in services.relay.visible() {
        info!(level = ?toast.level, "{}", toast.text);
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn dashboard(services: &PortalServices, role: Role) -> anyhow::Result<Value> {
    match role {
        Role::Admin => {
            let mut view = AdminDashboardView::open(services);
            view.load().await;
            let data = ready(view.state(), view.context()).await?;
            Ok(json!({ "totals": view.totals(), "dashboard": data }))
        }
        Role::Faculty => {
            let mut view = FacultyDashboardView::open(services);
            view.load().await;
            let data = ready(view.state(), view.context()).await?;
            Ok(json!({ "attendance": view.attendance(), "dashboard": data }))
        }
        Role::Student => {
            let mut view = StudentDashboardView::open(services);
            view.load().await;
            let data = ready(view.state(), view.context()).await?;
            Ok(json!({ "attendance": view.attendance(), "dashboard": data }))
        }
    }
}

async fn events(services: &PortalServices, role: Role) -> anyhow::Result<Value> {
    match role {
        Role::Admin => {
            let mut view = EventManagerView::open(services);
            view.load().await;
            ready(view.state(), view.context()).await
        }
        Role::Faculty => {
            let mut view = AssignedEventsView::open(services);
            view.load().await;
            ready(view.state(), view.context()).await
        }
        Role::Student => {
            let mut view = EventCatalogView::open(services);
            view.load().await;
            ready(view.state(), view.context()).await?;
            let rows: Vec<Value> = view
                .filtered()
                .into_iter()
                .map(|(event, registered)| json!({ "event": event, "registered": registered }))
                .collect();
            Ok(Value::Array(rows))
        }
    }
}

/// JSON of a loaded view, or the reason it failed to load
async fn ready<T: Serialize>(state: &ViewState<T>, ctx: &ViewContext) -> anyhow::Result<Value> {
    match state {
        ViewState::Ready(data) => Ok(serde_json::to_value(data)?),
        ViewState::Error(message) => {
            // let a pending login redirect run before exiting
            ctx.settle().await;
            bail!("{}", message)
        }
        ViewState::Loading => {
            ctx.settle().await;
            bail!("view closed before it finished loading")
        }
    }
}
