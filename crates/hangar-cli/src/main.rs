//! hangar - inspect and update the operations store from the shell.
//!
//! Connection parameters come from PGHOST/PGDATABASE/PGUSER/PGPASSWORD/PGPORT;
//! without them (or if the database is unreachable) commands run against
//! the JSON fallback store.

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use hangar_cli::auth;
use hangar_cli::export::{collect, Collection, ExportFilter, ExportFormat};
use hangar_core::models::{
    AircraftRecord, InventoryItem, InventoryStatus, MessagePriority, MessageStatus,
    NewCommunication,
};
use hangar_store::{open, Session, StoreConfig};
use serde::Serialize;
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_COMMS_LIMIT: usize = 50;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show which backend the session selected
    Status,
    /// Aircraft telemetry
    #[command(subcommand)]
    Aircraft(AircraftCommand),
    /// Inventory items
    #[command(subcommand)]
    Inventory(InventoryCommand),
    /// Communications log
    #[command(subcommand)]
    Comms(CommsCommand),
    /// User credentials
    #[command(subcommand)]
    User(UserCommand),
    /// Dump a collection as JSON or CSV
    Export {
        #[arg(value_enum)]
        collection: Collection,
        /// Inventory status filter (repeatable)
        #[arg(long)]
        status: Vec<InventoryStatus>,
        /// Inventory name/id search
        #[arg(long)]
        search: Option<String>,
        /// Aircraft type filter (repeatable)
        #[arg(long = "type")]
        aircraft_type: Vec<String>,
        /// Communication priority filter (repeatable)
        #[arg(long)]
        priority: Vec<MessagePriority>,
        /// Communication status filter (repeatable)
        #[arg(long)]
        comm_status: Vec<MessageStatus>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum AircraftCommand {
    /// Insert or replace an aircraft record
    Put {
        #[arg(long)]
        id: String,
        #[arg(long = "type")]
        aircraft_type: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Feet
        #[arg(long, default_value_t = 0.0)]
        altitude: f64,
        /// Knots
        #[arg(long, default_value_t = 0.0)]
        speed: f64,
        #[arg(long, default_value_t = 0.0)]
        heading: f64,
    },
    List,
}

#[derive(Subcommand, Debug)]
enum InventoryCommand {
    /// Insert or replace an item; a new INV<HHMMSS> id is generated if none is given
    Put {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 0)]
        quantity: u32,
        #[arg(long, default_value = "Available")]
        status: InventoryStatus,
    },
    List,
}

#[derive(Subcommand, Debug)]
enum CommsCommand {
    /// Append a message to the log
    Send {
        #[arg(long = "type")]
        message_type: String,
        #[arg(long, default_value = "Medium")]
        priority: MessagePriority,
        #[arg(long, default_value = "Received")]
        status: MessageStatus,
        message: String,
    },
    /// Most recent messages first
    List {
        #[arg(long, default_value_t = DEFAULT_COMMS_LIMIT)]
        limit: usize,
        /// Ignore --limit and list every entry
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Register a new user
    Add {
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Verify a username/password pair
    Check {
        username: String,
        #[arg(long)]
        password: String,
    },
    Exists {
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hangar_store=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = StoreConfig::from_env();
    let session = open(&config).await;

    let result = run(&session, &config, cli.command).await;
    let closed = session.close().await;
    result?;
    closed?;
    Ok(())
}

async fn run(session: &Session, config: &StoreConfig, command: Command) -> Result<()> {
    match command {
        Command::Status => print(&json!({
            "backend": session.backend_kind().as_str(),
            "fallback_reason": session.fallback_reason(),
            "data_dir": config.data_dir,
        })),

        Command::Aircraft(AircraftCommand::Put {
            id,
            aircraft_type,
            lat,
            lon,
            altitude,
            speed,
            heading,
        }) => {
            let record = AircraftRecord::new(id, aircraft_type, lat, lon)
                .with_altitude(altitude)
                .with_velocity(heading, speed);
            session.upsert_aircraft(&record).await?;
            print(&json!({ "aircraft_id": record.aircraft_id }))
        }
        Command::Aircraft(AircraftCommand::List) => print(&session.list_aircraft().await?),

        Command::Inventory(InventoryCommand::Put {
            id,
            name,
            quantity,
            status,
        }) => {
            let id = id.unwrap_or_else(|| Utc::now().format("INV%H%M%S").to_string());
            let item = InventoryItem::new(id, name, quantity, status);
            session.upsert_inventory_item(&item).await?;
            print(&json!({ "item_id": item.item_id }))
        }
        Command::Inventory(InventoryCommand::List) => print(&session.list_inventory().await?),

        Command::Comms(CommsCommand::Send {
            message_type,
            priority,
            status,
            message,
        }) => {
            let entry = NewCommunication::new(message_type, priority, message, status);
            let id = session.append_communication(&entry).await?;
            print(&json!({ "id": id }))
        }
        Command::Comms(CommsCommand::List { limit, all }) => {
            let limit = if all { None } else { Some(limit) };
            print(&session.list_communications(limit).await?)
        }

        Command::User(UserCommand::Add {
            username,
            password,
            confirm,
        }) => {
            auth::register(session, &username, &password, confirm.as_deref()).await?;
            print(&json!({ "registered": username }))
        }
        Command::User(UserCommand::Check { username, password }) => {
            if !auth::login(session, &username, &password).await? {
                bail!("Invalid credentials");
            }
            print(&json!({ "authenticated": username }))
        }
        Command::User(UserCommand::Exists { username }) => {
            let exists = session.user_exists(&username).await?;
            print(&json!({ "username": username, "exists": exists }))
        }

        Command::Export {
            collection,
            status,
            search,
            aircraft_type,
            priority,
            comm_status,
            format,
            output,
        } => {
            let filter = ExportFilter {
                statuses: status,
                search,
                aircraft_types: aircraft_type,
                priorities: priority,
                message_statuses: comm_status,
            };
            let records = collect(session, collection, &filter).await?;
            match output {
                Some(path) => {
                    records.write_file(format, &path).await?;
                    tracing::info!("Exported {} records to {}", records.len(), path.display());
                }
                None => std::io::stdout().write_all(&records.render(format)?)?,
            }
            Ok(())
        }
    }
}

fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
