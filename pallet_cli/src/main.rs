//! # Palletmap CLI
//!
//! Maintenance commands for the three Palletmap databases. This is also how
//! pallets get inserted from outside the GUI.
//!
//! Every command prints its result as JSON on stdout; logs go to stderr.
//!
//! ```text
//! pallet_cli pallets add --position 4 --x 120 --y 80
//! pallet_cli orders add --pallet 1
//! pallet_cli orders move 3 up
//! pallet_cli io set --input 5
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pallet_core::store::{IoStore, OrderStore, PalletStore};
use pallet_core::{AppConfig, MoveDirection, NewPallet, PalletField, StoreError};

#[derive(Parser, Debug)]
#[command(version, name = "pallet_cli", about = "Maintain Palletmap pallets, orders and I/O state")]
struct Cli {
    /// JSON settings file shared with the GUI
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
    /// Directory holding pallets.db, ordenes.db and IO.db
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pallet records
    #[command(subcommand)]
    Pallets(PalletCommand),
    /// Order queue
    #[command(subcommand)]
    Orders(OrderCommand),
    /// Input/output masks
    #[command(subcommand)]
    Io(IoCommand),
}

#[derive(Subcommand, Debug)]
enum PalletCommand {
    List,
    Add {
        #[arg(long, default_value_t = 1.2)]
        length: f64,
        #[arg(long, default_value_t = 0.8)]
        width: f64,
        #[arg(long, default_value_t = 1.0)]
        height: f64,
        #[arg(long, default_value_t = 1)]
        position: i64,
        #[arg(long, default_value = "A")]
        quality: String,
        #[arg(long, default_value_t = 0.0)]
        weight: f64,
        #[arg(long, default_value_t = 0)]
        priority: i64,
        #[arg(long, default_value_t = 0.0)]
        x: f64,
        #[arg(long, default_value_t = 0.0)]
        y: f64,
        /// Insert the pallet hidden
        #[arg(long)]
        hidden: bool,
    },
    /// Set one property using the same coercion as the properties table
    Set {
        id: i64,
        /// Property name, e.g. "Priority" or "Prioridad"
        field: String,
        value: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum OrderCommand {
    /// List orders by destination
    List,
    /// Create an order; the origin defaults to the pallet's position
    Add {
        #[arg(long)]
        pallet: Option<i64>,
        #[arg(long)]
        origin: Option<i64>,
    },
    Delete {
        id: i64,
    },
    /// Exchange the destinations of two orders
    Swap {
        a: i64,
        b: i64,
    },
    /// Move an order one place in the queue
    Move {
        id: i64,
        direction: Direction,
    },
    /// Put one order at an explicit destination slot
    SetDestination {
        id: i64,
        destination: i64,
    },
    /// Renumber all destinations in insertion order
    Reset,
    /// Show the destination the next order will get
    Next,
}

#[derive(Subcommand, Debug)]
enum IoCommand {
    Show,
    Set {
        #[arg(long)]
        input: Option<i64>,
        #[arg(long)]
        output: Option<i64>,
    },
    /// Zero both masks
    Reset,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Direction {
    Up,
    Down,
}

impl From<Direction> for MoveDirection {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Up => MoveDirection::Up,
            Direction::Down => MoveDirection::Down,
        }
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pallet_cli=info,pallet_core=warn"));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(store_error) = e.downcast_ref::<StoreError>() {
                if let Ok(json) = serde_json::to_string_pretty(store_error) {
                    eprintln!();
                    eprintln!("Error JSON:");
                    eprintln!("{}", json);
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    debug!(data_dir = %config.data_dir.display(), "using data directory");

    match cli.command {
        Command::Pallets(cmd) => pallets(&config, cmd),
        Command::Orders(cmd) => orders(&config, cmd),
        Command::Io(cmd) => io_command(&config, cmd),
    }
}

fn pallets(config: &AppConfig, cmd: PalletCommand) -> Result<()> {
    let store = PalletStore::open(&config.pallets_path())?;
    match cmd {
        PalletCommand::List => print_json(&store.get_all()?),
        PalletCommand::Add {
            length,
            width,
            height,
            position,
            quality,
            weight,
            priority,
            x,
            y,
            hidden,
        } => {
            let pallet = store.insert(&NewPallet {
                length,
                width,
                height,
                position,
                quality,
                weight,
                priority,
                x,
                y,
                visible: !hidden,
            })?;
            print_json(&pallet)
        }
        PalletCommand::Set { id, field, value } => {
            let Some(field) = PalletField::from_name(&field) else {
                bail!("unknown property '{}'", field);
            };
            print_json(&store.edit(id, field, &value)?)
        }
        PalletCommand::Delete { id } => {
            store.delete(id)?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
    }
}

fn orders(config: &AppConfig, cmd: OrderCommand) -> Result<()> {
    let mut store = OrderStore::open(&config.orders_path(), config.destination_slots)?;
    match cmd {
        OrderCommand::List => print_json(&store.list()?),
        OrderCommand::Add { pallet, origin } => {
            let origin = match (origin, pallet) {
                (Some(origin), _) => origin,
                (None, Some(id)) => {
                    let pallets = PalletStore::open(&config.pallets_path())?;
                    let pallet = pallets
                        .get(id)?
                        .ok_or_else(|| StoreError::not_found("Pallet", id))?;
                    if pallet.position == 0 {
                        bail!("pallet {} has no position", id);
                    }
                    pallet.position
                }
                (None, None) => bail!("either --pallet or --origin is required"),
            };
            let order = store.insert(origin, pallet)?;
            info!(id = order.id, destination = order.destination, "order created");
            print_json(&order)
        }
        OrderCommand::Delete { id } => {
            store.delete(id)?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        OrderCommand::Swap { a, b } => {
            store.swap_destinations(a, b)?;
            print_json(&store.list()?)
        }
        OrderCommand::Move { id, direction } => {
            let moved = store.move_order(id, direction.into())?;
            if !moved {
                info!(id, "order already at the end of the queue");
            }
            print_json(&store.list()?)
        }
        OrderCommand::SetDestination { id, destination } => {
            store.update_destination(id, destination)?;
            info!(id, destination, "destination set");
            print_json(&store.list()?)
        }
        OrderCommand::Reset => print_json(&store.reset_destinations()?),
        OrderCommand::Next => print_json(&serde_json::json!({
            "next_destination": store.next_destination()?,
            "slots": store.sequencer()?.slots(),
        })),
    }
}

fn io_command(config: &AppConfig, cmd: IoCommand) -> Result<()> {
    let store = IoStore::open(&config.io_path())?;
    match cmd {
        IoCommand::Show => {}
        IoCommand::Set { input, output } => {
            if input.is_none() && output.is_none() {
                bail!("nothing to set: pass --input and/or --output");
            }
            store.update(input, output)?;
        }
        IoCommand::Reset => store.reset()?,
    }
    let state = store.get()?;
    print_json(&serde_json::json!({
        "input": state.input,
        "output": state.output,
        "input_bits": state.input_bits(),
        "output_bits": state.output_bits(),
    }))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_order_move() {
        let cli = Cli::try_parse_from(["pallet_cli", "orders", "move", "7", "down"]).unwrap();
        match cli.command {
            Command::Orders(OrderCommand::Move { id, direction }) => {
                assert_eq!(id, 7);
                assert_eq!(MoveDirection::from(direction), MoveDirection::Down);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_set_destination() {
        let cli = Cli::try_parse_from(["pallet_cli", "orders", "set-destination", "3", "12"]).unwrap();
        match cli.command {
            Command::Orders(OrderCommand::SetDestination { id, destination }) => {
                assert_eq!(id, 3);
                assert_eq!(destination, 12);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_data_dir_is_global() {
        let cli = Cli::try_parse_from(["pallet_cli", "io", "show", "--data-dir", "/tmp/db"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/db")));
    }

    #[test]
    fn test_pallet_add_defaults() {
        let cli = Cli::try_parse_from(["pallet_cli", "pallets", "add", "--position", "4", "--hidden"]).unwrap();
        match cli.command {
            Command::Pallets(PalletCommand::Add { position, quality, hidden, .. }) => {
                assert_eq!(position, 4);
                assert_eq!(quality, "A");
                assert!(hidden);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_orders_and_io_against_temp_dir() {
        let dir = std::env::temp_dir().join(format!("pallet_cli_test_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let config = AppConfig {
            data_dir: dir.clone(),
            ..AppConfig::default()
        };

        pallets(&config, PalletCommand::Add {
            length: 1.2,
            width: 0.8,
            height: 1.0,
            position: 5,
            quality: "B".to_string(),
            weight: 10.0,
            priority: 0,
            x: 10.0,
            y: 20.0,
            hidden: false,
        })
        .unwrap();
        orders(&config, OrderCommand::Add { pallet: Some(1), origin: None }).unwrap();

        let store = OrderStore::open(&config.orders_path(), config.destination_slots).unwrap();
        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].origin, 5);
        assert_eq!(listed[0].destination, 1);

        assert!(orders(&config, OrderCommand::Add { pallet: None, origin: None }).is_err());

        orders(&config, OrderCommand::SetDestination { id: listed[0].id, destination: 7 }).unwrap();
        assert_eq!(store.get(listed[0].id).unwrap().unwrap().destination, 7);
        let too_big = config.destination_slots + 1;
        assert!(orders(&config, OrderCommand::SetDestination { id: listed[0].id, destination: too_big }).is_err());
        assert!(orders(&config, OrderCommand::SetDestination { id: 999, destination: 1 }).is_err());
        orders(&config, OrderCommand::Next).unwrap();

        io_command(&config, IoCommand::Set { input: Some(3), output: None }).unwrap();
        let io = IoStore::open(&config.io_path()).unwrap();
        assert_eq!(io.get().unwrap().input, 3);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
