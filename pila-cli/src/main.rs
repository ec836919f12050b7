//! Pila command-line interface

mod server;
mod status;
mod task;

use clap::{Parser, Subcommand};
use pila_sdk::Client;
use serde::Serialize;
use server::Server;
use status::handle_status;
use task::{Confirm, Pop, Push};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, env = "PILA_ADDR", default_value = "http://127.0.0.1:9080")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "start a pila server")]
    Server(Server),
    #[command(about = "push a task payload onto the stack")]
    Push(Push),
    #[command(about = "pop a task under a lease")]
    Pop(Pop),
    #[command(about = "confirm a completed task by its lease key")]
    Confirm(Confirm),
    #[command(about = "check collection sizes")]
    Status,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let sdk = Client::new(cli.addr.clone());

    match cli.command {
        Commands::Server(server) => server.handle().await,
        Commands::Push(push) => push.handle(&sdk).await,
        Commands::Pop(pop) => pop.handle(&sdk).await,
        Commands::Confirm(confirm) => confirm.handle(&sdk).await,
        Commands::Status => handle_status(&sdk).await,
    }
}

pub(crate) fn handle_resp<T: Serialize>(resp: Result<T, String>) {
    match resp {
        Ok(resp) => {
            let resp = serde_json::to_string_pretty(&resp).unwrap();
            println!("{resp}");
        }
        Err(e) => {
            println!("Error: {e}");
        }
    }
}
