//! Lapse CLI - command-line client for document expiry.

use clap::Parser;
use colored::Colorize;
use lapse_cli::{
    cli::{Cli, Command},
    poller::{self, next_poll, TtlClient, FIRST_POLL},
    Result,
};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = TtlClient::new(&cli.url)?;

    match cli.command {
        Command::Status { document_id } => status(&client, &document_id, cli.json).await,
        Command::Watch {
            document_id,
            max_polls,
        } => watch(&client, &document_id, max_polls, cli.json).await,
    }
}

async fn status(client: &TtlClient, document_id: &str, json: bool) -> Result<()> {
    let response = client.fetch(document_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    match (response.ttl, response.msg) {
        (Some(ttl), _) if ttl <= 0 => println!(
            "{} expired {} seconds ago and will be cleared on the next sweep",
            document_id.cyan(),
            -ttl
        ),
        (Some(ttl), _) => println!("{} expires in {} seconds", document_id.cyan(), ttl),
        (None, Some(msg)) => println!("{}: {}", document_id.cyan(), msg.dimmed()),
        (None, None) => println!("{}: no TTL", document_id.cyan()),
    }

    Ok(())
}

async fn watch(
    client: &TtlClient,
    document_id: &str,
    max_polls: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut delay = FIRST_POLL;
    let mut polls = 0;

    loop {
        tokio::time::sleep(delay).await;

        match client.fetch(document_id).await {
            Ok(response) => {
                if json {
                    println!("{}", serde_json::to_string(&response)?);
                }
                let step = next_poll(response.ttl, delay);
                if let (Some(notice), false) = (&step.notice, json) {
                    poller::print_notice(document_id, notice);
                }
                delay = step.delay;
            }
            // Transient failures keep the current cadence
            Err(e) => eprintln!("{} {}", "Warning:".yellow().bold(), e),
        }

        polls += 1;
        if max_polls.is_some_and(|max| polls >= max) {
            return Ok(());
        }
    }
}
