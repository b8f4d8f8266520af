//! Inventory agent CLI binary entry point.

use std::io::Write;

use inventory_agent::agent::SessionState;
use inventory_agent::assistant::{InventoryAssistant, TurnResponse, SAMPLE_QUERIES};
use inventory_agent::cli::repl::ReplCommand;
use inventory_agent::cli::{AskArgs, Cli, Commands, ExportArgs};
use inventory_agent::config::AppConfig;
use inventory_agent::error::InventoryError;
use inventory_agent::export::ExportOutcome;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const MAX_PASSWORD_ATTEMPTS: usize = 3;

type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse_args();

    let result = run(cli).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("inventory_agent=info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), InventoryError> {
    if matches!(cli.command, Commands::Samples) {
        print_samples();
        return Ok(());
    }

    let mut config = AppConfig::from_env()?;
    cli.apply_to(&mut config);
    config.validate()?;
    info!(backend = %config.backend, inventory = %config.inventory_path.display(), "starting");

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    unlock(&config, &mut input).await?;

    let assistant = InventoryAssistant::from_config(&config).await?;
    let mut session = SessionState::new(config.memory_window);

    match cli.command {
        Commands::Ask(args) => ask(&assistant, &config, &mut session, &args).await,
        Commands::Chat => chat(&assistant, &config, &mut session, &mut input).await,
        Commands::Export(args) => export(&assistant, &config, &args).await,
        Commands::Samples => Ok(()),
    }
}

/// Prompt for the access password when one is configured.
async fn unlock(config: &AppConfig, input: &mut InputLines) -> Result<(), InventoryError> {
    let gate = config.access_gate();
    if gate.is_open() {
        return Ok(());
    }
    for _ in 0..MAX_PASSWORD_ATTEMPTS {
        prompt("Password: ")?;
        let Some(candidate) = input.next_line().await? else {
            break;
        };
        if gate.check(candidate.trim()) {
            return Ok(());
        }
        eprintln!("Incorrect password.");
    }
    Err(InventoryError::Authentication("access denied".into()))
}

async fn ask(
    assistant: &InventoryAssistant,
    config: &AppConfig,
    session: &mut SessionState,
    args: &AskArgs,
) -> Result<(), InventoryError> {
    let response = assistant.submit(session, &args.query()).await?;
    present(&response, config).await;
    Ok(())
}

async fn chat(
    assistant: &InventoryAssistant,
    config: &AppConfig,
    session: &mut SessionState,
    input: &mut InputLines,
) -> Result<(), InventoryError> {
    println!("Ask about the inventory. :samples for ideas, :history to review, :quit to leave.");
    loop {
        prompt("> ")?;
        let Some(line) = input.next_line().await? else {
            break;
        };
        match ReplCommand::parse(&line) {
            ReplCommand::Quit => break,
            ReplCommand::Skip => continue,
            ReplCommand::Samples => print_samples(),
            ReplCommand::History => {
                if session.history().is_empty() {
                    println!("No questions asked yet.");
                } else {
                    println!("{}", session.history().render());
                }
            }
            ReplCommand::Query(query) => match assistant.submit(session, &query).await {
                Ok(response) => present(&response, config).await,
                // The turn was not recorded; the user can simply ask again.
                Err(e) => eprintln!("Error: {e}"),
            },
        }
    }
    Ok(())
}

async fn export(assistant: &InventoryAssistant, config: &AppConfig, args: &ExportArgs) -> Result<(), InventoryError> {
    let dir = args.out.as_ref().unwrap_or(&config.export_dir);
    let artifact = assistant.exporter().export().await?;
    let path = artifact.write_to(dir, &config.inventory_path).await?;
    println!("Wrote {} records to {}", artifact.record_count, path.display());
    Ok(())
}

async fn present(response: &TurnResponse, config: &AppConfig) {
    println!("{}", response.answer());
    match &response.export {
        None => {}
        Some(ExportOutcome::Failed(text)) => println!("{text}"),
        Some(ExportOutcome::Ready(artifact)) => match artifact
            .write_to(&config.export_dir, &config.inventory_path)
            .await
        {
            Ok(path) => println!("Download ready: {} ({} records)", path.display(), artifact.record_count),
            Err(e) => println!("{}{e}", inventory_agent::export::EXPORT_FAILURE_PREFIX),
        },
    }
}

fn print_samples() {
    println!("Sample questions:");
    for query in SAMPLE_QUERIES {
        println!("  {query}");
    }
}

fn prompt(text: &str) -> Result<(), InventoryError> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(())
}
