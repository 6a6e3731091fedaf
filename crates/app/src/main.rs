use clap::Parser;
use engine::{Engine, MemoryStore};

mod error;
mod ledger;
mod settings;

fn main() -> error::Result<()> {
    let args = settings::Args::parse();
    let settings = settings::Settings::new(args.config.as_deref())?;
    let level = args.level.as_deref().unwrap_or(&settings.app.level);

    tracing_subscriber::fmt()
        .with_env_filter(format!("quota={level},engine={level}"))
        .with_writer(std::io::stderr)
        .init();

    let raw = std::fs::read_to_string(&args.ledger)?;
    let ledger: api_types::ledger::LedgerFile = serde_json::from_str(&raw)?;
    tracing::info!(
        path = %args.ledger.display(),
        expenses = ledger.expenses.len(),
        "ledger loaded"
    );

    let engine = Engine::builder().store(MemoryStore::new()).build();
    let report = match ledger::replay(&engine, ledger) {
        Ok(report) => report,
        Err(err) if err.is_user_facing() => {
            tracing::warn!("failed to replay ledger: {err}");
            return Err(err);
        }
        Err(err) => return Err(err.for_user()),
    };

    let output = if settings.app.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{output}");
    Ok(())
}
