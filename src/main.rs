mod cli;

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use freja_core::browser::{
    build_browser_agent, discover_tools, with_connection, BrowserManager, SEMANTIC_TIER,
    VISUAL_TIER,
};
use freja_core::{BuildProgress, NullExecutor};
use freja_mcp::StdioBackend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = freja_config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::ShowConfig => {
            println!("{}", serde_yaml::to_string(&config).unwrap_or_default());
            Ok(())
        }
        Commands::Tools => list_tools_cmd(&config).await,
        Commands::Inspect => inspect_cmd(&config).await,
    }
}

/// Connect to the configured backend, enumerate its tools, and report which
/// capability tiers the current session satisfies.
async fn list_tools_cmd(config: &freja_config::Config) -> anyhow::Result<()> {
    let backend = Arc::new(StdioBackend::new(
        config.browser.command.clone(),
        config.browser.args.clone(),
    ));
    let manager = BrowserManager::new(backend);

    with_connection(&manager, || async {
        let descriptors = discover_tools(&manager).await?;

        println!("Discovered {} tools:", descriptors.len());
        for d in &descriptors {
            println!("  {:<28} {}", d.name, d.description);
        }

        let session = manager.session();
        let tools = freja_core::browser::wrap_tools(&descriptors, &session)?;
        for tier in [&SEMANTIC_TIER, &VISUAL_TIER] {
            let report = tier.validate(&tools);
            if report.satisfied {
                println!("Tier {:<10} satisfied", tier.name);
            } else {
                println!("Tier {:<10} missing: {}", tier.name, report.missing.join(", "));
            }
        }
        Ok(())
    })
    .await
}

/// Build the complete browser agent definition and print its shape.  Uses a
/// null execution engine; the delegation tool is constructed (when the
/// visual tier allows it) but nothing is run.
async fn inspect_cmd(config: &freja_config::Config) -> anyhow::Result<()> {
    let backend = Arc::new(StdioBackend::new(
        config.browser.command.clone(),
        config.browser.args.clone(),
    ));

    let (progress, mut events) = BuildProgress::channel(32);

    let built = build_browser_agent(
        config,
        backend,
        Arc::new(NullExecutor),
        progress,
        CancellationToken::new(),
    )
    .await?;

    while let Ok(event) = events.try_recv() {
        println!("{event}");
    }

    let def = &built.definition;
    println!();
    println!("agent:      {} ({})", def.name, def.kind);
    println!("model:      {}/{}", def.model.provider, def.model.name);
    println!("max turns:  {}", def.run.max_turns);
    println!("tools ({}):", def.tools.len());
    for schema in def.tools.schemas() {
        println!("  {:<28} {}", schema.name, schema.description);
    }
    for warning in &built.warnings {
        println!("warning: {warning}");
    }

    built.manager.cleanup().await;
    Ok(())
}

/// Logging is wired here and nowhere else; every component below this
/// entry point reports through `tracing` without owning a subscriber.
fn init_logging(verbosity: u8) {
    let default_directive = match verbosity {
        0 => "freja=warn",
        1 => "freja=debug,freja_core=debug,freja_mcp=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
