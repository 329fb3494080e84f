use std::io;

use dotenv::dotenv;
use scbot::infra::{DefaultObserver, HostConnection};
use scbot::planners::{Agent, BuildManagerAgent, SimpleAgent};
use scbot::{AgentConfig, AgentKind, Game};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scbot=debug,info"));

    // stdout carries the host protocol
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {}", e);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let config = AgentConfig::from_env()?;
    tracing::info!("Agent: {:?}", config.agent);

    let mut agent: Box<dyn Agent> = match config.agent {
        AgentKind::BuildManager => Box::new(BuildManagerAgent::new(config.build_manager)?),
        AgentKind::Simple => Box::new(SimpleAgent::new(config.step_delay)),
    };

    let mut connection = HostConnection::new(io::stdin().lock(), io::stdout().lock());
    if let Some(folder) = &config.replays_folder {
        connection = connection.with_replays(folder)?;
    }

    let mut game = Game::new(connection, DefaultObserver);
    game.run(agent.as_mut())?;

    Ok(())
}
