use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::DVec3;
use hitbox_common::Transform;
use hitbox_kernel::{Host, Packet, World};
use hitbox_proxy::{Ball, BallSize, PluginConfig, VisualEntity};
use hitbox_tools::WorldInspector;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ball velocity while kicked, in blocks per tick.
const KICK_VELOCITY: DVec3 = DVec3::new(0.4, 0.0, 0.15);

#[derive(Parser)]
#[command(name = "hitbox-cli", about = "Drive a ball hitbox proxy through a simulated host")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info and the default configuration
    Info,
    /// Spawn a ball, run the host loop, and report what observers received
    Simulate {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "40")]
        ticks: u64,
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of connected observers
        #[arg(short, long, default_value = "2")]
        observers: usize,
        /// Use the small ball model
        #[arg(long)]
        small: bool,
        /// Move the ball for this many ticks after spawning
        #[arg(long, default_value = "0")]
        kick: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("hitbox-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("proxy: {}", hitbox_proxy::crate_info());
            println!("tools: {}", hitbox_tools::crate_info());
            println!("default config:");
            print!("{}", PluginConfig::default().to_yaml()?);
        }
        Commands::Simulate {
            ticks,
            config,
            observers,
            small,
            kick,
        } => {
            let mut config = match config {
                Some(path) => PluginConfig::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => PluginConfig::default(),
            };
            if small {
                config.ball.size = BallSize::Small;
            }

            let mut world = World::new();
            for i in 0..observers {
                world.connect(format!("player{i}"), DVec3::new(i as f64 * 4.0, 64.0, 0.0));
            }
            let mut host = Host::new(world);

            let target = Transform::at(0.0, 64.0, 0.0);
            let ball = Ball::spawn(&mut host, &config, target);
            tracing::info!(
                hitbox = ?ball.hitbox().id(),
                model = ?ball.model().size(),
                size = config.ball.collision_size(),
                "ball spawned"
            );

            for tick in 1..=ticks {
                if tick <= kick {
                    let next = ball.model().transform().offset(KICK_VELOCITY);
                    ball.model().move_to(next);
                }
                host.step();
            }

            println!("{}", WorldInspector::summary(host.world()));
            if let Some(info) = WorldInspector::inspect_entity(host.world(), ball.hitbox().id()) {
                println!("{info}");
            }

            for observer in host.world_mut().observers_mut() {
                let frames = observer.drain_outbox();
                let last = frames.last().map(|f| Packet::decode(f)).transpose()?;
                println!("{}: {} frames, last={:?}", observer.name(), frames.len(), last);
            }

            ball.remove(&mut host);
            println!("After removal: entities={}", host.world().entity_count());
        }
    }

    Ok(())
}
