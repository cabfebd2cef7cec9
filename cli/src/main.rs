use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use engine::descriptor::{EnemyDescriptor, PlayerDescriptor, SimulationRequest};

/// Thin application shell around the combat simulation engine: resolves
/// roster files into descriptors and makes one call into `engine`.
#[derive(Parser)]
#[command(name = "engine-sim", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a full 100-simulation batch and print the aggregated result as JSON.
    Run(RosterArgs),
    /// Run a single seeded simulation and print its play-by-play log.
    Narrate(RosterArgs),
}

#[derive(clap::Args)]
struct RosterArgs {
    /// Path to a JSON array of player descriptors.
    #[arg(long)]
    party: Option<PathBuf>,

    /// Path to a JSON `{ enemies: [{enemy_id, quantity}], seed? }` request.
    #[arg(long)]
    request: Option<PathBuf>,

    /// Directory of `<enemy_id>.json` enemy descriptor files.
    #[arg(long)]
    bestiary: Option<PathBuf>,

    /// Overrides any seed present in the request file.
    #[arg(long)]
    seed: Option<u64>,

    /// Use the bundled sample party/enemies instead of reading files.
    #[arg(long)]
    builtin: bool,
}

fn load_party(path: &Path) -> Result<Vec<PlayerDescriptor>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading party file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing party file {}", path.display()))
}

/// The content pack loader described as an external collaborator: walks a
/// bestiary directory and resolves each `{enemy_id, quantity}` request line
/// into that many `EnemyDescriptor` copies. This performs no normalization
/// beyond the mechanical id-to-file lookup.
fn resolve_enemies(request_path: &Path, bestiary_dir: &Path) -> Result<(Vec<EnemyDescriptor>, Option<u64>)> {
    let raw = fs::read_to_string(request_path)
        .with_context(|| format!("reading enemy request file {}", request_path.display()))?;
    let request: SimulationRequest =
        serde_json::from_str(&raw).with_context(|| format!("parsing enemy request file {}", request_path.display()))?;

    let mut enemies = Vec::new();
    for item in &request.enemies {
        let path = bestiary_dir.join(format!("{}.json", item.enemy_id));
        let raw = fs::read_to_string(&path).with_context(|| format!("reading bestiary entry {}", path.display()))?;
        let descriptor: EnemyDescriptor =
            serde_json::from_str(&raw).with_context(|| format!("parsing bestiary entry {}", path.display()))?;
        for _ in 0..item.quantity {
            enemies.push(descriptor.clone());
        }
    }
    Ok((enemies, request.seed))
}

fn load_roster(args: &RosterArgs) -> Result<(Vec<PlayerDescriptor>, Vec<EnemyDescriptor>, Option<u64>)> {
    if args.builtin {
        return Ok((engine::content::builtin_party(), engine::content::builtin_enemies(), args.seed));
    }

    let party_path = args.party.as_deref().context("--party is required unless --builtin is set")?;
    let request_path = args.request.as_deref().context("--request is required unless --builtin is set")?;
    let bestiary_dir = args.bestiary.as_deref().context("--bestiary is required unless --builtin is set")?;

    let party = load_party(party_path)?;
    let (enemies, request_seed) = resolve_enemies(request_path, bestiary_dir)?;
    Ok((party, enemies, args.seed.or(request_seed)))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => {
            let (party, enemies, seed) = load_roster(&args)?;
            let result = engine::run_simulations(&party, &enemies, seed).context("running simulation batch")?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Narrate(args) => {
            let (party, enemies, seed) = load_roster(&args)?;
            let mut dice = match seed {
                Some(s) => engine::dice::Dice::from_seed(s),
                None => engine::dice::Dice::from_entropy(),
            };
            let record = engine::simulation::Simulation::new(1, party.len() as u32)
                .run(&party, &enemies, &mut dice)
                .context("running single simulation")?;
            for line in &record.log {
                println!("{line}");
            }
            println!("--- winner: {} after {} round(s) ---", record.winner, record.rounds);
        }
    }
    Ok(())
}
