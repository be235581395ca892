//! passtune CLI - evolutionary tuning of compiler pass configurations.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use passtune_core::{Pass, PassSet};
use passtune_engine::{
    CheckpointStore, GeneticAlgorithm, Runner, RunnerConfig, DEFAULT_CHECKPOINT_PATH,
};
use passtune_profiler::{ProfileSource, Profiler, SystemExecutor};

#[derive(Parser)]
#[command(name = "passtune")]
#[command(about = "Evolve optimization-pass configurations for a compiler under test", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve pass configurations against a corpus of source files
    Evolve {
        /// Corpus directory, scanned recursively
        corpus: PathBuf,
        /// Path to the compiler under test
        #[arg(long)]
        compiler: PathBuf,
        /// Number of generations to run
        #[arg(long, default_value = "10")]
        generations: u32,
        /// Seed for the random source; omit for an entropy seed
        #[arg(long)]
        seed: Option<u64>,
        /// Checkpoint file to resume from and persist to
        #[arg(long, default_value = DEFAULT_CHECKPOINT_PATH)]
        checkpoint: PathBuf,
        /// Extension of corpus source files
        #[arg(long, default_value = "gl")]
        ext: String,
        /// Population size
        #[arg(long, default_value = "20")]
        population: usize,
        /// Number of top individuals carried over unchanged
        #[arg(long, default_value = "2")]
        elitism: usize,
        /// Probability that an offspring mutates
        #[arg(long, default_value = "0.1")]
        mutation_rate: f64,
    },
    /// Profile one source file and print its metrics as JSON
    Profile {
        /// Source file
        file: PathBuf,
        /// Path to the compiler under test
        #[arg(long)]
        compiler: PathBuf,
        /// Comma-separated pass names; omit to enable every pass
        #[arg(long, value_delimiter = ',')]
        passes: Option<Vec<Pass>>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evolve {
            corpus,
            compiler,
            generations,
            seed,
            checkpoint,
            ext,
            population,
            elitism,
            mutation_rate,
        } => {
            anyhow::ensure!(
                elitism < population,
                "elitism ({elitism}) must be smaller than the population size ({population})"
            );
            anyhow::ensure!(
                (0.0..=1.0).contains(&mutation_rate),
                "mutation rate must be within [0, 1]"
            );

            let work_dir = tempfile::tempdir()?;
            let profiler = Profiler::new(Arc::new(SystemExecutor), compiler, work_dir.path());
            let ga = GeneticAlgorithm {
                population_size: population,
                elitism_count: elitism,
                mutation_rate,
                ..GeneticAlgorithm::new()
            };
            let runner = Runner::new(profiler, ga, CheckpointStore::new(checkpoint)).with_config(
                RunnerConfig {
                    source_extension: ext,
                    ..RunnerConfig::default()
                },
            );

            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let best = runner.run(&corpus, generations, &mut rng).await?;
            info!("evolution complete");

            println!("Evolution complete.");
            println!("Best configuration found:");
            println!("  - Passes: {}", best.chromosome);
            println!("  - Fitness score: {:.6}", best.fitness.unwrap_or(0.0));
        }
        Commands::Profile {
            file,
            compiler,
            passes,
        } => {
            let passes = match passes {
                Some(list) => list.into_iter().collect(),
                None => PassSet::all(),
            };

            let work_dir = tempfile::tempdir()?;
            let profiler = Profiler::new(Arc::new(SystemExecutor), compiler, work_dir.path());
            let metrics = profiler.run(&file, passes).await?;

            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
    }

    Ok(())
}
