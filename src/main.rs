use anyhow::Result;
use clap::{Parser, Subcommand};
use coactor::crawl::build_coactor_network;
use coactor::tmdb::TmdbClient;
use coactor::{Config, Graph};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "coactor")]
#[command(about = "Build a TMDb co-actor network and inspect the resulting tables")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl TMDb from the configured seed actor and write nodes/edges tables
    Crawl {
        /// Override crawl.rounds
        #[arg(long)]
        rounds: Option<usize>,

        /// Override crawl.cast_limit
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Load previously written tables and print graph statistics
    Stats {
        /// Nodes table; defaults to output.nodes_path from config.toml
        #[arg(long)]
        nodes: Option<PathBuf>,

        /// Edges table; defaults to output.edges_path from config.toml
        #[arg(long)]
        edges: Option<PathBuf>,
    },
}

fn init_logger(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", default_level))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Crawl { rounds, limit } => run_crawl(rounds, limit).await?,
        Command::Stats { nodes, edges } => {
            init_logger("info");
            let _ = dotenv::dotenv();
            let output = Config::output_at(&Config::config_path())?;
            let nodes = nodes.unwrap_or(output.nodes_path);
            let edges = edges.unwrap_or(output.edges_path);
            print_summary(&Graph::from_files(&nodes, &edges)?);
        }
    }

    Ok(())
}

/// Run the co-actor crawl described by config.toml
async fn run_crawl(rounds: Option<usize>, limit: Option<usize>) -> Result<()> {
    let config = Config::read()?.with_overrides(rounds, limit);
    init_logger(&config.coactor.log_level);
    log::info!("Starting coactor v{}", env!("CARGO_PKG_VERSION"));
    config.validate()?;

    let plan = config.crawl_plan();
    log::info!(
        "Seed: {} ({}), window {}..={}, cast limit {}, {} expansion round(s)",
        plan.seed_name,
        plan.seed_id,
        config.crawl.start_date,
        config.crawl.end_date,
        plan.cast_limit,
        plan.rounds
    );

    let client = TmdbClient::new(config.client_config(), config.api_key()?);
    let (graph, report) = build_coactor_network(
        &client,
        &plan,
        &config.output.nodes_path,
        &config.output.edges_path,
    )
    .await?;

    for round in &report.rounds {
        log::info!(
            "Round {}: {} actors, {} credits, {} cast members",
            round.round,
            round.actors,
            round.credits,
            round.cast_members
        );
    }
    print_summary(&graph);

    Ok(())
}

/// Print node/edge totals and the max-degree nodes
fn print_summary(graph: &Graph) {
    println!("Nodes: {}", graph.total_nodes());
    println!("Edges: {}", graph.total_edges());

    let mut max_degree: Vec<_> = graph.max_degree_nodes().into_iter().collect();
    max_degree.sort();
    if max_degree.is_empty() {
        println!("Max-degree nodes: none (graph has no edges)");
    } else {
        println!("Max-degree nodes:");
        for (id, degree) in max_degree {
            let name = graph
                .nodes()
                .iter()
                .find(|n| n.id == id)
                .map(|n| n.name.as_str())
                .unwrap_or("?");
            println!("  {:<10} {:<30} {}", id, name, degree);
        }
    }
}
