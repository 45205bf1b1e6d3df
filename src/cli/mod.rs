//! Command line entry point.
//!
//! ```sh
//! ontoform start --port 8080
//! ontoform ontology load --force
//! ontoform graph dump > graph.nt
//! ontoform routes
//! ```

use std::io::Write;

use clap::{Parser, Subcommand};

use crate::{
    boot::{self, ServeParams},
    controller::AppRoutes,
    environment::{resolve_from_env, Environment},
    logger,
    store::TriplePattern,
    Result,
};

#[derive(Parser)]
#[command(name = "ontoform", version, about = "Ontology-driven knowledge graph entry")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration environment, picks `config/<environment>.yaml`.
    #[arg(global = true, short, long, default_value_t = resolve_from_env())]
    environment: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server.
    Start {
        /// Server bind address, overrides `server.binding`.
        #[arg(short, long)]
        binding: Option<String>,
        /// Server port, overrides `server.port`.
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Ontology management.
    Ontology {
        #[command(subcommand)]
        command: OntologyCommand,
    },
    /// Inspect the stored graph.
    Graph {
        #[command(subcommand)]
        command: GraphCommand,
    },
    /// Print all registered routes.
    Routes,
}

#[derive(Subcommand)]
enum OntologyCommand {
    /// Load the configured ontology sources.
    Load {
        /// Load even when classes are already declared.
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum GraphCommand {
    /// Write every statement to stdout as N-Triples.
    Dump,
}

/// Parses the command line and runs the selected command.
///
/// # Errors
/// Whatever the command fails with.
pub async fn main() -> Result<()> {
    let cli = Cli::parse();
    let environment: Environment = cli.environment.into();

    match cli.command {
        Commands::Start { binding, port } => {
            let ctx = boot::create_app(&environment).await?;
            let defaults = ServeParams::from_config(&ctx.config);
            let params = ServeParams {
                port: port.unwrap_or(defaults.port),
                binding: binding.unwrap_or(defaults.binding),
            };
            boot::start(ctx, params).await?;
        }
        Commands::Ontology {
            command: OntologyCommand::Load { force },
        } => {
            let config = environment.load()?;
            logger::init(&config.logger)?;
            let ctx = boot::create_context(&environment, config).await?;
            match boot::load_ontology(&ctx, force).await? {
                Some(report) => println!(
                    "parsed {} statements, inserted {}, skipped {}",
                    report.parsed, report.inserted, report.skipped
                ),
                None => println!("ontology already loaded, use --force to reload"),
            }
        }
        Commands::Graph {
            command: GraphCommand::Dump,
        } => {
            let config = environment.load()?;
            let ctx = boot::create_context(&environment, config).await?;
            let triples = ctx.store.matching(&TriplePattern::any()).await?;
            let mut stdout = std::io::stdout().lock();
            for triple in &triples {
                writeln!(stdout, "{}", triple.to_ntriples())?;
            }
        }
        Commands::Routes => {
            for route in AppRoutes::application().collect() {
                println!("{route}");
            }
        }
    }
    Ok(())
}
