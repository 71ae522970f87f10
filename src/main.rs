use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use fleetcost::config::{init_config, Config};
use fleetcost::exit_codes;
use fleetcost::planner::{self, PlanOptions, Resources, Strategy};
use fleetcost::pricing::StaticCatalog;
use fleetcost::report;
use fleetcost::stack::{outputs_from_hourly, Declaration};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fleetcost")]
#[command(
    about = "Capacity planning and price estimation for EC2 fleets",
    long_about = "fleetcost evaluates price declarations and plans server fleets.\n\nSupports:\n  - Declarations: a resource map priced into hourly and monthly outputs\n  - Planning: packing service replicas onto servers with anti-affinity\n  - Pricing a plan with the built-in catalog or config overrides"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a declaration file and print hourly and monthly price
    Estimate {
        /// Declaration file (TOML)
        file: PathBuf,
    },
    /// Convert an hourly price to a monthly price (x730)
    Monthly {
        /// Hourly price, e.g. 0.0416
        hourly: String,
    },
    /// Pack services onto servers and optionally price the result
    Plan {
        /// Workload CSV (one row per service)
        csv: PathBuf,
        /// Effective cores per server
        #[arg(long)]
        cores: f64,
        /// Effective memory per server (GB)
        #[arg(long)]
        ram: f64,
        /// Effective network bandwidth per server (Mbps)
        #[arg(long)]
        net: f64,
        /// Effective disk I/O per server (MB/s)
        #[arg(long)]
        disk_io: f64,
        /// Effective storage per server (GB); priced as one volume of at most 16384 GB
        #[arg(long)]
        storage: f64,
        /// Random seed for the order search (default from config)
        #[arg(long)]
        seed: Option<u64>,
        /// Planning strategy
        #[arg(long, value_enum, default_value_t = Strategy::Search)]
        strategy: Strategy,
        /// Random resource orders to try (default from config)
        #[arg(long)]
        samples: Option<usize>,
        /// Where to write the plan JSON (default from config)
        #[arg(long)]
        plan_file: Option<PathBuf>,
        /// Price the plan with this instance type per server
        #[arg(long)]
        instance_type: Option<String>,
        /// Location for pricing (default: provider region)
        #[arg(long)]
        location: Option<String>,
        /// Volume type for pricing
        #[arg(long, default_value = "gp3")]
        volume_type: String,
    },
    /// Show the effective price catalog
    Catalog,
    /// Initialize configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = ".fleetcost.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise only warnings unless --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), err);
        std::process::exit(exit_codes::exit_code_for_anyhow(&err));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let json = cli.output == OutputFormat::Json;

    match cli.command {
        Commands::Estimate { file } => {
            let declaration = Declaration::from_path(&file)
                .with_context(|| format!("Failed to load declaration: {}", file.display()))?;
            let catalog = StaticCatalog::from_config(&config.pricing);
            let evaluation = declaration
                .evaluate(&catalog)
                .await
                .with_context(|| format!("Failed to evaluate declaration: {}", file.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&evaluation)?);
            } else {
                print!("{}", report::render_evaluation(&evaluation));
            }
        }
        Commands::Monthly { hourly } => {
            let outputs = outputs_from_hourly(&hourly)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outputs)?);
            } else {
                print!(
                    "{}",
                    report::render_outputs(&outputs.hourly_price, outputs.monthly_price)
                );
            }
        }
        Commands::Plan {
            csv,
            cores,
            ram,
            net,
            disk_io,
            storage,
            seed,
            strategy,
            samples,
            plan_file,
            instance_type,
            location,
            volume_type,
        } => {
            let capacity = Resources {
                cpu: cores,
                memory: ram,
                network: net,
                disk_io,
                storage,
            };
            let options = PlanOptions {
                strategy,
                seed: seed.unwrap_or(config.planner.seed),
                permutation_samples: samples.unwrap_or(config.planner.permutation_samples),
            };

            let instances = planner::load_instances(&csv)
                .with_context(|| format!("Failed to load workload: {}", csv.display()))?;
            let plan = planner::plan(&instances, &capacity, &options)?;

            let evaluation = match instance_type {
                Some(instance_type) => {
                    let declaration = Declaration::new(
                        config.provider.clone(),
                        plan.to_resource_map(&instance_type, location.as_deref(), &volume_type),
                    )?;
                    let catalog = StaticCatalog::from_config(&config.pricing);
                    Some(
                        declaration
                            .evaluate(&catalog)
                            .await
                            .context("Failed to price plan")?,
                    )
                }
                None => None,
            };

            // Only a plan that priced cleanly is written
            let plan_path = plan_file.unwrap_or_else(|| config.planner.plan_file.clone());
            plan.write_json(&plan_path)
                .with_context(|| format!("Failed to write plan: {}", plan_path.display()))?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report::plan_json(&plan, evaluation.as_ref()))?
                );
            } else {
                print!("{}", report::render_plan(&plan));
                if let Some(evaluation) = &evaluation {
                    println!();
                    print!("{}", report::render_evaluation(evaluation));
                }
                println!("\nWrote plan to {}", plan_path.display());
            }
        }
        Commands::Catalog => {
            let catalog = StaticCatalog::from_config(&config.pricing);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report::catalog_json(&catalog))?
                );
            } else {
                print!("{}", report::render_catalog(&catalog));
            }
        }
        Commands::Init { output } => {
            init_config(&output)?;
        }
    }

    Ok(())
}
