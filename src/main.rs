//! Promo Pricing CLI

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
    thread,
    time::Duration,
};

use clap::{Args, Parser, Subcommand};
use jiff::Timestamp;
use promo_pricing::{
    catalog::{Catalog, CatalogError, packages::parse_price},
    context::{CustomerType, UserContext},
    observability::{LogFormat, ObservabilityError, init_subscriber},
    promotions::conflicts::find_conflicts,
    report::{ConflictReport, QuoteReport, ReportError, StatusReport},
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "promo-pricing", about = "Promotional pricing resolution", long_about = None)]
struct Cli {
    /// Directory holding `packages/` and `promotions/` catalogs
    #[arg(long, env = "PROMO_CATALOG_DIR", default_value = "./catalogs", global = true)]
    catalog_dir: PathBuf,

    /// Catalog set name
    #[arg(long, env = "PROMO_CATALOG_SET", default_value = "website", global = true)]
    set: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    log_level: String,

    /// Log format
    #[arg(long, value_enum, default_value = "compact", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Price a package for a customer
    Quote(QuoteArgs),

    /// Show timing and usage of every promotion
    Status(StatusArgs),

    /// List promotions that overlap on a package
    Conflicts(ConflictsArgs),

    /// Load and validate the catalog
    Validate,
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// Package id
    #[arg(long)]
    package: String,

    /// Customer type
    #[arg(long, value_enum, default_value = "any")]
    customer_type: CustomerType,

    /// Customer region code
    #[arg(long)]
    region: Option<String>,

    /// Promo code entered by the customer
    #[arg(long)]
    promo_code: Option<String>,

    /// Number of units
    #[arg(long, default_value_t = 1)]
    quantity: u32,

    /// Order value for minimum-order conditions (e.g. "3000 PLN")
    #[arg(long)]
    order_value: Option<String>,

    /// Apply every eligible promotion instead of the best one
    #[arg(long)]
    stack: bool,

    /// Evaluate at this instant instead of now (RFC 3339)
    #[arg(long)]
    at: Option<Timestamp>,

    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Evaluate at this instant instead of now (RFC 3339)
    #[arg(long)]
    at: Option<Timestamp>,

    /// Refresh every SECS seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    watch: Option<u64>,

    /// Stop after N refreshes
    #[arg(long, value_name = "N", requires = "watch")]
    iterations: Option<u32>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct ConflictsArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Observability(#[from] ObservabilityError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            _ = writeln!(io::stderr(), "error: {error}");

            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    init_subscriber(&cli.log_level, cli.log_format)?;

    let catalog = Catalog::from_set_in(&cli.catalog_dir, &cli.set)?;

    info!(
        set = %cli.set,
        packages = catalog.packages().count(),
        promotions = catalog.promotions().len(),
        "catalog loaded"
    );

    match cli.command {
        Commands::Quote(args) => quote(&catalog, args),
        Commands::Status(args) => status(&catalog, &args),
        Commands::Conflicts(args) => conflicts(&catalog, &args),
        Commands::Validate => validate(&catalog, &cli.set),
    }
}

fn quote(catalog: &Catalog<'static>, args: QuoteArgs) -> Result<(), CliError> {
    let package = catalog.package(&args.package)?;

    let mut context = UserContext::default()
        .with_customer_type(args.customer_type)
        .with_quantity(args.quantity);

    if let Some(region) = args.region {
        context = context.with_region(region);
    }

    if let Some(code) = args.promo_code {
        context = context.with_promo_code(code);
    }

    if let Some(order_value) = args.order_value.as_deref() {
        context = context.with_order_value(parse_price(order_value)?);
    }

    let now = args.at.unwrap_or_else(Timestamp::now);
    let report = QuoteReport::build(package, catalog.promotions(), &context, now, args.stack);
    let out = io::stdout().lock();

    if args.json {
        report.write_json(out)?;
    } else {
        report.write_to(out)?;
    }

    Ok(())
}

fn status(catalog: &Catalog<'static>, args: &StatusArgs) -> Result<(), CliError> {
    let mut rendered: u32 = 0;

    loop {
        let now = args.at.unwrap_or_else(Timestamp::now);
        let report = StatusReport::build(catalog.promotions(), now);
        let mut out = io::stdout().lock();

        if args.json {
            report.write_json(&mut out)?;
        } else {
            report.write_to(&mut out)?;
        }

        out.flush()?;
        rendered = rendered.saturating_add(1);

        let Some(interval) = args.watch else {
            return Ok(());
        };

        if args.iterations.is_some_and(|limit| rendered >= limit) {
            return Ok(());
        }

        debug!(interval, rendered, "waiting for next status refresh");

        thread::sleep(Duration::from_secs(interval));
    }
}

fn conflicts(catalog: &Catalog<'static>, args: &ConflictsArgs) -> Result<(), CliError> {
    let conflicts = find_conflicts(catalog.promotions());
    let report = ConflictReport::build(&conflicts);
    let out = io::stdout().lock();

    if args.json {
        report.write_json(out)?;
    } else {
        report.write_to(out)?;
    }

    Ok(())
}

fn validate(catalog: &Catalog<'static>, set: &str) -> Result<(), CliError> {
    writeln!(
        io::stdout().lock(),
        "catalog {set} is valid: {} packages, {} promotions",
        catalog.packages().count(),
        catalog.promotions().len()
    )?;

    Ok(())
}
