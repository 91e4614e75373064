use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pod")]
#[command(about = "Print-on-demand order client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> env -> local overrides)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Ask the provider for shipping options to a destination
    Quote {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        #[command(flatten)]
        destination: commands::DestinationArgs,

        /// PRODUCT_ID or PRODUCT_ID:QUANTITY (repeatable)
        #[arg(long = "product", required = true, value_parser = commands::parse_product)]
        products: Vec<(String, u32)>,

        /// Build and validate the request without sending it
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Quote, select a shipping option, and submit an order.
    /// Guardrail: test mode unless both --live and --yes are given.
    Submit {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        #[command(flatten)]
        destination: commands::DestinationArgs,

        #[command(flatten)]
        customer: commands::CustomerArgs,

        /// PRODUCT_ID or PRODUCT_ID:QUANTITY (repeatable)
        #[arg(long = "product", required = true, value_parser = commands::parse_product)]
        products: Vec<(String, u32)>,

        /// Shipping option name as quoted; the cheapest option when omitted
        #[arg(long)]
        shipping: Option<String>,

        /// Submit a real order (Mode=Live). Requires --yes.
        #[arg(long, default_value_t = false)]
        live: bool,

        /// Acknowledge that a live order will be produced and billed.
        #[arg(long, default_value_t = false)]
        yes: bool,

        /// Poll the order status once after submitting
        #[arg(long, default_value_t = false)]
        status: bool,
    },

    /// Resolve country and state/province for a postal code
    Locate {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        postal_code: String,
    },
}

fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent when absent.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = pod_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Quote {
            config_paths,
            destination,
            products,
            dry_run,
        } => {
            let ctx = commands::ClientContext::load(&config_paths, commands::Usage::QuoteOnly)?;
            commands::order::quote(&ctx, destination.build()?, &products, dry_run)?;
        }

        Commands::Submit {
            config_paths,
            destination,
            customer,
            products,
            shipping,
            live,
            yes,
            status,
        } => {
            if live && !yes {
                bail!(
                    "REFUSING LIVE ORDER: a live order is produced and billed. \
                     Re-run with: `pod submit --live --yes ...`"
                );
            }
            let ctx = commands::ClientContext::load(&config_paths, commands::Usage::Ordering)?;
            commands::order::submit(
                &ctx,
                commands::order::SubmitArgs {
                    destination: destination.build()?,
                    customer: customer.build()?,
                    products,
                    shipping,
                    dry_run: !live,
                    poll_status: status,
                },
            )?;
        }

        Commands::Locate {
            config_paths,
            postal_code,
        } => {
            let ctx = commands::ClientContext::load(&config_paths, commands::Usage::QuoteOnly)?;
            commands::locate::locate(&ctx, &postal_code)?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable `key=value` lines.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
