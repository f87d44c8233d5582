use clap::Parser;

/// Storefront server: catalog, cart, checkout and staff dashboards.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Apply pending database migrations before starting.
    #[arg(long)]
    pub migrate: bool,

    /// Create or re-activate a coupon then exit, e.g. `--add-coupon WELCOME10=10.00`.
    #[arg(long, value_name = "CODE=AMOUNT")]
    pub add_coupon: Option<String>,
}
