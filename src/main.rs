use anyhow::Context;
use clap::Parser;
use shop_server::{
    configure_tracing, construct_app_state,
    domain::cart::coupons::{parse_coupon_arg, upsert_coupon},
    infra::{Cli, get_config_settings},
    run_migrations, start_server,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = get_config_settings().context("Could not read application configuration.")?;

    // _worker_guard is pulled back into the scope of main() to ensure all tracing events get
    // written to the log file when the program terminates, which is done when _worker_guard is
    // dropped.
    let _worker_guard = configure_tracing(&settings);

    let app_state = construct_app_state(settings).await?;

    if cli.migrate {
        run_migrations(&app_state.pool).await?;
        info!("Database migrations applied.");
    }

    if let Some(arg) = cli.add_coupon {
        let (code, amount) = parse_coupon_arg(&arg)?;
        let coupon = upsert_coupon(&app_state.pool, &code, amount).await?;
        info!("Coupon {} now gives {}.", coupon.code, coupon.discount_amount);
        println!("Coupon {} now gives {}.", coupon.code, coupon.discount_amount);
        return Ok(());
    }

    start_server(app_state).await
}
