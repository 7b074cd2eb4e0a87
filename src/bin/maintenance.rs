use std::env;

use anyhow::{Context, Result};

use orderdesk::{
    config::AppConfig,
    db,
    shipment::RawPayload,
    store::{OrderStore, PgOrderStore},
    workflow::StatusBucket,
};

const USAGE: &str = "Usage: maintenance <migrate|audit [limit]>";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt().with_target(false).compact().init();

    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("migrate") => migrate()?,
        Some("audit") => {
            let limit = match args.next() {
                Some(raw) => raw.parse().context("audit limit must be an integer")?,
                None => 1000,
            };
            audit(limit).await?
        }
        Some(cmd) => {
            eprintln!("Unknown command: {cmd}\n{USAGE}");
            std::process::exit(1);
        }
        None => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn load_config() -> Result<AppConfig> {
    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "maintenance",
        database_url = %config.redacted_database_url(),
        "loaded backend configuration"
    );
    Ok(config)
}

fn migrate() -> Result<()> {
    let config = load_config()?;
    let pool = db::init_pool(&config.database_url)?;
    let mut conn = pool.get().context("failed to get database connection")?;
    let applied = db::run_migrations(&mut conn)?;
    if applied.is_empty() {
        println!("Schema is up to date.");
    } else {
        for version in applied {
            println!("Applied migration {version}");
        }
    }
    Ok(())
}

/// Lists rows the dashboard cannot place: statuses outside the workflow and
/// payloads that do not decode. Nothing is modified.
async fn audit(limit: i64) -> Result<()> {
    let config = load_config()?;
    let pool = db::init_pool(&config.database_url)?;
    let store = PgOrderStore::new(pool);

    let orders = store
        .list_recent(limit)
        .await
        .context("failed to load orders")?;

    let mut findings = 0usize;
    for order in &orders {
        if StatusBucket::of(&order.status).is_none() {
            findings += 1;
            println!("order {}: unrecognized status {:?}", order.id, order.status);
        }
        match RawPayload::inspect(order.order_data.as_ref()) {
            RawPayload::Malformed(error) => {
                findings += 1;
                println!("order {}: order_data does not decode: {error}", order.id);
            }
            RawPayload::Unsupported(kind) => {
                findings += 1;
                println!("order {}: order_data is a {kind}, expected an object", order.id);
            }
            RawPayload::Missing | RawPayload::Object(_) => {}
        }
    }

    println!("Checked {} orders, {findings} findings.", orders.len());
    Ok(())
}
