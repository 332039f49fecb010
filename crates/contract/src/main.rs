use anyhow::{Context, bail};
use chrono::Utc;

use supplychain_contract::{ContractConfig, router};
use supplychain_core::TxTimestamp;
use supplychain_infra::InMemoryLedger;

/// Runs the contract against an in-memory ledger: seeds it, then lists it.
fn main() -> anyhow::Result<()> {
    supplychain_observability::init();

    let config = match std::env::var("SUPPLYCHAIN_CONFIG") {
        Ok(path) => ContractConfig::from_path(&path)
            .with_context(|| format!("loading contract config from {path}"))?,
        Err(_) => {
            tracing::warn!("SUPPLYCHAIN_CONFIG not set; using built-in seed products");
            ContractConfig::default()
        }
    };

    let ledger = InMemoryLedger::new();

    // The demo host stamps transactions from its own clock.
    let now = Utc::now();
    let stamp = TxTimestamp::new(now.timestamp(), now.timestamp_subsec_nanos() as i32);

    let tx = ledger.begin_at(stamp).with_client("demo");
    let response = router::invoke(&tx, &config, router::INIT_LEDGER, &[]);
    if !response.is_ok() {
        bail!("InitLedger failed: {}", response.message);
    }
    let written = tx.commit().context("committing InitLedger")?;
    tracing::info!(written, height = ledger.height(), "seed transaction committed");

    let tx = ledger.begin_at(stamp).with_client("demo");
    let response = router::invoke(&tx, &config, router::GET_ALL_PRODUCTS, &[]);
    if !response.is_ok() {
        bail!("GetAllProducts failed: {}", response.message);
    }
    let products: serde_json::Value = response.json().context("decoding product listing")?;
    println!("{}", serde_json::to_string_pretty(&products)?);

    Ok(())
}
