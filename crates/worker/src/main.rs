use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hypewatch_core::aggregate::{Engine, Providers};
use hypewatch_core::cache::clock::SystemClock;
use hypewatch_core::config::Settings;
use hypewatch_core::domain::prediction::{CorrelationMatrix, PredictionResult};
use hypewatch_core::ingest::provider::HttpJsonProvider;
use hypewatch_core::registry::Registry;

mod watchlist;

#[derive(Debug, Parser)]
#[command(name = "hypewatch_worker")]
struct Args {
    /// Ticker to aggregate (e.g. TSLA or $TSLA). Repeatable; defaults to the whole watch-list.
    #[arg(long = "ticker")]
    tickers: Vec<String>,

    /// Register an extra ticker before running: SYMBOL or SYMBOL=alias,alias. Repeatable.
    #[arg(long = "add", value_parser = watchlist::parse_addition)]
    adds: Vec<watchlist::TickerAddition>,

    /// Also compute the pairwise correlation matrix.
    #[arg(long)]
    correlations: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    results: BTreeMap<String, PredictionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlations: Option<CorrelationMatrix>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(&settings, args).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "hypewatch run failed");
        return Err(err);
    }
    Ok(())
}

async fn run(settings: &Settings, args: Args) -> anyhow::Result<()> {
    let provider = HttpJsonProvider::from_settings(settings)?;
    let engine = Engine::new(
        Registry::with_default_watchlist(),
        Providers::from_single(Arc::new(provider)),
        settings.engine.clone(),
        Arc::new(SystemClock),
    );

    for addition in &args.adds {
        engine
            .add_ticker(&addition.id, &addition.aliases)
            .with_context(|| format!("--add {} rejected", addition.id))?;
    }

    let results = if args.tickers.is_empty() {
        engine.aggregate_all().await
    } else {
        let mut out = BTreeMap::new();
        for raw in &args.tickers {
            let result = engine
                .aggregate(raw)
                .await
                .with_context(|| format!("--ticker {raw} rejected"))?;
            out.insert(result.ticker.clone(), result);
        }
        out
    };

    let correlations = if args.correlations {
        Some(engine.correlations().await)
    } else {
        None
    };

    tracing::info!(
        tickers = results.len(),
        correlations = correlations.is_some(),
        "hypewatch run finished"
    );

    let report = Report {
        results,
        correlations,
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeatable_flags() {
        let args = Args::try_parse_from([
            "hypewatch_worker",
            "--ticker",
            "TSLA",
            "--ticker",
            "$gme",
            "--add",
            "ARM=Arm Holdings",
            "--correlations",
        ])
        .unwrap();
        assert_eq!(args.tickers, vec!["TSLA", "$gme"]);
        assert_eq!(args.adds.len(), 1);
        assert_eq!(args.adds[0].id, "$ARM");
        assert!(args.correlations);
        assert!(!args.pretty);
    }

    #[test]
    fn report_omits_correlations_unless_requested() {
        let report = Report {
            results: BTreeMap::new(),
            correlations: None,
        };
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v, serde_json::json!({"results": {}}));
    }
}
