use anyhow::{bail, Context, Result};
use market_insight_core::models::settings::AnalysisSettings;
use market_insight_core::models::timeframe::Timeframe;
use market_insight_core::providers::traits::ProviderTag;
use market_insight_core::services::request_coordinator::{AnalysisRequest, Delivery};
use market_insight_core::MarketInsight;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage:
  market-insight [--config <settings.json>] analyze <coingecko|yahoo> <symbol> [days]
  market-insight [--config <settings.json>] insights

days: 1, 7, 30, 90 or 365 (defaults to the configured timeframe)";

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(std::env::args().skip(1).collect()).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(mut args: Vec<String>) -> Result<()> {
    let settings = match take_flag(&mut args, "--config")? {
        Some(path) => AnalysisSettings::load_from_file(&path)
            .with_context(|| format!("loading settings from {path}"))?,
        None => AnalysisSettings::default(),
    };
    let app = MarketInsight::new(settings)?;
    info!(?app, "market insight ready");

    match args.first().map(String::as_str) {
        Some("analyze") => {
            let provider: ProviderTag = args.get(1).context(USAGE)?.parse()?;
            let symbol = args.get(2).context(USAGE)?;
            let timeframe = match args.get(3) {
                Some(days) => Timeframe::try_from(
                    days.parse::<u32>().with_context(|| format!("invalid day count {days:?}"))?,
                )?,
                None => app.settings().default_timeframe,
            };

            let request = AnalysisRequest::new(provider, symbol.as_str(), timeframe);
            match app.analyze("cli", request).await? {
                Delivery::Applied(analysis) => {
                    if analysis.report.is_none() {
                        info!("insufficient data: the series has no usable points");
                    }
                    println!("{}", serde_json::to_string_pretty(&analysis)?);
                }
                Delivery::Stale => info!("result superseded by a newer request"),
            }
        }
        Some("insights") => {
            if let Delivery::Applied(insights) = app.refresh_insights().await? {
                println!("{}", serde_json::to_string_pretty(&insights)?);
            }
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

/// Remove `name <value>` from `args`, returning the value.
fn take_flag(args: &mut Vec<String>, name: &str) -> Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == name) else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        bail!("{name} needs a value");
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(value))
}
