use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use trendcast::application::ForecastingEngine;
use trendcast::application::forecasting::request::{
    normalize_batch, normalize_days, normalize_symbol,
};
use trendcast::config::Config;
use trendcast::domain::forecasting::ForecastResult;
use trendcast::domain::market::HistoryPeriod;

#[derive(Parser)]
#[command(author, version, about = "Multi-day stock trend forecasts", long_about = None)]
struct Cli {
    /// Print results as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast one symbol, training its model first if needed
    Predict {
        symbol: String,
        /// Days ahead (falls back to DEFAULT_PREDICTION_DAYS when out of range)
        #[arg(short, long)]
        days: Option<i64>,
    },
    /// Forecast several symbols; symbols without data are left out
    Batch {
        #[arg(required = true)]
        symbols: Vec<String>,
        #[arg(short, long)]
        days: Option<i64>,
    },
    /// Retrain a symbol's model and wait for it to finish
    Train { symbol: String },
    /// Show the model state of a symbol
    Status { symbol: String },
    /// Strongest BUY/SELL forecasts across a watchlist
    Recommend {
        /// Symbols to rank (default: WATCHLIST)
        symbols: Vec<String>,
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
    /// Dump the feature rows of a symbol to CSV
    Features {
        symbol: String,
        #[arg(short, long)]
        output: PathBuf,
        /// History range (1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y)
        #[arg(short, long, default_value = "2y")]
        period: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays parseable
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let engine = ForecastingEngine::build(&config).await?;
    let settings = engine.settings().clone();
    let days = |requested: Option<i64>| {
        normalize_days(
            requested,
            settings.default_prediction_days,
            settings.max_prediction_days,
        )
    };

    match cli.command {
        Commands::Predict { symbol, days: requested } => {
            let symbol = normalize_symbol(&symbol)?;
            let forecast = engine.try_predict_trend(&symbol, days(requested)).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&forecast)?);
            } else {
                print_forecast(&forecast);
                let path: Vec<String> = forecast
                    .predicted_prices
                    .iter()
                    .map(|p| format!("{:.2}", p))
                    .collect();
                println!("  path: {}", path.join(" -> "));
            }
        }
        Commands::Batch { symbols, days: requested } => {
            let symbols = normalize_batch(&symbols, settings.max_batch_symbols);
            if symbols.is_empty() {
                bail!("No valid symbols given");
            }
            let results = engine
                .get_multiple_predictions(&symbols, days(requested))
                .await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for symbol in &symbols {
                    match results.get(symbol) {
                        Some(forecast) => print_forecast(forecast),
                        None => println!("{:<8} no forecast available", symbol),
                    }
                }
            }
        }
        Commands::Train { symbol } => {
            let symbol = normalize_symbol(&symbol)?;
            let artifact = engine.train_and_wait(&symbol).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&artifact.report)?);
            } else {
                println!(
                    "{} trained: run {} | {} epochs (best {}) | validation loss {:.6} | {} train / {} validation",
                    artifact.symbol,
                    artifact.run_id,
                    artifact.report.epochs_run,
                    artifact.report.best_epoch,
                    artifact.report.best_validation_loss,
                    artifact.report.train_samples,
                    artifact.report.validation_samples
                );
            }
        }
        Commands::Status { symbol } => {
            let symbol = normalize_symbol(&symbol)?;
            let state = engine.model_state(&symbol).await;
            if cli.json {
                println!("{}", serde_json::json!({ "symbol": symbol, "state": state }));
            } else {
                println!("{}: {}", symbol, state);
            }
        }
        Commands::Recommend { symbols, limit } => {
            let symbols = if symbols.is_empty() {
                settings.watchlist.clone()
            } else {
                normalize_batch(&symbols, settings.max_batch_symbols)
            };
            let board = engine
                .top_recommendations(&symbols, settings.default_prediction_days, limit)
                .await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else if board.is_empty() {
                println!("No actionable recommendations.");
            } else {
                for forecast in &board {
                    print_forecast(forecast);
                }
            }
        }
        Commands::Features {
            symbol,
            output,
            period,
        } => {
            let symbol = normalize_symbol(&symbol)?;
            let period = HistoryPeriod::from_str(&period)?;
            let rows = engine.feature_rows(&symbol, period).await?;

            let mut writer = csv::Writer::from_path(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            for row in &rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
            println!("Wrote {} feature rows to {}", rows.len(), output.display());
        }
    }

    Ok(())
}

fn print_forecast(forecast: &ForecastResult) {
    println!(
        "{:<8} {:>10.2} -> {:>10.2} ({:+.2}% over {}d) {} [{}]",
        forecast.symbol,
        forecast.current_price,
        forecast.predicted_price,
        forecast.trend_change_percent,
        forecast.prediction_days,
        forecast.recommendation,
        forecast.confidence
    );
}
