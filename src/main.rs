use aggregator::detect_market_regime;
use analytics::{AdvancedMetrics, PerformanceReport};
use backtester::{load_history, Backtester, BacktestResult, PipelineSignalSource};
use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::{init_tracing, Config, ConfigArgs};
use engine::{CycleReport, PortfolioSnapshot, SignalEngine};
use events::{default_sink, EventSink};
use market_data::{BarCache, CachedProvider, CsvProvider, MarketDataProvider};
use std::sync::Arc;

/// The main entry point for the Vantage signal and backtesting tool.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional .env file with VANTAGE__* overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.config.load()?;
    let _log_guard = init_tracing(&config.logging)?;

    match cli.command {
        Commands::Backtest(args) => handle_backtest(config, args).await,
        Commands::Signals(args) => handle_signals(config, args).await,
        Commands::Regime(args) => {
            handle_regime(args);
            Ok(())
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Multi-strategy signal generation, risk management and backtesting for equities.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the configured strategies over historical bars.
    Backtest(BacktestArgs),
    /// Run one live evaluation cycle and print the resulting orders.
    Signals(SignalsArgs),
    /// Show the strategy weights recommended for a market regime.
    Regime(RegimeArgs),
}

#[derive(Parser)]
struct BacktestArgs {
    /// First simulated day (format: YYYY-MM-DD). Defaults to `backtest.start_date`.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last simulated day (format: YYYY-MM-DD). Defaults to `backtest.end_date`.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Comma-separated symbols overriding `backtest.symbols`.
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<String>,
}

#[derive(Parser)]
struct SignalsArgs {
    /// Evaluate as of this date (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Comma-separated symbols overriding `backtest.symbols`.
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<String>,
}

#[derive(Parser)]
struct RegimeArgs {
    /// Volatility index reading, e.g. the VIX.
    #[arg(long)]
    volatility: f64,

    /// Trend strength on the ADX scale.
    #[arg(long)]
    trend: f64,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn provider(config: &Config) -> anyhow::Result<Arc<dyn MarketDataProvider>> {
    let cache = Arc::new(BarCache::new(std::time::Duration::from_secs(
        config.market_data.cache_ttl_secs,
    )));
    let csv = CsvProvider::new(&config.market_data.data_dir)?;
    Ok(Arc::new(CachedProvider::new(csv, cache)))
}

async fn handle_backtest(mut config: Config, args: BacktestArgs) -> anyhow::Result<()> {
    if !args.symbols.is_empty() {
        config.backtest.symbols = args.symbols;
    }
    config.backtest.start_date = args.from.or(config.backtest.start_date);
    config.backtest.end_date = args.to.or(config.backtest.end_date);
    config.validate()?;

    let (Some(start), Some(end)) = (config.backtest.start_date, config.backtest.end_date) else {
        anyhow::bail!("a backtest needs --from and --to (or backtest.start_date / end_date)");
    };
    // Fetch enough history before the first day to fill the lookback window.
    let warmup = Duration::days(config.backtest.lookback_bars as i64 * 2);

    let sink: Arc<dyn EventSink> = default_sink();
    let provider = provider(&config)?;
    let data = load_history(
        provider.as_ref(),
        &config.backtest.symbols,
        &config.market_data.timeframe,
        start - warmup,
        end,
        sink.as_ref(),
    )
    .await;
    if data.is_empty() {
        anyhow::bail!("no market data could be loaded for {:?}", config.backtest.symbols);
    }

    tracing::info!(symbols = data.len(), %start, %end, "history loaded, starting backtest");

    let mut source = PipelineSignalSource::from_config(&config, sink.clone())?;
    let backtester = Backtester::new(config, sink)?;

    let cancel = backtester.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let result = tokio::task::block_in_place(|| backtester.run(&data, &mut source))?;
    print_backtest(&result);
    Ok(())
}

async fn handle_signals(mut config: Config, args: SignalsArgs) -> anyhow::Result<()> {
    if !args.symbols.is_empty() {
        config.backtest.symbols = args.symbols;
    }
    config.validate()?;
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let snapshot = PortfolioSnapshot::flat(config.backtest.initial_capital);

    let provider = provider(&config)?;
    let engine = SignalEngine::new(config, provider, default_sink())?;
    let report = engine.run_cycle(as_of, &snapshot).await?;
    print_cycle(&report);
    Ok(())
}

fn handle_regime(args: RegimeArgs) {
    let assessment = detect_market_regime(args.volatility, args.trend);
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Regime", "Momentum", "Mean Reversion", "Breakout"]);
    table.add_row(vec![
        assessment.regime.to_string(),
        format!("{:.2}", assessment.weights.momentum),
        format!("{:.2}", assessment.weights.mean_reversion),
        format!("{:.2}", assessment.weights.breakout),
    ]);
    println!("{table}");
}

// ==============================================================================
// Report Rendering
// ==============================================================================

fn ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn print_backtest(result: &BacktestResult) {
    if result.cancelled {
        println!("Backtest cancelled; results cover the days processed.");
    }
    println!("{}", summary_table(&result.summary, result.trading_days));

    match result.advanced_metrics() {
        Ok(metrics) => println!("{}", advanced_table(&metrics)),
        Err(e) => println!("Advanced metrics unavailable: {e}"),
    }

    if !result.kill_switch_events.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec!["Date", "Kill Switch", "Reason"]);
        for event in &result.kill_switch_events {
            table.add_row(vec![event.date.to_string(), event.action.to_string(), event.reason.clone()]);
        }
        println!("{table}");
    }

    let mut trades = Table::new();
    trades
        .load_preset(UTF8_FULL)
        .set_header(vec!["Symbol", "Entry", "Exit", "Qty", "Entry Px", "Exit Px", "PnL", "PnL %", "Reason"]);
    for trade in &result.trades {
        trades.add_row(vec![
            trade.symbol.clone(),
            trade.entry_date.to_string(),
            trade.exit_date.to_string(),
            trade.quantity.to_string(),
            trade.entry_price.round_dp(2).to_string(),
            trade.exit_price.round_dp(2).to_string(),
            trade.pnl.round_dp(2).to_string(),
            trade.pnl_percent.round_dp(2).to_string(),
            trade.exit_reason.to_string(),
        ]);
    }
    println!("{trades}");
}

fn summary_table(report: &PerformanceReport, trading_days: usize) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    let rows = [
        ("Trading days", trading_days.to_string()),
        ("Initial capital", report.initial_capital.round_dp(2).to_string()),
        ("Final equity", report.final_equity.round_dp(2).to_string()),
        ("Total return %", report.total_return_pct.round_dp(2).to_string()),
        ("Max drawdown %", report.max_drawdown_pct.round_dp(2).to_string()),
        ("Sharpe ratio", ratio(report.sharpe_ratio)),
        ("Calmar ratio", ratio(report.calmar_ratio)),
        (
            "Profit factor",
            report.profit_factor.map_or_else(|| "n/a".to_string(), |v| v.round_dp(2).to_string()),
        ),
        ("Trades", report.total_trades.to_string()),
        (
            "Win rate %",
            report.win_rate_pct.map_or_else(|| "n/a".to_string(), |v| v.round_dp(2).to_string()),
        ),
        ("Average trade PnL", report.average_trade_pnl.round_dp(2).to_string()),
        ("Commission paid", report.total_commission.round_dp(2).to_string()),
        ("Slippage cost", report.total_slippage.round_dp(2).to_string()),
        ("Average holding days", format!("{:.1}", report.average_holding_days)),
    ];
    for (metric, value) in rows {
        table.add_row(vec![metric.to_string(), value]);
    }
    table
}

fn advanced_table(metrics: &AdvancedMetrics) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Risk Metric", "Value"]);
    let rows = [
        ("Sortino ratio", ratio(metrics.sortino_ratio)),
        ("Information ratio", ratio(metrics.information_ratio)),
        ("Treynor ratio", ratio(metrics.treynor_ratio)),
        ("VaR 95%", ratio(metrics.tail_95.map(|t| t.value_at_risk))),
        ("CVaR 95%", ratio(metrics.tail_95.map(|t| t.conditional_value_at_risk))),
        ("Ulcer index", format!("{:.2}", metrics.ulcer_index)),
        ("Monthly win rate %", ratio(metrics.monthly_win_rate_pct)),
        ("Stability (R²)", ratio(metrics.stability)),
        ("Longest win streak", metrics.streaks.longest_win_streak.to_string()),
        ("Longest loss streak", metrics.streaks.longest_loss_streak.to_string()),
    ];
    for (metric, value) in rows {
        table.add_row(vec![metric.to_string(), value]);
    }
    table
}

fn print_cycle(report: &CycleReport) {
    if let Some(kill_switch) = report.kill_switch.as_ref().filter(|d| d.triggered) {
        println!("Kill switch ({}): {}", kill_switch.action, kill_switch.reason);
    }
    if !report.skipped_symbols.is_empty() {
        println!("Skipped (no data): {}", report.skipped_symbols.join(", "));
    }

    let mut decisions = Table::new();
    decisions
        .load_preset(UTF8_FULL)
        .set_header(vec!["Symbol", "Action", "Qty", "Confidence", "Reasoning"]);
    for decision in &report.decisions {
        decisions.add_row(vec![
            decision.symbol.clone(),
            decision.action.to_string(),
            decision.quantity.to_string(),
            format!("{:.2}", decision.confidence),
            decision.reasoning.final_decision.clone(),
        ]);
    }
    println!("{decisions}");

    let mut orders = Table::new();
    orders
        .load_preset(UTF8_FULL)
        .set_header(vec!["Symbol", "Qty", "Price", "Stop Loss", "Take Profit", "Risk Review"]);
    for order in &report.orders {
        let (stop, target) = order.stops.map_or_else(
            || ("-".to_string(), "-".to_string()),
            |s| (s.stop_loss.round_dp(2).to_string(), s.take_profit.round_dp(2).to_string()),
        );
        orders.add_row(vec![
            order.symbol.clone(),
            order.quantity.to_string(),
            order.price.round_dp(2).to_string(),
            stop,
            target,
            order.decision.reason.clone(),
        ]);
    }
    println!("{orders}");

    for exit in &report.exits {
        println!("Exit {}: {}", exit.symbol, exit.reasoning.final_decision);
    }
}
