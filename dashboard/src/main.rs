use std::collections::HashMap;

use otclib::market::{Signal, SimulationLoop, Snapshot};
use otclib::util::{self, Settings};
use otclib::{analysis, delivery, logging, rates};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::configure_logger("logs/dashboard.log")?;

    let settings = util::read_settings().unwrap_or_else(|err| {
        log::warn!("Failed to read settings, using defaults: {}", err);
        Settings::default()
    });

    let session = rates::initialize_session().await;
    log::info!(
        "Session started in {} mode with {} instruments.",
        session.mode,
        session.snapshot.instruments.len()
    );

    let (sim, handle, mut rx) = SimulationLoop::new(session.snapshot);
    let sim_task = tokio::spawn(sim.run());

    let mut last_signals: HashMap<String, Signal> = HashMap::new();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Received SIGINT, stopping simulation...");
                handle.stop();
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                report(&snapshot);
                notify_strong_signals(&settings, &snapshot, &mut last_signals).await;
            }
        }
    }

    sim_task.await?;
    Ok(())
}

fn report(snapshot: &Snapshot) {
    for instrument in &snapshot.instruments {
        log::info!(
            "[{symbol}] {price:.decimals$} ({change:+.3}%) RSI {rsi:.1} STOCH {stochastic:.1} -> {signal}",
            symbol = instrument.symbol,
            price = instrument.current_price,
            decimals = instrument.volatility_class().decimals(),
            change = instrument.change_percent,
            rsi = instrument.rsi,
            stochastic = instrument.stochastic,
            signal = instrument.signal,
        );
    }
}

/// Forward strong signals to the delivery collaborator, but only on the
/// tick where a symbol first turns strong.
async fn notify_strong_signals(
    settings: &Settings,
    snapshot: &Snapshot,
    last_signals: &mut HashMap<String, Signal>,
) {
    if !settings.notify_on_strong_signals {
        return;
    }

    for instrument in &snapshot.instruments {
        let previous = last_signals.insert(instrument.symbol.clone(), instrument.signal);
        if !instrument.signal.is_strong() || previous == Some(instrument.signal) {
            continue;
        }

        let analysis_text = match &settings.gemini {
            Some(gemini) => {
                Some(analysis::analyze_market(instrument, settings.timeframe, Some(gemini)).await)
            }
            None => None,
        };

        match delivery::send_signal(
            settings,
            instrument,
            settings.timeframe,
            analysis_text.as_deref(),
        )
        .await
        {
            Ok(()) => log::info!(
                "[{}] Delivered {} signal.",
                instrument.symbol,
                instrument.signal
            ),
            Err(err) => log::warn!("[{}] Signal delivery failed: {}", instrument.symbol, err),
        }
    }
}
