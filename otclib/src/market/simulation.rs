use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::market::generator::{next_price, next_rsi, next_stochastic};
use crate::market::objects::{
    InstrumentState, PricePoint, Snapshot, TICK_INTERVAL_MS, TREND_LOOKBACK,
};
use crate::market::random::{EntropySource, RandomSource};
use crate::market::signal::classify;
use crate::util;

/// Advance one instrument by one tick: walk the price, push it into the
/// history, walk the indicators, then reclassify against the updated
/// window.
pub fn advance_instrument(
    previous: &InstrumentState,
    rng: &mut dyn RandomSource,
    now: u64,
) -> InstrumentState {
    let new_price = next_price(previous.current_price, previous.volatility_class(), rng);

    let mut history = previous.history.clone();
    history.push(PricePoint {
        timestamp: now,
        value: new_price,
    });

    let rsi = next_rsi(previous.rsi, rng);
    let stochastic = next_stochastic(previous.stochastic, rng);

    let trend = history
        .nth_most_recent(TREND_LOOKBACK)
        .map(|p| new_price - p.value)
        .unwrap_or(0.0);

    // Change is measured against the window start (a 40-tick-old point),
    // not a true session-open price.
    let change_percent = history
        .oldest()
        .map(|p| (new_price - p.value) / p.value * 100.0)
        .unwrap_or(0.0);

    InstrumentState {
        symbol: previous.symbol.clone(),
        current_price: new_price,
        history,
        change_percent,
        rsi,
        stochastic,
        signal: classify(rsi, stochastic, trend),
        last_updated: now,
    }
}

/// Advance every tracked instrument together, preserving their order.
pub fn advance_snapshot(previous: &Snapshot, rng: &mut dyn RandomSource, now: u64) -> Snapshot {
    let instruments = previous
        .instruments
        .iter()
        .map(|instrument| advance_instrument(instrument, rng, now))
        .collect();
    Snapshot { instruments }
}

/// Control surface for a running simulation loop. Cloneable so the UI and
/// a shutdown path can share it.
#[derive(Debug, Clone)]
pub struct LoopHandle {
    paused: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
}

impl LoopHandle {
    fn new() -> Self {
        LoopHandle {
            paused: Arc::new(AtomicBool::new(false)),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Irreversible: once stopped, no further snapshot is ever published.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Periodic driver of the market simulation. Owns the latest snapshot and
/// publishes a complete replacement through a watch channel every tick, so
/// consumers never observe a half-updated market.
pub struct SimulationLoop {
    snapshot: Snapshot,
    rng: Box<dyn RandomSource>,
    handle: LoopHandle,
    tx: watch::Sender<Snapshot>,
}

impl SimulationLoop {
    pub fn new(initial: Snapshot) -> (Self, LoopHandle, watch::Receiver<Snapshot>) {
        Self::with_rng(initial, Box::new(EntropySource::new()))
    }

    pub fn with_rng(
        initial: Snapshot,
        rng: Box<dyn RandomSource>,
    ) -> (Self, LoopHandle, watch::Receiver<Snapshot>) {
        let handle = LoopHandle::new();
        let (tx, rx) = watch::channel(initial.clone());
        let sim = SimulationLoop {
            snapshot: initial,
            rng,
            handle: handle.clone(),
            tx,
        };
        (sim, handle, rx)
    }

    /// Run until stopped or until every receiver is gone. Pausing skips
    /// ticks without replaying them later.
    pub async fn run(mut self) {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_millis(TICK_INTERVAL_MS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if self.handle.is_stopped() {
                break;
            }
            if self.handle.is_paused() {
                continue;
            }

            let now = util::now_millis();
            self.snapshot = advance_snapshot(&self.snapshot, self.rng.as_mut(), now);
            if self.tx.send(self.snapshot.clone()).is_err() {
                // Consuming context is gone, stop ticking.
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::objects::{Signal, HISTORY_CAPACITY};
    use crate::market::random::{EntropySource, MidpointSource};

    fn seeded_pairs() -> Vec<(String, f64)> {
        vec![
            ("EUR/USD OTC".to_string(), 1.05420),
            ("USD/JPY OTC".to_string(), 154.65),
        ]
    }

    #[test]
    fn midpoint_tick_reproduces_hand_computed_state() {
        // Midpoint draws: step multiplier 1.0, perturbation 0, indicator
        // deltas 0. The tick must leave every derived value unchanged
        // except the timestamps.
        let seed_time = 1_700_000_000_000;
        let snapshot = Snapshot::seeded(&[("EUR/USD OTC".to_string(), 1.05420)], seed_time);
        let mut rng = MidpointSource;

        let next = advance_snapshot(&snapshot, &mut rng, seed_time + 500);
        let instrument = next.instrument("EUR/USD OTC").unwrap();

        assert_eq!(instrument.current_price, 1.05420);
        assert_eq!(instrument.change_percent, 0.0);
        assert_eq!(instrument.rsi, 50.0);
        assert_eq!(instrument.stochastic, 50.0);
        assert_eq!(instrument.signal, Signal::Neutral);
        assert_eq!(instrument.last_updated, seed_time + 500);
        assert_eq!(instrument.history.len(), HISTORY_CAPACITY);
        assert_eq!(instrument.history.latest().unwrap().timestamp, seed_time + 500);
    }

    #[test]
    fn every_instrument_advances_together() {
        let snapshot = Snapshot::seeded(&seeded_pairs(), 0);
        let mut rng = EntropySource::from_seed(99);

        let next = advance_snapshot(&snapshot, &mut rng, 500);

        assert_eq!(next.instruments.len(), snapshot.instruments.len());
        for (before, after) in snapshot.instruments.iter().zip(&next.instruments) {
            assert_eq!(before.symbol, after.symbol);
            assert_eq!(after.last_updated, 500);
            assert_eq!(after.history.len(), HISTORY_CAPACITY);
        }
    }

    #[test]
    fn change_percent_tracks_the_window_start() {
        let snapshot = Snapshot::seeded(&seeded_pairs(), 0);
        let mut rng = EntropySource::from_seed(7);

        let mut current = snapshot;
        for tick in 1..=50u64 {
            current = advance_snapshot(&current, &mut rng, tick * 500);
            for instrument in &current.instruments {
                let oldest = instrument.history.oldest().unwrap().value;
                let expected = (instrument.current_price - oldest) / oldest * 100.0;
                assert!((instrument.change_percent - expected).abs() < 1e-12);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn loop_publishes_whole_snapshots() {
        let snapshot = Snapshot::seeded(&seeded_pairs(), 0);
        let (sim, handle, mut rx) = SimulationLoop::new(snapshot);
        let task = tokio::spawn(sim.run());

        rx.changed().await.unwrap();
        {
            let latest = rx.borrow();
            assert_eq!(latest.instruments.len(), 2);
            assert!(latest.instruments.iter().all(|i| i.last_updated > 0));
        }

        handle.stop();
        task.await.unwrap();
        assert!(handle.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_suspends_publication_without_replay() {
        let snapshot = Snapshot::seeded(&seeded_pairs(), 0);
        let (sim, handle, mut rx) = SimulationLoop::new(snapshot);
        handle.pause();
        let task = tokio::spawn(sim.run());

        // Several tick periods elapse while paused; nothing may arrive.
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        assert!(!rx.has_changed().unwrap());

        handle.resume();
        rx.changed().await.unwrap();

        handle.stop();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_every_receiver_ends_the_loop() {
        let snapshot = Snapshot::seeded(&seeded_pairs(), 0);
        let (sim, _handle, rx) = SimulationLoop::new(snapshot);
        let task = tokio::spawn(sim.run());

        drop(rx);
        task.await.unwrap();
    }
}
