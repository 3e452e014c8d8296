use serde::{Deserialize, Serialize};

/// Points retained per instrument. Seeding always fills the buffer, so
/// every consumer can assume exactly this many points.
pub const HISTORY_CAPACITY: usize = 40;

/// Simulation period in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 500;

/// Synthetic spacing between seeded history points.
pub const SEED_SPACING_MS: u64 = 1_000;

/// How far back the trend term looks (in ticks).
pub const TREND_LOOKBACK: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: u64,
    pub value: f64,
}

/// Fixed-capacity, oldest-first price series. A push appends the new point
/// and trims the front, so the length never changes once seeded.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    points: Vec<PricePoint>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Fill the buffer with `capacity` copies of `base_price`, spaced one
    /// synthetic second apart and ending at `now`.
    pub fn seeded(base_price: f64, capacity: usize, now: u64) -> Self {
        let points = (0..capacity)
            .map(|i| PricePoint {
                timestamp: now.saturating_sub((capacity - 1 - i) as u64 * SEED_SPACING_MS),
                value: base_price,
            })
            .collect();
        HistoryBuffer { points, capacity }
    }

    pub fn push(&mut self, point: PricePoint) {
        self.points.push(point);
        while self.points.len() > self.capacity {
            self.points.remove(0);
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn oldest(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// The n-th most recent point, `n = 1` being the latest.
    pub fn nth_most_recent(&self, n: usize) -> Option<&PricePoint> {
        if n == 0 || n > self.points.len() {
            return None;
        }
        self.points.get(self.points.len() - n)
    }
}

/// Base step size of the simulated random walk. High-nominal pairs (JPY
/// quotes) move in larger absolute increments purely because of their
/// quote scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolatilityClass {
    Standard,
    HighNominal,
}

impl VolatilityClass {
    pub fn for_symbol(symbol: &str) -> Self {
        if symbol.contains("JPY") {
            VolatilityClass::HighNominal
        } else {
            VolatilityClass::Standard
        }
    }

    pub fn base_step(&self) -> f64 {
        match self {
            VolatilityClass::Standard => 0.00008,
            VolatilityClass::HighNominal => 0.03,
        }
    }

    /// Display precision for prices of this quote scale.
    pub fn decimals(&self) -> usize {
        match self {
            VolatilityClass::Standard => 5,
            VolatilityClass::HighNominal => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl Signal {
    pub fn is_bullish(&self) -> bool {
        matches!(self, Signal::StrongBuy | Signal::Buy)
    }

    pub fn is_bearish(&self) -> bool {
        matches!(self, Signal::StrongSell | Signal::Sell)
    }

    pub fn is_strong(&self) -> bool {
        matches!(self, Signal::StrongBuy | Signal::StrongSell)
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let label = match self {
            Signal::StrongBuy => "STRONG BUY",
            Signal::Buy => "BUY",
            Signal::Neutral => "NEUTRAL",
            Signal::Sell => "SELL",
            Signal::StrongSell => "STRONG SELL",
        };
        write!(f, "{}", label)
    }
}

/// Display expiry selected by the viewer. Only carried through to the
/// analysis prompt and delivery message; the simulation itself always
/// ticks at `TICK_INTERVAL_MS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5s")]
    S5,
    #[serde(rename = "15s")]
    S15,
    #[serde(rename = "30s")]
    S30,
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::S30
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let label = match self {
            Timeframe::S5 => "5s",
            Timeframe::S15 => "15s",
            Timeframe::S30 => "30s",
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone)]
pub struct InstrumentState {
    pub symbol: String,
    pub current_price: f64,
    pub history: HistoryBuffer,
    pub change_percent: f64,
    pub rsi: f64,
    pub stochastic: f64,
    pub signal: Signal,
    pub last_updated: u64,
}

impl InstrumentState {
    /// Fresh instrument at session start: full history of the base price,
    /// indicators at their midpoints, no signal yet.
    pub fn seeded(symbol: &str, base_price: f64, now: u64) -> Self {
        InstrumentState {
            symbol: symbol.to_string(),
            current_price: base_price,
            history: HistoryBuffer::seeded(base_price, HISTORY_CAPACITY, now),
            change_percent: 0.0,
            rsi: 50.0,
            stochastic: 50.0,
            signal: Signal::Neutral,
            last_updated: now,
        }
    }

    pub fn volatility_class(&self) -> VolatilityClass {
        VolatilityClass::for_symbol(&self.symbol)
    }
}

/// Complete per-tick market state. The simulation loop always publishes a
/// whole new snapshot, never a partially updated one.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub instruments: Vec<InstrumentState>,
}

impl Snapshot {
    /// Seed a snapshot from `(symbol, base_price)` pairs, preserving their
    /// order.
    pub fn seeded(pairs: &[(String, f64)], now: u64) -> Self {
        let instruments = pairs
            .iter()
            .map(|(symbol, base_price)| InstrumentState::seeded(symbol, *base_price, now))
            .collect();
        Snapshot { instruments }
    }

    pub fn instrument(&self, symbol: &str) -> Option<&InstrumentState> {
        self.instruments.iter().find(|i| i.symbol == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_history_is_full_and_oldest_first() {
        let history = HistoryBuffer::seeded(1.05420, HISTORY_CAPACITY, 1_700_000_000_000);
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert!(history.as_slice().iter().all(|p| p.value == 1.05420));

        let timestamps: Vec<u64> = history.as_slice().iter().map(|p| p.timestamp).collect();
        for pair in timestamps.windows(2) {
            assert_eq!(pair[1] - pair[0], SEED_SPACING_MS);
        }
        assert_eq!(history.latest().unwrap().timestamp, 1_700_000_000_000);
    }

    #[test]
    fn push_keeps_capacity_and_evicts_oldest() {
        let mut history = HistoryBuffer::seeded(1.0, HISTORY_CAPACITY, 40_000);
        let evicted = *history.oldest().unwrap();

        history.push(PricePoint {
            timestamp: 41_000,
            value: 2.0,
        });

        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_ne!(*history.oldest().unwrap(), evicted);
        assert_eq!(history.latest().unwrap().value, 2.0);
    }

    #[test]
    fn capacity_holds_over_many_pushes() {
        let mut history = HistoryBuffer::seeded(1.0, HISTORY_CAPACITY, 0);
        for i in 0..1_000u64 {
            assert_eq!(history.len(), HISTORY_CAPACITY);
            history.push(PricePoint {
                timestamp: i,
                value: i as f64,
            });
            assert_eq!(history.len(), HISTORY_CAPACITY);
        }
    }

    #[test]
    fn nth_most_recent_counts_from_the_live_edge() {
        let mut history = HistoryBuffer::seeded(0.0, HISTORY_CAPACITY, 40_000);
        history.push(PricePoint {
            timestamp: 41_000,
            value: 7.0,
        });

        assert_eq!(history.nth_most_recent(1).unwrap().value, 7.0);
        assert_eq!(
            history.nth_most_recent(HISTORY_CAPACITY).unwrap(),
            history.oldest().unwrap()
        );
        assert!(history.nth_most_recent(0).is_none());
        assert!(history.nth_most_recent(HISTORY_CAPACITY + 1).is_none());
    }

    #[test]
    fn volatility_class_follows_quote_scale() {
        assert_eq!(
            VolatilityClass::for_symbol("USD/JPY OTC"),
            VolatilityClass::HighNominal
        );
        assert_eq!(
            VolatilityClass::for_symbol("EUR/USD OTC"),
            VolatilityClass::Standard
        );
        assert!(VolatilityClass::HighNominal.base_step() > VolatilityClass::Standard.base_step());
    }
}
