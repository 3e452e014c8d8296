use crate::market::objects::Signal;

/// Map the simulated oscillators and the short-horizon trend to a discrete
/// signal. Checked in priority order; the strong conditions are evaluated
/// before the trend-gated ones so an oversold-and-oversold reading wins
/// regardless of trend direction.
pub fn classify(rsi: f64, stochastic: f64, trend: f64) -> Signal {
    if rsi < 30.0 && stochastic < 20.0 {
        return Signal::StrongBuy;
    }
    if rsi > 70.0 && stochastic > 80.0 {
        return Signal::StrongSell;
    }
    if rsi < 45.0 && trend > 0.0 {
        return Signal::Buy;
    }
    if rsi > 55.0 && trend < 0.0 {
        return Signal::Sell;
    }
    Signal::Neutral
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_buy_wins_over_buy() {
        // Oversold on both oscillators classifies strong even with a
        // positive trend that would also satisfy the plain buy rule.
        assert_eq!(classify(25.0, 15.0, 1.0), Signal::StrongBuy);
        assert_eq!(classify(25.0, 15.0, -1.0), Signal::StrongBuy);
    }

    #[test]
    fn strong_sell_wins_over_sell() {
        assert_eq!(classify(75.0, 85.0, -1.0), Signal::StrongSell);
        assert_eq!(classify(75.0, 85.0, 1.0), Signal::StrongSell);
    }

    #[test]
    fn buy_and_sell_require_a_trend() {
        assert_eq!(classify(40.0, 50.0, 1.0), Signal::Buy);
        assert_eq!(classify(40.0, 50.0, 0.0), Signal::Neutral);
        assert_eq!(classify(40.0, 50.0, -1.0), Signal::Neutral);

        assert_eq!(classify(60.0, 50.0, -1.0), Signal::Sell);
        assert_eq!(classify(60.0, 50.0, 0.0), Signal::Neutral);
        assert_eq!(classify(60.0, 50.0, 1.0), Signal::Neutral);
    }

    #[test]
    fn thresholds_are_exclusive() {
        // Exact threshold values fall through to the next rule.
        assert_eq!(classify(30.0, 20.0, 0.0), Signal::Neutral);
        assert_eq!(classify(70.0, 80.0, 0.0), Signal::Neutral);
        assert_eq!(classify(45.0, 50.0, 1.0), Signal::Neutral);
        assert_eq!(classify(55.0, 50.0, -1.0), Signal::Neutral);
    }

    #[test]
    fn midrange_is_neutral() {
        assert_eq!(classify(50.0, 50.0, 0.0), Signal::Neutral);
    }
}
