//! Daily trade and volume caps.

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::port::outbound::policy::{PolicyDenial, TradePolicy};

#[derive(Debug)]
struct Day {
    date: NaiveDate,
    trades: u32,
    volume: Decimal,
}

/// Caps trades and traded volume per UTC day. A cap of `None` is unlimited.
#[derive(Debug)]
pub struct DailyCapPolicy {
    max_trades: Option<u32>,
    max_volume: Option<Decimal>,
    day: Mutex<Day>,
}

impl DailyCapPolicy {
    #[must_use]
    pub fn new(max_trades: Option<u32>, max_volume: Option<Decimal>) -> Self {
        Self {
            max_trades,
            max_volume,
            day: Mutex::new(Day {
                date: Utc::now().date_naive(),
                trades: 0,
                volume: Decimal::ZERO,
            }),
        }
    }

    /// Trades and volume recorded today.
    #[must_use]
    pub fn usage(&self) -> (u32, Decimal) {
        let mut day = self.day.lock();
        roll(&mut day, Utc::now());
        (day.trades, day.volume)
    }

    pub fn admit_at(&self, amount: Decimal, now: DateTime<Utc>) -> Result<(), PolicyDenial> {
        let mut day = self.day.lock();
        roll(&mut day, now);
        if let Some(limit) = self.max_trades {
            if day.trades >= limit {
                return Err(PolicyDenial::TradeCap {
                    count: day.trades,
                    limit,
                });
            }
        }
        if let Some(limit) = self.max_volume {
            if day.volume + amount > limit {
                return Err(PolicyDenial::VolumeCap {
                    volume: day.volume,
                    amount,
                    limit,
                });
            }
        }
        Ok(())
    }

    pub fn record_trade_at(&self, amount: Decimal, now: DateTime<Utc>) {
        let mut day = self.day.lock();
        roll(&mut day, now);
        day.trades = day.trades.saturating_add(1);
        if amount > Decimal::ZERO {
            day.volume += amount;
        }
    }
}

fn roll(day: &mut Day, now: DateTime<Utc>) {
    let today = now.date_naive();
    if today > day.date {
        *day = Day {
            date: today,
            trades: 0,
            volume: Decimal::ZERO,
        };
    }
}

impl TradePolicy for DailyCapPolicy {
    fn admit(&self, amount: Decimal) -> Result<(), PolicyDenial> {
        self.admit_at(amount, Utc::now())
    }

    fn record_trade(&self, amount: Decimal) {
        self.record_trade_at(amount, Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trade_cap() {
        let policy = DailyCapPolicy::new(Some(2), None);
        let now = Utc::now();
        policy.record_trade_at(dec!(10.0), now);
        assert!(policy.admit_at(dec!(10.0), now).is_ok());
        policy.record_trade_at(dec!(10.0), now);
        assert_eq!(
            policy.admit_at(dec!(10.0), now),
            Err(PolicyDenial::TradeCap { count: 2, limit: 2 })
        );
    }

    #[test]
    fn test_volume_cap() {
        let policy = DailyCapPolicy::new(None, Some(dec!(100)));
        let now = Utc::now();
        policy.record_trade_at(dec!(70.0), now);
        assert!(policy.admit_at(dec!(30.0), now).is_ok());
        assert!(matches!(
            policy.admit_at(dec!(30.5), now),
            Err(PolicyDenial::VolumeCap { .. })
        ));
    }

    #[test]
    fn test_caps_reset_next_day() {
        let policy = DailyCapPolicy::new(Some(1), Some(dec!(10)));
        let now = Utc::now();
        policy.record_trade_at(dec!(10.0), now);
        assert!(policy.admit_at(dec!(1.0), now).is_err());
        assert!(policy.admit_at(dec!(1.0), now + Duration::days(1)).is_ok());
    }
}
