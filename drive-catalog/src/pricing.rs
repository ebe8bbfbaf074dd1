use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use crate::car::Car;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Price of one rental, computed once and shared by every caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RentalQuote {
    pub total_days: u32,
    pub price_per_day: f64,
    pub total_price: f64,
}

impl RentalQuote {
    pub fn for_car(car: &Car, pickup: NaiveDateTime, return_at: NaiveDateTime) -> Result<Self, PricingError> {
        let total_days = calculate_total_days(pickup, return_at)?;
        Ok(Self {
            total_days,
            price_per_day: car.price_per_day,
            total_price: calculate_total_price(total_days, car.price_per_day),
        })
    }
}

/// Whole rental days between pickup and return.
///
/// Partial days round up and the minimum is one day, so a same-day
/// rental is billed as a single day. A return before the pickup is
/// rejected instead of being silently mirrored.
pub fn calculate_total_days(pickup: NaiveDateTime, return_at: NaiveDateTime) -> Result<u32, PricingError> {
    if return_at < pickup {
        return Err(PricingError::InvertedRange {
            pickup: pickup.to_string(),
            return_at: return_at.to_string(),
        });
    }

    let seconds = (return_at - pickup).num_seconds();
    let days = (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;

    u32::try_from(days.max(1)).map_err(|_| PricingError::RangeTooLong(days))
}

pub fn calculate_total_price(days: u32, price_per_day: f64) -> f64 {
    f64::from(days) * price_per_day
}

/// Parse what date and datetime-local inputs send: `2025-11-03`,
/// `2025-11-03T10:30`, `2025-11-03T10:30:00` or a full RFC 3339 stamp
/// (converted to its naive UTC value).
pub fn parse_booking_instant(raw: &str) -> Result<NaiveDateTime, PricingError> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| PricingError::UnparseableDate(raw.to_string()))
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PricingError {
    #[error("Return {return_at} is before pickup {pickup}")]
    InvertedRange {
        pickup: String,
        return_at: String,
    },

    #[error("Rental of {0} days is out of range")]
    RangeTooLong(i64),

    #[error("Unrecognised date: {0}")]
    UnparseableDate(String),
}
