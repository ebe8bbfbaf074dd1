use chrono::{DateTime, Utc};
use drive_catalog::{parse_booking_instant, Car, PricingError, RentalQuote};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::intake::{ReservationForm, ValidatedReservation};

/// Snapshot of a reservation request taken when a soft hold is placed,
/// replayed once the visitor has an account.
///
/// Serialized with the form fields at the top level next to `carDetails`,
/// `totalDays`, `totalPrice` and `timestamp`, the layout browsers already
/// keep under the `pendingReservation` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingReservation {
    pub hold_id: Uuid,
    #[serde(flatten)]
    pub form: ReservationForm,
    pub car_details: Car,
    pub total_days: u32,
    pub total_price: f64,
    pub timestamp: DateTime<Utc>,
}

impl PendingReservation {
    pub fn new(
        hold_id: Uuid,
        reservation: &ValidatedReservation,
        car: Car,
        quote: RentalQuote,
        taken_at: DateTime<Utc>,
    ) -> Self {
        Self {
            hold_id,
            form: reservation.form.clone(),
            car_details: car,
            total_days: quote.total_days,
            total_price: quote.total_price,
            timestamp: taken_at,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Rebuilds the validated request from the stored form so it can be
    /// replayed to the backend. Dates are not re-checked against today.
    pub fn revalidated(&self) -> Result<ValidatedReservation, PricingError> {
        Ok(ValidatedReservation {
            form: self.form.clone(),
            pickup: parse_booking_instant(&self.form.pickup_date)?,
            return_at: parse_booking_instant(&self.form.return_date)?,
        })
    }
}
