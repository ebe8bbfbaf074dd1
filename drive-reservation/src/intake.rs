//! The reservation intake form: a typed record with a fixed field set and
//! one validation pass that reports every problem at once.

use chrono::{NaiveDate, NaiveDateTime};
use drive_catalog::{parse_booking_instant, Car, PricingError, RentalQuote};
use drive_core::validation::{collect_field_errors, FieldError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

/// Required fields in display order, with the message shown when empty.
const REQUIRED_FIELDS: &[(&str, &str)] = &[
    ("car", "Please select a car."),
    ("customer_name", "Full name is required."),
    ("customer_email", "Email address is required."),
    ("customer_phone", "Phone number is required."),
    ("pickup_date", "Pickup date is required."),
    ("return_date", "Return date is required."),
    ("pickup_location", "Pickup location is required."),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ReservationForm {
    #[serde(default)]
    pub car: String,
    #[serde(default)]
    pub customer_name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub pickup_date: String,
    #[serde(default)]
    pub return_date: String,
    #[serde(default)]
    pub pickup_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dropoff_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

/// A form that passed validation, with its dates parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedReservation {
    pub form: ReservationForm,
    pub pickup: NaiveDateTime,
    pub return_at: NaiveDateTime,
}

impl ReservationForm {
    fn field(&self, name: &str) -> &str {
        match name {
            "car" => &self.car,
            "customer_name" => &self.customer_name,
            "customer_email" => &self.customer_email,
            "customer_phone" => &self.customer_phone,
            "pickup_date" => &self.pickup_date,
            "return_date" => &self.return_date,
            "pickup_location" => &self.pickup_location,
            _ => "",
        }
    }

    /// Presence, format and date-range checks. `today` is the server's
    /// calendar date; neither date may precede it and the return must come
    /// strictly after the pickup.
    pub fn check(&self, today: NaiveDate) -> Result<ValidatedReservation, Vec<FieldError>> {
        let mut errors: Vec<FieldError> = REQUIRED_FIELDS
            .iter()
            .filter(|(name, _)| self.field(name).trim().is_empty())
            .map(|(name, message)| FieldError::new(*name, *message))
            .collect();

        if !self.customer_email.trim().is_empty() {
            if let Err(invalid) = self.validate() {
                errors.extend(collect_field_errors(&invalid, &["customer_email"]));
            }
        }

        let pickup = Self::parse_date(&self.pickup_date, "pickup_date", "Pickup", &mut errors);
        let return_at = Self::parse_date(&self.return_date, "return_date", "Return", &mut errors);

        if let (Some(pickup), Some(return_at)) = (pickup, return_at) {
            if pickup.date() < today {
                errors.push(FieldError::new("pickup_date", "Pickup date cannot be in the past."));
            }
            if return_at.date() < today {
                errors.push(FieldError::new("return_date", "Return date cannot be in the past."));
            } else if return_at <= pickup {
                errors.push(FieldError::new("return_date", "Return date must be after pickup date."));
            }

            if errors.is_empty() {
                return Ok(ValidatedReservation { form: self.clone(), pickup, return_at });
            }
        }

        Err(errors)
    }

    fn parse_date(raw: &str, field: &str, label: &str, errors: &mut Vec<FieldError>) -> Option<NaiveDateTime> {
        if raw.trim().is_empty() {
            return None;
        }
        match parse_booking_instant(raw) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.push(FieldError::new(field, format!("{} date is not a valid date.", label)));
                None
            }
        }
    }
}

impl ValidatedReservation {
    pub fn quote(&self, car: &Car) -> Result<RentalQuote, PricingError> {
        RentalQuote::for_car(car, self.pickup, self.return_at)
    }

    /// Body for the backend's reservation-creation endpoint. The drop-off
    /// defaults to the pickup location.
    pub fn backend_payload(&self) -> Value {
        let form = &self.form;
        json!({
            "car": form.car,
            "customer_name": form.customer_name,
            "customer_email": form.customer_email,
            "guest_email": form.customer_email,
            "customer_phone": form.customer_phone,
            "address": form.address,
            "pickup_location": form.pickup_location,
            "dropoff_location": form.dropoff_location.as_deref().unwrap_or(&form.pickup_location),
            "start_date": self.pickup.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "end_date": self.return_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "additional_notes": form.additional_notes,
        })
    }
}
