use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reservation status in the dashboard lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Modified,
    Active,
    Completed,
    Cancelled,
    NoShow,
    Dispute,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 8] = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::Modified,
        ReservationStatus::Active,
        ReservationStatus::Completed,
        ReservationStatus::Cancelled,
        ReservationStatus::NoShow,
        ReservationStatus::Dispute,
    ];

    /// Value the backend stores.
    pub fn as_backend_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Modified => "modified",
            ReservationStatus::Active => "active",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::NoShow => "no-show",
            ReservationStatus::Dispute => "dispute",
        }
    }

    /// No further dashboard action applies.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReservationStatus::Completed | ReservationStatus::Cancelled)
    }

    /// Holds the car for its date range.
    pub fn occupies_car(&self) -> bool {
        matches!(self, ReservationStatus::Confirmed | ReservationStatus::Active)
    }

    /// Counts towards revenue.
    pub fn is_billable(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Confirmed | ReservationStatus::Active | ReservationStatus::Completed
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_backend_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = UnknownStatus;

    /// Case-insensitive; accepts the backend's `pennding` spelling and
    /// the usual separators for no-show.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let status = match normalized.as_str() {
            "pending" | "pennding" => ReservationStatus::Pending,
            "confirmed" => ReservationStatus::Confirmed,
            "modified" => ReservationStatus::Modified,
            "active" => ReservationStatus::Active,
            "completed" => ReservationStatus::Completed,
            "cancelled" | "canceled" => ReservationStatus::Cancelled,
            "no-show" | "noshow" => ReservationStatus::NoShow,
            "dispute" => ReservationStatus::Dispute,
            _ => return Err(UnknownStatus(raw.to_string())),
        };
        Ok(status)
    }
}

impl TryFrom<String> for ReservationStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReservationStatus> for String {
    fn from(status: ReservationStatus) -> Self {
        status.as_backend_str().to_string()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown reservation status: {0}")]
pub struct UnknownStatus(pub String);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReservationType {
    Soft,
    Firm,
}

/// What the customer sees: the dashboard statuses collapse to three.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Soft,
    Firm,
    Cancelled,
}

/// A reservation as returned by the backend.
///
/// The backend is inconsistent about `car` (bare id, nested object or a
/// list of nested objects) and about which contact fields it fills in,
/// so everything beyond id and status is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "car_reference")]
    pub car: Option<String>,
    #[serde(default)]
    pub reservation_type: Option<ReservationType>,
    pub status: ReservationStatus,
    #[serde(default)]
    pub guest_email: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub pickup_location: Option<String>,
    #[serde(default)]
    pub dropoff_location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

impl Reservation {
    pub fn customer_status(&self) -> CustomerStatus {
        if self.status == ReservationStatus::Cancelled {
            return CustomerStatus::Cancelled;
        }
        match self.reservation_type {
            Some(ReservationType::Firm) => CustomerStatus::Firm,
            _ => CustomerStatus::Soft,
        }
    }

    /// Where status e-mails go: the account's address, else the guest's.
    pub fn recipient(&self) -> Option<String> {
        self.user
            .as_ref()
            .and_then(|u| u.get("email"))
            .and_then(|e| e.as_str())
            .map(String::from)
            .or_else(|| self.customer_email.clone())
            .or_else(|| self.guest_email.clone())
            .filter(|e| !e.trim().is_empty())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    id_of(&value).ok_or_else(|| serde::de::Error::custom(format!("expected an id, got {}", value)))
}

fn car_reference<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match &value {
        serde_json::Value::Array(items) => items.first().and_then(id_of),
        other => id_of(other),
    })
}

fn id_of(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Object(map) => map.get("id").and_then(id_of),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parsing_tolerates_backend_spellings() {
        assert_eq!("pennding".parse::<ReservationStatus>().unwrap(), ReservationStatus::Pending);
        assert_eq!("Confirmed".parse::<ReservationStatus>().unwrap(), ReservationStatus::Confirmed);
        assert_eq!("no_show".parse::<ReservationStatus>().unwrap(), ReservationStatus::NoShow);
        assert_eq!("NoShow".parse::<ReservationStatus>().unwrap(), ReservationStatus::NoShow);
        assert!("archived".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_for_backend() {
        assert_eq!(serde_json::to_value(ReservationStatus::NoShow).unwrap(), json!("no-show"));
    }

    #[test]
    fn test_car_reference_shapes() {
        let bare: Reservation = serde_json::from_value(json!({"id": 1, "car": 4, "status": "pennding"})).unwrap();
        assert_eq!(bare.car.as_deref(), Some("4"));

        let nested: Reservation = serde_json::from_value(json!({
            "id": 2, "car": [{"id": 9, "name": "Kia"}], "status": "confirmed"
        }))
        .unwrap();
        assert_eq!(nested.car.as_deref(), Some("9"));

        let missing: Reservation = serde_json::from_value(json!({"id": "3", "status": "active"})).unwrap();
        assert_eq!(missing.car, None);
        assert_eq!(missing.id, "3");
    }

    #[test]
    fn test_customer_view_collapses_statuses() {
        let mut reservation: Reservation = serde_json::from_value(json!({
            "id": 1, "car": 4, "status": "confirmed", "reservation_type": "firm"
        }))
        .unwrap();
        assert_eq!(reservation.customer_status(), CustomerStatus::Firm);

        reservation.reservation_type = Some(ReservationType::Soft);
        assert_eq!(reservation.customer_status(), CustomerStatus::Soft);

        reservation.status = ReservationStatus::Cancelled;
        assert_eq!(reservation.customer_status(), CustomerStatus::Cancelled);
    }

    #[test]
    fn test_recipient_prefers_account_email() {
        let reservation: Reservation = serde_json::from_value(json!({
            "id": 1, "status": "confirmed",
            "guest_email": "guest@example.com",
            "user": {"email": "member@example.com"}
        }))
        .unwrap();
        assert_eq!(reservation.recipient().as_deref(), Some("member@example.com"));
    }
}
