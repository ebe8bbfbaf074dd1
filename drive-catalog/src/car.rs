use serde::{Deserialize, Deserializer, Serialize};

/// Vehicle categories offered by the fleet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CarType {
    Suv,
    Sedan,
    Bus,
    Van,
    LuxuryCar,
    #[serde(other)]
    Other,
}

impl CarType {
    pub fn label(&self) -> &'static str {
        match self {
            CarType::Suv => "SUV",
            CarType::Sedan => "Sedan",
            CarType::Bus => "Bus",
            CarType::Van => "Van",
            CarType::LuxuryCar => "Luxury Car",
            CarType::Other => "Other",
        }
    }
}

/// Availability as set by the business owner
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CarStatus {
    Available,
    Reserved,
    Unavailable,
}

impl CarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Available => "available",
            CarStatus::Reserved => "reserved",
            CarStatus::Unavailable => "unavailable",
        }
    }

    /// Dashboard toggle. A reserved car is locked until its reservation ends.
    pub fn toggled(&self) -> Option<CarStatus> {
        match self {
            CarStatus::Available => Some(CarStatus::Unavailable),
            CarStatus::Unavailable => Some(CarStatus::Available),
            CarStatus::Reserved => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WheelDrive {
    #[serde(rename = "2-wheel")]
    TwoWheel,
    #[serde(rename = "4-wheel")]
    FourWheel,
    #[serde(other)]
    Other,
}

impl WheelDrive {
    pub fn label(&self) -> &'static str {
        match self {
            WheelDrive::TwoWheel => "2-Wheel Drive",
            WheelDrive::FourWheel => "All-Wheel Drive (AWD)",
            WheelDrive::Other => "Unspecified",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Petrol,
    Diesel,
    Electric,
    Hybrid,
    #[serde(other)]
    Other,
}

impl FuelType {
    pub fn label(&self) -> &'static str {
        match self {
            FuelType::Petrol => "Petrol (Gasoline)",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
            FuelType::Other => "Unspecified",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    Manual,
    Automatic,
    #[serde(other)]
    Other,
}

impl Transmission {
    pub fn label(&self) -> &'static str {
        match self {
            Transmission::Manual => "Manual",
            Transmission::Automatic => "Automatic",
            Transmission::Other => "Unspecified",
        }
    }
}

/// A rentable car as the backend describes it.
///
/// The backend's integer primary key is kept as a string so ids coming
/// from query strings and JSON compare equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub colour: Option<String>,
    #[serde(default)]
    pub car_type: Option<CarType>,
    pub price_per_day: f64,
    #[serde(default)]
    pub pickup_location: Option<String>,
    pub status: CarStatus,
    #[serde(default)]
    pub rules: Option<String>,
    #[serde(default)]
    pub seating_capacity: Option<u32>,
    #[serde(default)]
    pub luggage_capacity: Option<u32>,
    #[serde(default)]
    pub wheel_drive: Option<WheelDrive>,
    #[serde(default)]
    pub fuel_type: Option<FuelType>,
    #[serde(default)]
    pub transmission: Option<Transmission>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub plate_number: Option<String>,
}

impl Car {
    /// Only available cars get an enabled Reserve action.
    pub fn is_reservable(&self) -> bool {
        self.status == CarStatus::Available
    }

    pub fn display_name(&self) -> String {
        if self.model.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.model)
        }
    }

    /// A photo URL that is actually usable, if any.
    pub fn photo_url(&self) -> Option<&str> {
        self.photo.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }
}

pub(crate) fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Num(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend_car() -> serde_json::Value {
        json!({
            "id": 12,
            "name": "Toyota",
            "model": "Highlander",
            "year": "2022-01-01",
            "colour": "Black",
            "car_type": "suv",
            "price_per_day": 1200.0,
            "pickup_location": "Ikeja",
            "status": "available",
            "rules": "No smoking",
            "seating_capacity": 7,
            "luggage_capacity": 4,
            "wheel_drive": "4-wheel",
            "fuel_type": "petrol",
            "transmission": "automatic",
            "photo": " ",
            "plate_number": "LAG-123",
            "created_at": "2025-10-01T10:00:00Z",
            "updated_at": "2025-10-01T10:00:00Z"
        })
    }

    #[test]
    fn test_backend_car_deserializes() {
        let car: Car = serde_json::from_value(backend_car()).unwrap();
        assert_eq!(car.id, "12");
        assert_eq!(car.car_type, Some(CarType::Suv));
        assert_eq!(car.wheel_drive.unwrap().label(), "All-Wheel Drive (AWD)");
        assert_eq!(car.display_name(), "Toyota Highlander");
        assert!(car.is_reservable());
        assert!(car.photo_url().is_none());
    }

    #[test]
    fn test_unknown_category_falls_back() {
        let mut raw = backend_car();
        raw["car_type"] = json!("pickup-truck");
        raw["id"] = json!("abc");
        let car: Car = serde_json::from_value(raw).unwrap();
        assert_eq!(car.car_type, Some(CarType::Other));
        assert_eq!(car.id, "abc");
    }

    #[test]
    fn test_toggle_rules() {
        assert_eq!(CarStatus::Available.toggled(), Some(CarStatus::Unavailable));
        assert_eq!(CarStatus::Unavailable.toggled(), Some(CarStatus::Available));
        assert_eq!(CarStatus::Reserved.toggled(), None);
    }
}
