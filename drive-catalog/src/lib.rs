pub mod car;
pub mod pricing;

pub use car::{Car, CarStatus, CarType, FuelType, Transmission, WheelDrive};
pub use pricing::{calculate_total_days, calculate_total_price, parse_booking_instant, PricingError, RentalQuote};
