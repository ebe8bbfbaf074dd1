use crate::models::{Reservation, ReservationStatus};
use drive_catalog::{calculate_total_days, calculate_total_price, parse_booking_instant, Car};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReservedCar {
    pub car_id: String,
    pub reservation_id: String,
    pub name: Option<String>,
    pub status: ReservationStatus,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Dashboard summary built from the backend's reservation and car lists.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardReport {
    pub total_reservations: usize,
    pub status_counts: BTreeMap<String, usize>,
    pub reserved_cars: Vec<ReservedCar>,
    pub revenue: f64,
    /// Billable reservations left out of revenue (unknown car or dates).
    pub unpriced_reservations: usize,
}

impl DashboardReport {
    pub fn build(reservations: &[Reservation], cars: &[Car]) -> Self {
        let cars_by_id: HashMap<&str, &Car> = cars.iter().map(|c| (c.id.as_str(), c)).collect();

        let mut status_counts: BTreeMap<String, usize> = ReservationStatus::ALL
            .iter()
            .map(|s| (s.as_backend_str().to_string(), 0))
            .collect();
        let mut reserved_cars = Vec::new();
        let mut revenue = 0.0;
        let mut unpriced = 0;

        for reservation in reservations {
            *status_counts
                .entry(reservation.status.as_backend_str().to_string())
                .or_insert(0) += 1;

            let car = reservation.car.as_deref().and_then(|id| cars_by_id.get(id).copied());

            if reservation.status.occupies_car() {
                if let Some(car_id) = &reservation.car {
                    reserved_cars.push(ReservedCar {
                        car_id: car_id.clone(),
                        reservation_id: reservation.id.clone(),
                        name: car.map(Car::display_name),
                        status: reservation.status,
                        start_date: reservation.start_date.clone(),
                        end_date: reservation.end_date.clone(),
                    });
                }
            }

            if reservation.status.is_billable() {
                match car.and_then(|car| billed_amount(reservation, car)) {
                    Some(amount) => revenue += amount,
                    None => unpriced += 1,
                }
            }
        }

        Self {
            total_reservations: reservations.len(),
            status_counts,
            reserved_cars,
            revenue,
            unpriced_reservations: unpriced,
        }
    }
}

fn billed_amount(reservation: &Reservation, car: &Car) -> Option<f64> {
    let start = parse_booking_instant(reservation.start_date.as_deref()?).ok()?;
    let end = parse_booking_instant(reservation.end_date.as_deref()?).ok()?;
    let days = calculate_total_days(start, end).ok()?;
    Some(calculate_total_price(days, car.price_per_day))
}
