//! Customer notices for status changes.

use crate::hold::SoftHold;
use crate::models::{Reservation, ReservationStatus};
use chrono::{DateTime, Utc};
use drive_catalog::Car;
use drive_shared::models::events::{NoticeKind, ReservationNotice};
use uuid::Uuid;

const SIGN_OFF: &str = "Thank you for choosing EasyDrive!";

struct Details<'a> {
    start: &'a str,
    end: &'a str,
    pickup: &'a str,
    dropoff: &'a str,
    status: &'a str,
}

fn describe(car: Option<&Car>, car_id: &str) -> (String, String) {
    match car {
        Some(car) => {
            let full = match car.year.as_deref() {
                Some(year) if !year.is_empty() => format!("{} {} {}", car.name, car.model, year),
                _ => format!("{} {}", car.name, car.model),
            };
            (car.name.clone(), full.trim().to_string())
        }
        None => {
            let label = format!("car #{}", car_id);
            (label.clone(), label)
        }
    }
}

fn render(kind: NoticeKind, short: &str, full: &str, d: &Details<'_>) -> (String, String) {
    let (subject_verb, opening, closing) = match kind {
        NoticeKind::Confirmed => (
            "has been confirmed",
            format!("Congratulations! Your reservation for {} has been confirmed.", full),
            None,
        ),
        NoticeKind::Modified => (
            "has been modified",
            format!("Your reservation for {} has been modified.", full),
            None,
        ),
        NoticeKind::Cancelled => (
            "has been cancelled",
            format!("Your reservation for {} has been cancelled.", full),
            Some("Visit our site now to make another reservation"),
        ),
        NoticeKind::Overridden => (
            "has been overridden",
            format!(
                "Your soft reservation for {} has been overridden by a registered user. The car is no longer reserved for you.",
                full
            ),
            Some("Create an account now to ensure a firm reservation when next you reserve a car"),
        ),
        NoticeKind::Expired => (
            "has expired",
            format!("Your soft reservation for {} has expired. The car is no longer held for you.", full),
            Some("Visit our site now to make another reservation"),
        ),
        NoticeKind::Firm => (
            "is now firm",
            format!("Your reservation for {} is now firm.", full),
            None,
        ),
    };

    let subject = format!("Your reservation for {} {}", short, subject_verb);

    let mut message = format!(
        "{}\n\nReservation Details:\nStart Date: {}\nEnd Date: {}\nPickup Location: {}\nDropoff Location: {}\nStatus: {}\n\n",
        opening, d.start, d.end, d.pickup, d.dropoff, d.status
    );
    if let Some(closing) = closing {
        message.push_str(closing);
        message.push('\n');
    }
    message.push_str(SIGN_OFF);

    (subject, message)
}

/// Notice for a dashboard or customer status change. Only confirmed,
/// modified and cancelled reservations notify the customer.
pub fn notice_for_reservation(
    reservation: &Reservation,
    car: Option<&Car>,
    now: DateTime<Utc>,
) -> Option<ReservationNotice> {
    let kind = match reservation.status {
        ReservationStatus::Confirmed => NoticeKind::Confirmed,
        ReservationStatus::Modified => NoticeKind::Modified,
        ReservationStatus::Cancelled => NoticeKind::Cancelled,
        _ => return None,
    };

    let car_id = reservation.car.clone().unwrap_or_default();
    let (short, full) = describe(car, &car_id);
    let pickup = reservation.pickup_location.as_deref().unwrap_or("");
    let details = Details {
        start: reservation.start_date.as_deref().unwrap_or(""),
        end: reservation.end_date.as_deref().unwrap_or(""),
        pickup,
        dropoff: reservation.dropoff_location.as_deref().unwrap_or(pickup),
        status: reservation.status.as_backend_str(),
    };
    let (subject, message) = render(kind, &short, &full, &details);

    Some(ReservationNotice {
        id: Uuid::new_v4(),
        kind,
        reservation_ref: reservation.id.clone(),
        car_id,
        recipient: reservation.recipient(),
        subject,
        message,
        emitted_at: now,
    })
}

/// Notice for a soft hold that turned firm, lapsed or lost its car.
pub fn notice_for_hold(
    hold: &SoftHold,
    kind: NoticeKind,
    car: Option<&Car>,
    now: DateTime<Utc>,
) -> ReservationNotice {
    let (short, full) = describe(car, &hold.car_id);
    let start = hold.pickup.format("%Y-%m-%d %H:%M").to_string();
    let end = hold.return_at.format("%Y-%m-%d %H:%M").to_string();
    let pickup = car.and_then(|c| c.pickup_location.as_deref()).unwrap_or("");
    let details = Details {
        start: &start,
        end: &end,
        pickup,
        dropoff: pickup,
        status: hold.state.name(),
    };
    let (subject, message) = render(kind, &short, &full, &details);

    ReservationNotice {
        id: Uuid::new_v4(),
        kind,
        reservation_ref: hold.id.to_string(),
        car_id: hold.car_id.clone(),
        recipient: hold.recipient.clone(),
        subject,
        message,
        emitted_at: now,
    }
}
