pub mod models;
pub mod manager;
pub mod intake;
pub mod pending;
pub mod hold;
pub mod notify;
pub mod reports;

pub use models::{CustomerStatus, Reservation, ReservationStatus, ReservationType};
pub use manager::{action_for, plan_transition, DashboardAction, ReservationError};
pub use intake::{ReservationForm, ValidatedReservation};
pub use pending::PendingReservation;
pub use hold::{FirmOutcome, HoldError, HoldLedger, HoldState, SoftHold};
pub use reports::DashboardReport;
