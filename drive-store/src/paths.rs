//! Backend endpoints, relative to the configured base URL.

pub const CARS: &str = "/api/v1/car/";
pub const CAR_NEW: &str = "/api/v1/car/new/";

pub fn car(id: &str) -> String {
    format!("/api/v1/car/{}/", id)
}

pub fn car_update(id: &str) -> String {
    format!("/api/v1/car/{}/update/", id)
}

pub fn car_delete(id: &str) -> String {
    format!("/api/v1/car/{}/delete/", id)
}

pub const RESERVATIONS: &str = "/api/v1/reservation/";
pub const RESERVATION_NEW: &str = "/api/v1/reservation/new/";

pub fn reservation(id: &str) -> String {
    format!("/api/v1/reservation/{}/", id)
}

pub fn reservation_update(id: &str) -> String {
    format!("/api/v1/reservation/{}/update/", id)
}

pub fn reservation_cancel(id: &str) -> String {
    format!("/api/v1/reservation/{}/cancel/", id)
}

pub const SIGNUP: &str = "/api/v1/account/auth/users/";
pub const ACTIVATION: &str = "/api/v1/account/auth/users/activation/";
pub const SIGNIN: &str = "/api/v1/account/auth/jwt/create/";
