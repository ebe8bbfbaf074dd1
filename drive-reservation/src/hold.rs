use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Where a hold is in its lifecycle. "No reservation" is the absence of
/// a hold in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HoldState {
    SoftReserved {
        expires_at: DateTime<Utc>,
    },
    FirmReserved {
        reservation_ref: Option<String>,
        confirmed_at: DateTime<Utc>,
    },
    Expired {
        at: DateTime<Utc>,
    },
    Overridden {
        by: Uuid,
        at: DateTime<Utc>,
    },
    /// A firm hold whose reservation was cancelled on the backend.
    Cancelled {
        at: DateTime<Utc>,
    },
}

impl HoldState {
    pub fn name(&self) -> &'static str {
        match self {
            HoldState::SoftReserved { .. } => "soft_reserved",
            HoldState::FirmReserved { .. } => "firm_reserved",
            HoldState::Expired { .. } => "expired",
            HoldState::Overridden { .. } => "overridden",
            HoldState::Cancelled { .. } => "cancelled",
        }
    }
}

/// A claim on one car for one date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoftHold {
    pub id: Uuid,
    pub car_id: String,
    pub pickup: NaiveDateTime,
    pub return_at: NaiveDateTime,
    pub placed_at: DateTime<Utc>,
    #[serde(skip)]
    pub recipient: Option<String>,
    #[serde(flatten)]
    pub state: HoldState,
}

impl SoftHold {
    /// Same car and intersecting half-open ranges `[pickup, return)`.
    pub fn overlaps(&self, car_id: &str, pickup: NaiveDateTime, return_at: NaiveDateTime) -> bool {
        self.car_id == car_id && self.pickup < return_at && pickup < self.return_at
    }

    /// State as of `now`; a soft hold past its deadline reads as expired
    /// even before the sweeper has visited it.
    pub fn state_at(&self, now: DateTime<Utc>) -> HoldState {
        match &self.state {
            HoldState::SoftReserved { expires_at } if now >= *expires_at => HoldState::Expired { at: *expires_at },
            other => other.clone(),
        }
    }

    fn is_live_soft(&self, now: DateTime<Utc>) -> bool {
        matches!(self.state_at(now), HoldState::SoftReserved { .. })
    }

    fn is_firm(&self) -> bool {
        matches!(self.state, HoldState::FirmReserved { .. })
    }

    fn settled_at(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            HoldState::SoftReserved { .. } => None,
            HoldState::FirmReserved { confirmed_at, .. } => Some(*confirmed_at),
            HoldState::Expired { at } | HoldState::Overridden { at, .. } | HoldState::Cancelled { at } => Some(*at),
        }
    }

    fn view(&self, now: DateTime<Utc>) -> SoftHold {
        SoftHold { state: self.state_at(now), ..self.clone() }
    }
}

/// Result of a hold turning firm.
#[derive(Debug, Clone)]
pub struct FirmOutcome {
    pub hold: SoftHold,
    /// Soft holds of other visitors that lost the car.
    pub overridden: Vec<SoftHold>,
}

/// In-process ledger of soft and firm holds.
///
/// All time-dependent decisions take `now` from the caller's clock.
pub struct HoldLedger {
    holds: HashMap<Uuid, SoftHold>,
    window: Duration,
}

impl HoldLedger {
    pub fn new(window: Duration) -> Self {
        Self {
            holds: HashMap::new(),
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// `NoReservation -> SoftReserved`. Refused while a firm hold covers
    /// any part of the range; other soft holds do not block.
    pub fn place_soft(
        &mut self,
        car_id: &str,
        pickup: NaiveDateTime,
        return_at: NaiveDateTime,
        recipient: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SoftHold, HoldError> {
        if let Some(firm) = self
            .holds
            .values()
            .find(|h| h.is_firm() && h.overlaps(car_id, pickup, return_at))
        {
            return Err(HoldError::Conflict {
                car_id: car_id.to_string(),
                firm_hold: firm.id,
            });
        }

        let hold = SoftHold {
            id: Uuid::new_v4(),
            car_id: car_id.to_string(),
            pickup,
            return_at,
            placed_at: now,
            recipient,
            state: HoldState::SoftReserved {
                expires_at: now + self.window,
            },
        };
        self.holds.insert(hold.id, hold.clone());
        Ok(hold)
    }

    pub fn get(&self, hold_id: &Uuid, now: DateTime<Utc>) -> Option<SoftHold> {
        self.holds.get(hold_id).map(|h| h.view(now))
    }

    /// Checks that a hold can still turn firm. Called before the backend
    /// is asked to create the reservation.
    pub fn ensure_convertible(&self, hold_id: &Uuid, now: DateTime<Utc>) -> Result<SoftHold, HoldError> {
        let hold = self.holds.get(hold_id).ok_or(HoldError::NotFound(*hold_id))?;

        match hold.state_at(now) {
            HoldState::SoftReserved { .. } => Ok(hold.clone()),
            HoldState::Expired { at } => Err(HoldError::Expired { id: *hold_id, at }),
            HoldState::Overridden { by, .. } => Err(HoldError::Overridden { id: *hold_id, by }),
            HoldState::FirmReserved { .. } => Err(HoldError::AlreadyFirm(*hold_id)),
            HoldState::Cancelled { .. } => Err(HoldError::Cancelled(*hold_id)),
        }
    }

    /// `SoftReserved -> FirmReserved`, after the backend accepted the
    /// reservation. The window was checked by `ensure_convertible`, so a
    /// hold that lapsed while the backend call was in flight still turns
    /// firm; one overridden meanwhile does not.
    pub fn mark_firm(
        &mut self,
        hold_id: &Uuid,
        reservation_ref: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<FirmOutcome, HoldError> {
        let hold = self.holds.get_mut(hold_id).ok_or(HoldError::NotFound(*hold_id))?;

        match &hold.state {
            HoldState::Overridden { by, .. } => {
                return Err(HoldError::Overridden { id: *hold_id, by: *by })
            }
            HoldState::FirmReserved { .. } => return Err(HoldError::AlreadyFirm(*hold_id)),
            HoldState::Cancelled { .. } => return Err(HoldError::Cancelled(*hold_id)),
            HoldState::SoftReserved { .. } | HoldState::Expired { .. } => {}
        }

        hold.state = HoldState::FirmReserved {
            reservation_ref,
            confirmed_at: now,
        };
        let hold = hold.clone();
        let overridden = self.override_overlapping(&hold, now);

        Ok(FirmOutcome { hold, overridden })
    }

    /// Registers a firm reservation made without a prior soft hold
    /// (a signed-in customer booking directly).
    pub fn record_firm(
        &mut self,
        car_id: &str,
        pickup: NaiveDateTime,
        return_at: NaiveDateTime,
        reservation_ref: Option<String>,
        now: DateTime<Utc>,
    ) -> FirmOutcome {
        let hold = SoftHold {
            id: Uuid::new_v4(),
            car_id: car_id.to_string(),
            pickup,
            return_at,
            placed_at: now,
            recipient: None,
            state: HoldState::FirmReserved {
                reservation_ref,
                confirmed_at: now,
            },
        };
        self.holds.insert(hold.id, hold.clone());
        let overridden = self.override_overlapping(&hold, now);

        FirmOutcome { hold, overridden }
    }

    /// `FirmReserved -> Cancelled` for every firm hold backing the given
    /// backend reservation, so its dates are free for new soft holds.
    pub fn release(&mut self, reservation_ref: &str, now: DateTime<Utc>) -> Vec<SoftHold> {
        let mut released = Vec::new();

        for hold in self.holds.values_mut() {
            let HoldState::FirmReserved { reservation_ref: Some(held_ref), .. } = &hold.state else {
                continue;
            };
            if held_ref == reservation_ref {
                hold.state = HoldState::Cancelled { at: now };
                released.push(hold.clone());
            }
        }

        released
    }

    /// Drops a soft hold whose placement could not be completed.
    pub fn withdraw(&mut self, hold_id: &Uuid) -> Option<SoftHold> {
        match self.holds.get(hold_id) {
            Some(hold) if matches!(hold.state, HoldState::SoftReserved { .. }) => self.holds.remove(hold_id),
            _ => None,
        }
    }

    fn override_overlapping(&mut self, firm: &SoftHold, now: DateTime<Utc>) -> Vec<SoftHold> {
        let mut overridden = Vec::new();

        for other in self.holds.values_mut() {
            if other.id == firm.id || !other.is_live_soft(now) {
                continue;
            }
            if other.overlaps(&firm.car_id, firm.pickup, firm.return_at) {
                other.state = HoldState::Overridden { by: firm.id, at: now };
                tracing::debug!("Soft hold {} on car {} overridden by {}", other.id, other.car_id, firm.id);
                overridden.push(other.clone());
            }
        }

        overridden
    }

    /// `SoftReserved -> Expired` for every hold past its deadline.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) -> Vec<SoftHold> {
        let mut expired = Vec::new();

        for hold in self.holds.values_mut() {
            if let HoldState::SoftReserved { expires_at } = hold.state {
                if now >= expires_at {
                    hold.state = HoldState::Expired { at: expires_at };
                    expired.push(hold.clone());
                }
            }
        }

        expired
    }

    /// Drops settled holds once they are older than `retain`. Firm holds
    /// are kept until their return date has passed so they keep blocking
    /// new soft holds.
    pub fn prune(&mut self, now: DateTime<Utc>, retain: Duration) -> usize {
        let before = self.holds.len();
        let today = now.naive_utc();

        self.holds.retain(|_, hold| match hold.settled_at() {
            None => true,
            Some(_) if hold.is_firm() => hold.return_at > today,
            Some(at) => now - at < retain,
        });

        before - self.holds.len()
    }

    pub fn active_count(&self, now: DateTime<Utc>) -> usize {
        self.holds.values().filter(|h| h.is_live_soft(now)).count()
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum HoldError {
    #[error("Soft reservation not found: {0}")]
    NotFound(Uuid),

    #[error("Soft reservation {id} expired at {at}")]
    Expired { id: Uuid, at: DateTime<Utc> },

    #[error("Soft reservation {id} was overridden by a firm reservation ({by})")]
    Overridden { id: Uuid, by: Uuid },

    #[error("Soft reservation {0} is already firm")]
    AlreadyFirm(Uuid),

    #[error("Reservation for hold {0} was cancelled")]
    Cancelled(Uuid),

    #[error("Car {car_id} is firmly reserved for part of this period")]
    Conflict { car_id: String, firm_hold: Uuid },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use drive_catalog::parse_booking_instant;

    fn at(raw: &str) -> NaiveDateTime {
        parse_booking_instant(raw).unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 1, 8, 0, 0).unwrap()
    }

    fn ledger() -> HoldLedger {
        HoldLedger::new(Duration::hours(1))
    }

    #[test]
    fn test_soft_to_firm() {
        let mut ledger = ledger();
        let hold = ledger
            .place_soft("12", at("2025-11-03"), at("2025-11-05"), None, t0())
            .unwrap();
        assert_eq!(hold.state, HoldState::SoftReserved { expires_at: t0() + Duration::hours(1) });

        let later = t0() + Duration::minutes(30);
        assert!(ledger.ensure_convertible(&hold.id, later).is_ok());

        let outcome = ledger.mark_firm(&hold.id, Some("77".to_string()), later).unwrap();
        assert!(outcome.overridden.is_empty());
        assert_eq!(
            ledger.get(&hold.id, later).unwrap().state,
            HoldState::FirmReserved { reservation_ref: Some("77".to_string()), confirmed_at: later }
        );
        assert_eq!(ledger.ensure_convertible(&hold.id, later), Err(HoldError::AlreadyFirm(hold.id)));
    }

    #[test]
    fn test_soft_hold_lapses_after_window() {
        let mut ledger = ledger();
        let hold = ledger
            .place_soft("12", at("2025-11-03"), at("2025-11-05"), None, t0())
            .unwrap();
        let deadline = t0() + Duration::hours(1);

        assert!(ledger.ensure_convertible(&hold.id, deadline - Duration::seconds(1)).is_ok());
        assert_eq!(
            ledger.ensure_convertible(&hold.id, deadline),
            Err(HoldError::Expired { id: hold.id, at: deadline })
        );
        assert_eq!(ledger.get(&hold.id, deadline).unwrap().state.name(), "expired");

        let swept = ledger.sweep_expired(deadline);
        assert_eq!(swept.len(), 1);
        assert!(ledger.sweep_expired(deadline).is_empty());
        assert_eq!(ledger.active_count(deadline), 0);
    }

    #[test]
    fn test_firm_overrides_overlapping_soft_holds() {
        let mut ledger = ledger();
        let mine = ledger
            .place_soft("12", at("2025-11-03"), at("2025-11-05"), None, t0())
            .unwrap();
        let theirs = ledger
            .place_soft("12", at("2025-11-04"), at("2025-11-06"), Some("b@example.com".to_string()), t0())
            .unwrap();
        let other_car = ledger
            .place_soft("13", at("2025-11-04"), at("2025-11-06"), None, t0())
            .unwrap();
        let back_to_back = ledger
            .place_soft("12", at("2025-11-05"), at("2025-11-07"), None, t0())
            .unwrap();

        let outcome = ledger.mark_firm(&mine.id, None, t0()).unwrap();
        let ids: Vec<Uuid> = outcome.overridden.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![theirs.id]);
        assert_eq!(outcome.overridden[0].recipient.as_deref(), Some("b@example.com"));

        assert_eq!(
            ledger.ensure_convertible(&theirs.id, t0()),
            Err(HoldError::Overridden { id: theirs.id, by: mine.id })
        );
        assert!(ledger.ensure_convertible(&other_car.id, t0()).is_ok());
        assert!(ledger.ensure_convertible(&back_to_back.id, t0()).is_ok());
    }

    #[test]
    fn test_soft_hold_refused_over_firm_range() {
        let mut ledger = ledger();
        let firm = ledger.record_firm("12", at("2025-11-03"), at("2025-11-05"), None, t0());

        let result = ledger.place_soft("12", at("2025-11-04"), at("2025-11-08"), None, t0());
        assert_eq!(
            result.unwrap_err(),
            HoldError::Conflict { car_id: "12".to_string(), firm_hold: firm.hold.id }
        );
        assert!(ledger.place_soft("12", at("2025-11-05"), at("2025-11-08"), None, t0()).is_ok());
    }

    #[test]
    fn test_cancelled_firm_hold_frees_the_car() {
        let mut ledger = ledger();
        let firm = ledger.record_firm("12", at("2025-11-03"), at("2025-11-05"), Some("90".to_string()), t0());
        assert!(ledger.place_soft("12", at("2025-11-03"), at("2025-11-05"), None, t0()).is_err());

        assert!(ledger.release("91", t0()).is_empty());
        let released = ledger.release("90", t0());
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].id, firm.hold.id);
        assert_eq!(ledger.get(&firm.hold.id, t0()).unwrap().state, HoldState::Cancelled { at: t0() });
        assert_eq!(ledger.ensure_convertible(&firm.hold.id, t0()), Err(HoldError::Cancelled(firm.hold.id)));

        assert!(ledger.place_soft("12", at("2025-11-03"), at("2025-11-05"), None, t0()).is_ok());
        assert!(ledger.release("90", t0()).is_empty());
    }

    #[test]
    fn test_withdraw_only_removes_soft_holds() {
        let mut ledger = ledger();
        let soft = ledger
            .place_soft("12", at("2025-11-03"), at("2025-11-05"), None, t0())
            .unwrap();
        let firm = ledger.record_firm("13", at("2025-11-03"), at("2025-11-05"), None, t0());

        assert!(ledger.withdraw(&firm.hold.id).is_none());
        assert_eq!(ledger.withdraw(&soft.id).map(|h| h.id), Some(soft.id));
        assert!(ledger.get(&soft.id, t0()).is_none());
        assert_eq!(ledger.active_count(t0()), 0);
    }

    #[test]
    fn test_expired_hold_is_not_overridden() {
        let mut ledger = ledger();
        let stale = ledger
            .place_soft("12", at("2025-11-03"), at("2025-11-05"), None, t0())
            .unwrap();

        let later = t0() + Duration::hours(2);
        let outcome = ledger.record_firm("12", at("2025-11-03"), at("2025-11-05"), None, later);
        assert!(outcome.overridden.is_empty());
        assert_eq!(ledger.get(&stale.id, later).unwrap().state.name(), "expired");
    }

    #[test]
    fn test_prune_keeps_live_and_future_firm_holds() {
        let mut ledger = ledger();
        let live = ledger
            .place_soft("12", at("2025-11-10"), at("2025-11-12"), None, t0())
            .unwrap();
        let lapsed = ledger
            .place_soft("13", at("2025-11-03"), at("2025-11-05"), None, t0() - Duration::hours(5))
            .unwrap();
        ledger.sweep_expired(t0());
        let firm = ledger.record_firm("14", at("2025-11-03"), at("2025-11-05"), None, t0());

        let removed = ledger.prune(t0(), Duration::hours(2));
        assert_eq!(removed, 1);
        assert!(ledger.get(&lapsed.id, t0()).is_none());
        assert!(ledger.get(&live.id, t0()).is_some());
        assert!(ledger.get(&firm.hold.id, t0()).is_some());
    }
}
