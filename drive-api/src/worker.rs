use drive_reservation::notify::notice_for_hold;
use drive_shared::models::events::NoticeKind;
use tokio::time::{interval, Duration as TickDuration};
use tracing::{debug, info, warn};
use crate::state::AppState;

/// Materialises soft-hold expiry on a fixed tick: expired holds lose
/// their pending snapshot and their owners get a notice.
pub async fn start_hold_sweeper(state: AppState, every: TickDuration) {
    let mut ticker = interval(every);
    info!("Hold sweeper started, every {:?}", every);

    loop {
        ticker.tick().await;
        let expired = sweep_once(&state).await;
        if expired > 0 {
            info!("Expired {} soft holds", expired);
        }
    }
}

/// One sweep. Returns how many holds expired.
pub async fn sweep_once(state: &AppState) -> usize {
    let now = state.clock.now();

    let (expired, pruned, active) = {
        let mut ledger = state.holds.lock().await;
        let expired = ledger.sweep_expired(now);
        let retain = ledger.window() * 2;
        let pruned = ledger.prune(now, retain);
        (expired, pruned, ledger.active_count(now))
    };
    if pruned > 0 {
        debug!("Pruned {} settled holds, {} still soft", pruned, active);
    }

    for hold in &expired {
        if let Err(e) = state.sessions.discard_pending(&hold.id.to_string()).await {
            warn!("Failed to discard pending reservation {}: {}", hold.id, e);
        }
        let car = state.cached_car(&hold.car_id).await;
        state.publish(notice_for_hold(hold, NoticeKind::Expired, car.as_ref(), now));
    }

    expired.len()
}
