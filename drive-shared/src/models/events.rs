use chrono::{DateTime, Utc};
use uuid::Uuid;

/// What happened to a reservation or a soft hold.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Confirmed,
    Modified,
    Cancelled,
    Overridden,
    Expired,
    Firm,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::Confirmed => "confirmed",
            NoticeKind::Modified => "modified",
            NoticeKind::Cancelled => "cancelled",
            NoticeKind::Overridden => "overridden",
            NoticeKind::Expired => "expired",
            NoticeKind::Firm => "firm",
        }
    }
}

/// Customer-facing notice emitted on a status change.
///
/// `reservation_ref` is the backend reservation id for dashboard actions and
/// the hold id for soft-hold events.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReservationNotice {
    pub id: Uuid,
    pub kind: NoticeKind,
    pub reservation_ref: String,
    pub car_id: String,
    pub recipient: Option<String>,
    pub subject: String,
    pub message: String,
    pub emitted_at: DateTime<Utc>,
}

