use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::event::TriggerEvent;
use crate::services::{DirectoryStore, NotificationTransport};
use crate::triggers::Notifier;

/// First occurrence of `at` (wall-clock time in `offset`) strictly after `now`.
pub fn next_run_after(now: DateTime<Utc>, at: NaiveTime, offset: FixedOffset) -> DateTime<Utc> {
    let local_now = now.with_timezone(&offset);
    let offset_delta = Duration::seconds(offset.local_minus_utc() as i64);

    let mut next = Utc.from_utc_datetime(&(local_now.date_naive().and_time(at) - offset_delta));
    if next <= now {
        next += Duration::days(1);
    }
    next
}

/// Fires the daily routine digest once a day at the configured local time.
/// A failed run is logged and not retried; the next attempt is the next day's.
pub async fn start_digest_task<S, T>(notifier: Arc<Notifier<S, T>>)
where
    S: DirectoryStore,
    T: NotificationTransport,
{
    let at = notifier.app().digest_time;
    let offset = notifier.app().utc_offset;

    loop {
        let now = Utc::now();
        let next = next_run_after(now, at, offset);
        log::info!("⏰ Next daily routine run at {}", next.with_timezone(&offset));

        tokio::time::sleep((next - now).to_std().unwrap_or_default()).await;

        let run_id = Uuid::new_v4();
        log::info!("🔁 Running daily routine digest {}", run_id);

        match notifier.dispatch(TriggerEvent::TimeTick {}, Utc::now()).await {
            Ok(outcome) => log::info!("Daily routine digest {} finished: {:?}", run_id, outcome),
            Err(e) => log::error!("❌ Daily routine digest {} failed: {}", run_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
    }

    fn eight_am() -> NaiveTime {
        NaiveTime::from_hms_opt(8, 0, 0).unwrap()
    }

    #[test]
    fn test_next_run_later_today() {
        // 01:00 UTC is 06:30 IST, so 08:00 IST today is 02:30 UTC.
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 1, 0, 0).unwrap();
        let next = next_run_after(now, eight_am(), ist());
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 6, 1, 2, 30, 0).unwrap());
    }

    #[test]
    fn test_next_run_tomorrow_once_passed() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 3, 0, 0).unwrap();
        let next = next_run_after(now, eight_am(), ist());
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 6, 2, 2, 30, 0).unwrap());
    }

    #[test]
    fn test_exact_fire_time_schedules_next_day() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 2, 30, 0).unwrap();
        let next = next_run_after(now, eight_am(), ist());
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 6, 2, 2, 30, 0).unwrap());
    }

    #[test]
    fn test_local_date_differs_from_utc_date() {
        // 20:00 UTC on the 1st is already 01:30 on the 2nd in IST.
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap();
        let next = next_run_after(now, eight_am(), ist());
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 6, 2, 2, 30, 0).unwrap());
    }

    #[test]
    fn test_negative_offset() {
        let eastern = FixedOffset::west_opt(4 * 3600).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap();
        let next = next_run_after(now, eight_am(), eastern);
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
    }
}
