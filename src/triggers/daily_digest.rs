use chrono::{DateTime, Timelike, Utc};
use futures::future::join_all;

use crate::error::NotifyResult;
use crate::models::common::{RoutinePeriod, FCM_TOKEN_FIELD, USERS};
use crate::models::notification::PushNotification;
use crate::models::user::UserRecord;
use crate::services::{DirectoryStore, FieldPredicate, NotificationTransport};

use super::{Dispatch, Notifier, SkipReason};

/// Sends the daily routine reminder to every user with a push token.
///
/// The period label comes from `now` in the configured offset, not from
/// each recipient's own timezone. All sends are attempted; if any of them
/// fail, the first failure (in recipient order) is returned once the whole
/// batch has finished.
pub async fn on_time_tick<S, T>(
    notifier: &Notifier<S, T>,
    now: DateTime<Utc>,
) -> NotifyResult<Dispatch>
where
    S: DirectoryStore,
    T: NotificationTransport,
{
    let local_hour = now.with_timezone(&notifier.app().utc_offset).hour();
    let period = RoutinePeriod::from_hour(local_hour);

    let users: Vec<UserRecord> = notifier
        .store
        .query(USERS, &FieldPredicate::NotNull(FCM_TOKEN_FIELD))
        .await?;

    let pushes: Vec<PushNotification> = users
        .iter()
        .filter_map(UserRecord::token)
        .map(|token| PushNotification::daily_routine(token, period))
        .collect();

    if pushes.is_empty() {
        log::info!("No users found with FCM tokens");
        return Ok(Dispatch::skipped(SkipReason::NoRecipients));
    }

    log::info!("Sending {} daily routine notifications ({})", pushes.len(), period);

    let results = join_all(pushes.iter().map(|push| notifier.transport.send(push))).await;

    let mut message_ids = Vec::with_capacity(results.len());
    let mut first_failure = None;
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(message_id) => message_ids.push(message_id),
            Err(e) => {
                log::warn!("Daily routine notification {} failed: {}", index, e);
                first_failure.get_or_insert(e);
            }
        }
    }

    match first_failure {
        Some(e) => {
            log::warn!(
                "Daily routine run finished with failures ({} of {} delivered)",
                message_ids.len(),
                pushes.len()
            );
            Err(e)
        }
        None => Ok(Dispatch::Sent { message_ids }),
    }
}
