use crate::error::NotifyResult;
use crate::models::notification::PushNotification;
use crate::services::{DirectoryStore, NotificationTransport};

use super::{Dispatch, Notifier};

/// Greets a freshly created account, provided the app has already stored a
/// push token for it.
pub async fn on_account_created<S, T>(
    notifier: &Notifier<S, T>,
    user_id: &str,
    display_name: Option<&str>,
) -> NotifyResult<Dispatch>
where
    S: DirectoryStore,
    T: NotificationTransport,
{
    let token = match notifier.recipient_token(user_id).await? {
        Ok(token) => token,
        Err(reason) => {
            log::info!(
                "No FCM token found for new user {} ({:?}), skipping welcome",
                user_id, reason
            );
            return Ok(Dispatch::skipped(reason));
        }
    };

    let push = PushNotification::welcome(&token, &notifier.app().app_name, display_name);

    log::info!("Sending welcome notification to user {}", user_id);
    let message_id = notifier.transport.send(&push).await?;
    Ok(Dispatch::sent(message_id))
}
