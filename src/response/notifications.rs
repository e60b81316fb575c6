use std::collections::HashMap;
use num_enum::TryFromPrimitive;

/// The type of a notification as keyed in `GetNotificationCounts` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u8)]
pub enum NotificationType {
    TradeOffer = 1,
    GameTurn = 2,
    ModeratorMessage = 3,
    Comment = 4,
    Item = 5,
    FriendInvite = 6,
    Gift = 8,
    ChatMessage = 9,
    HelpRequestReply = 10,
    AccountAlert = 11,
}

/// Unread notification counts for the logged-in account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Notifications {
    pub trade_offers: u32,
    pub game_turns: u32,
    pub moderator_messages: u32,
    pub comments: u32,
    pub items: u32,
    pub friend_invites: u32,
    pub gifts: u32,
    pub chat_messages: u32,
    pub help_request_replies: u32,
    pub account_alerts: u32,
}

impl Notifications {
    /// Maps the numerically-keyed counts from the response body.
    pub(crate) fn from_counts(counts: HashMap<String, u32>) -> Self {
        let mut notifications = Self::default();

        for (key, count) in counts {
            let Ok(number) = key.parse::<u8>() else {
                continue;
            };

            match NotificationType::try_from(number) {
                Ok(NotificationType::TradeOffer) => notifications.trade_offers = count,
                Ok(NotificationType::GameTurn) => notifications.game_turns = count,
                Ok(NotificationType::ModeratorMessage) => notifications.moderator_messages = count,
                Ok(NotificationType::Comment) => notifications.comments = count,
                Ok(NotificationType::Item) => notifications.items = count,
                Ok(NotificationType::FriendInvite) => notifications.friend_invites = count,
                Ok(NotificationType::Gift) => notifications.gifts = count,
                Ok(NotificationType::ChatMessage) => notifications.chat_messages = count,
                Ok(NotificationType::HelpRequestReply) => notifications.help_request_replies = count,
                Ok(NotificationType::AccountAlert) => notifications.account_alerts = count,
                Err(_) => log::debug!("Unknown notification type {number}"),
            }
        }

        notifications
    }

    /// Total unread notifications of all types. Saturates rather than overflowing on
    /// absurd server-sent counts.
    pub fn total(&self) -> u32 {
        [
            self.trade_offers,
            self.game_turns,
            self.moderator_messages,
            self.comments,
            self.items,
            self.friend_invites,
            self.gifts,
            self.chat_messages,
            self.help_request_replies,
            self.account_alerts,
        ]
        .into_iter()
        .fold(0u32, u32::saturating_add)
    }
}
