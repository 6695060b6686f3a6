pub mod broker;
pub mod listing;
pub mod notification;
pub mod payment_order;

use landlot_sdk::objects::{
    ListingStatus as SdkListingStatus, NotificationKind as SdkNotificationKind,
    PaymentOrderStatus as SdkPaymentOrderStatus, PaymentStatus as SdkPaymentStatus,
};

/// Listing lifecycle state for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see
/// `landlot_sdk::objects::ListingStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "listing_status")]
pub enum ListingStatus {
    PendingPayment,
    Active,
}

impl From<ListingStatus> for SdkListingStatus {
    fn from(value: ListingStatus) -> Self {
        match value {
            ListingStatus::PendingPayment => SdkListingStatus::PendingPayment,
            ListingStatus::Active => SdkListingStatus::Active,
        }
    }
}

/// Payment state of a listing for database operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "payment_state")]
pub enum PaymentState {
    Pending,
    Paid,
}

impl From<PaymentState> for SdkPaymentStatus {
    fn from(value: PaymentState) -> Self {
        match value {
            PaymentState::Pending => SdkPaymentStatus::Pending,
            PaymentState::Paid => SdkPaymentStatus::Paid,
        }
    }
}

/// Payment order lifecycle for database operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "payment_order_status")]
pub enum PaymentOrderStatus {
    Created,
    Completed,
}

impl From<PaymentOrderStatus> for SdkPaymentOrderStatus {
    fn from(value: PaymentOrderStatus) -> Self {
        match value {
            PaymentOrderStatus::Created => SdkPaymentOrderStatus::Created,
            PaymentOrderStatus::Completed => SdkPaymentOrderStatus::Completed,
        }
    }
}

/// Notification kind for database operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "notification_kind")]
pub enum NotificationKind {
    Broadcast,
}

impl From<NotificationKind> for SdkNotificationKind {
    fn from(value: NotificationKind) -> Self {
        match value {
            NotificationKind::Broadcast => SdkNotificationKind::Broadcast,
        }
    }
}
