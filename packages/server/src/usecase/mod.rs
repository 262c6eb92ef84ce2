//! UseCase 層
//!
//! 各ユースケースはドメインの port（`Arc<dyn ...>`）とインメモリの集約を受け取り、
//! `execute` で一つの操作を実行します。

pub mod connect_participant;
pub mod delete_message;
pub mod disconnect_participant;
pub mod error;
pub mod get_active_users;
pub mod get_cohort_messages;
mod guard;
pub mod join_cohort;
pub mod leave_cohort;
pub mod mark_as_read;
pub mod pin_message;
pub mod relay_typing;
pub mod send_message;

#[cfg(test)]
pub(crate) mod test_support;

pub use connect_participant::ConnectParticipantUseCase;
pub use delete_message::DeleteMessageUseCase;
pub use disconnect_participant::{DisconnectOutcome, DisconnectParticipantUseCase};
pub use error::ChatError;
pub use get_active_users::GetActiveUsersUseCase;
pub use get_cohort_messages::GetCohortMessagesUseCase;
pub use join_cohort::JoinCohortUseCase;
pub use leave_cohort::LeaveCohortUseCase;
pub use mark_as_read::MarkAsReadUseCase;
pub use pin_message::PinMessageUseCase;
pub use relay_typing::RelayTypingUseCase;
pub use send_message::{SendMessageCommand, SendMessageUseCase};
