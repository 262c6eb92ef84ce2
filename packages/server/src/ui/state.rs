//! Shared application state.

use std::sync::Arc;

use cohort_chat_shared::time::Clock;

use crate::{
    domain::{
        IdentityDirectory, IdentityResolver, MessagePusher, MessageRepository, PresenceRegistry,
        RoomMultiplexer,
    },
    usecase::{
        ConnectParticipantUseCase, DeleteMessageUseCase, DisconnectParticipantUseCase,
        GetActiveUsersUseCase, GetCohortMessagesUseCase, JoinCohortUseCase, LeaveCohortUseCase,
        MarkAsReadUseCase, PinMessageUseCase, RelayTypingUseCase, SendMessageUseCase,
    },
};

/// Use cases wired to one set of collaborators, shared by every handler.
pub struct AppState {
    /// MessagePusher（メッセージ通知の抽象化）
    pub message_pusher: Arc<dyn MessagePusher>,
    pub connect_participant_usecase: ConnectParticipantUseCase,
    pub disconnect_participant_usecase: DisconnectParticipantUseCase,
    pub join_cohort_usecase: JoinCohortUseCase,
    pub leave_cohort_usecase: LeaveCohortUseCase,
    pub send_message_usecase: SendMessageUseCase,
    pub mark_as_read_usecase: MarkAsReadUseCase,
    pub pin_message_usecase: PinMessageUseCase,
    pub delete_message_usecase: DeleteMessageUseCase,
    pub relay_typing_usecase: RelayTypingUseCase,
    pub get_cohort_messages_usecase: GetCohortMessagesUseCase,
    pub get_active_users_usecase: GetActiveUsersUseCase,
}

impl AppState {
    /// Build the presence registry, the room multiplexer and every use case.
    ///
    /// The registry and the multiplexer are process-wide: one instance each,
    /// shared by all connections.
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        directory: Arc<dyn IdentityDirectory>,
        resolver: Arc<dyn IdentityResolver>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let presence = Arc::new(PresenceRegistry::new(message_pusher.clone()));
        let rooms = Arc::new(RoomMultiplexer::new(message_pusher.clone()));

        Self {
            connect_participant_usecase: ConnectParticipantUseCase::new(
                resolver,
                presence.clone(),
                message_pusher.clone(),
                clock.clone(),
            ),
            disconnect_participant_usecase: DisconnectParticipantUseCase::new(
                rooms.clone(),
                presence.clone(),
                message_pusher.clone(),
            ),
            join_cohort_usecase: JoinCohortUseCase::new(rooms.clone(), message_pusher.clone()),
            leave_cohort_usecase: LeaveCohortUseCase::new(rooms.clone(), message_pusher.clone()),
            send_message_usecase: SendMessageUseCase::new(
                repository.clone(),
                rooms.clone(),
                message_pusher.clone(),
                clock.clone(),
            ),
            mark_as_read_usecase: MarkAsReadUseCase::new(repository.clone(), rooms.clone(), clock),
            pin_message_usecase: PinMessageUseCase::new(repository.clone(), rooms.clone()),
            delete_message_usecase: DeleteMessageUseCase::new(repository.clone(), rooms.clone()),
            relay_typing_usecase: RelayTypingUseCase::new(rooms),
            get_cohort_messages_usecase: GetCohortMessagesUseCase::new(repository, directory),
            get_active_users_usecase: GetActiveUsersUseCase::new(presence),
            message_pusher,
        }
    }
}
