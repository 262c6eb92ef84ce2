//! Routing of inbound client events to use cases.

use crate::{
    domain::{Connection, OutboundEvent},
    infrastructure::dto::websocket::ClientEvent,
    ui::state::AppState,
    usecase::{ChatError, SendMessageCommand},
};

/// Handle one text frame. Failures are reported privately to `connection`.
pub(super) async fn handle_text(state: &AppState, connection: &Connection, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Malformed event from '{}': {}", connection.id, e);
            report(state, connection, &ChatError::invalid(format!("malformed event: {e}")));
            return;
        }
    };

    let name = event.name();
    tracing::debug!("Received {} from '{}'", name, connection.id);

    if let Err(e) = dispatch(state, connection, event).await {
        tracing::warn!(
            "{} from '{}' ({}) failed: {}",
            name,
            connection.user_id(),
            connection.id,
            e
        );
        report(state, connection, &e);
    }
}

async fn dispatch(
    state: &AppState,
    connection: &Connection,
    event: ClientEvent,
) -> Result<(), ChatError> {
    match event {
        ClientEvent::JoinCohort { cohort_id } => {
            state.join_cohort_usecase.execute(connection, cohort_id)?;
        }
        ClientEvent::LeaveCohort { cohort_id } => {
            state.leave_cohort_usecase.execute(connection, cohort_id)?;
        }
        ClientEvent::SendMessage {
            cohort_id,
            content,
            message_type,
            file_url,
            file_name,
            file_size,
            reply_to,
        } => {
            let command = SendMessageCommand {
                cohort_id,
                content,
                kind: message_type.into(),
                file_url,
                file_name,
                file_size,
                reply_to,
            };
            state.send_message_usecase.execute(connection, command).await?;
        }
        ClientEvent::Typing {
            cohort_id,
            is_typing,
        } => {
            state
                .relay_typing_usecase
                .execute(connection, cohort_id, is_typing)?;
        }
        ClientEvent::MarkAsRead { message_id } => {
            state
                .mark_as_read_usecase
                .execute(connection, message_id)
                .await?;
        }
        ClientEvent::PinMessage {
            message_id,
            cohort_id,
        } => {
            state
                .pin_message_usecase
                .execute(connection, message_id, cohort_id)
                .await?;
        }
        ClientEvent::DeleteMessage {
            message_id,
            cohort_id,
        } => {
            state
                .delete_message_usecase
                .execute(connection, message_id, cohort_id)
                .await?;
        }
    }
    Ok(())
}

fn report(state: &AppState, connection: &Connection, error: &ChatError) {
    let event = OutboundEvent::Error {
        code: error.code(),
        message: error.to_string(),
    };
    if let Err(e) = state.message_pusher.push_to(&connection.id, &event) {
        tracing::debug!("Could not report error to '{}': {}", connection.id, e);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cohort_chat_shared::time::FixedClock;

    use super::*;
    use crate::{
        domain::{
            ConnectionIdFactory, Role, Timestamp, auth::MockIdentityResolver,
            repository::MockIdentityDirectory,
            testing::{RecordingPusher, cohort, identity},
        },
        infrastructure::repository::InMemoryMessageRepository,
    };

    fn setup() -> (AppState, Arc<RecordingPusher>, Connection) {
        let pusher = RecordingPusher::new();
        let state = AppState::new(
            Arc::new(InMemoryMessageRepository::new()),
            Arc::new(MockIdentityDirectory::new()),
            Arc::new(MockIdentityResolver::new()),
            pusher.clone(),
            Arc::new(FixedClock::new(1_000)),
        );
        let connection = Connection::new(
            ConnectionIdFactory::generate(),
            Arc::new(identity("alice", Role::Student, &["cohort-1"])),
            Timestamp::new(1_000),
        );
        pusher.connect(&connection.id);
        (state, pusher, connection)
    }

    #[tokio::test]
    async fn test_malformed_frame_yields_private_validation_error() {
        // テスト項目: 解析できないフレームには VALIDATION エラーが本人にだけ返る
        // given (前提条件):
        let (state, pusher, connection) = setup();

        // when (操作):
        handle_text(&state, &connection, "{not json").await;
        handle_text(&state, &connection, r#"{"type":"shout","cohortId":"cohort-1"}"#).await;

        // then (期待する結果):
        let events = pusher.events_for(&connection.id);
        assert_eq!(events.len(), 2);
        assert!(
            events
                .iter()
                .all(|e| matches!(e, OutboundEvent::Error { code: "VALIDATION", .. }))
        );
    }

    #[tokio::test]
    async fn test_join_then_send_round_trip() {
        // テスト項目: joinCohort と sendMessage が対応するユースケースに届く
        // given (前提条件):
        let (state, pusher, connection) = setup();

        // when (操作):
        handle_text(&state, &connection, r#"{"type":"joinCohort","cohortId":"cohort-1"}"#).await;
        handle_text(
            &state,
            &connection,
            r#"{"type":"sendMessage","cohortId":"cohort-1","content":"hello"}"#,
        )
        .await;

        // then (期待する結果):
        let events = pusher.events_for(&connection.id);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], OutboundEvent::JoinedCohort(cohort("cohort-1")));
        assert!(matches!(
            &events[1],
            OutboundEvent::NewMessage(resolved) if resolved.message.content.as_str() == "hello"
        ));
    }

    #[tokio::test]
    async fn test_rejected_action_reports_code() {
        // テスト項目: 権限不足の操作は FORBIDDEN として本人に返る
        // given (前提条件):
        let (state, pusher, connection) = setup();

        // when (操作):
        handle_text(&state, &connection, r#"{"type":"joinCohort","cohortId":"cohort-2"}"#).await;

        // then (期待する結果):
        assert!(matches!(
            pusher.events_for(&connection.id).as_slice(),
            [OutboundEvent::Error { code: "FORBIDDEN", .. }]
        ));
    }
}
