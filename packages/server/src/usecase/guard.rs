//! Checks shared by several use cases.

use crate::domain::{CohortId, Identity, Message, MessageId, MessageRepository};

use super::ChatError;

/// Parse `raw` as a cohort id and require that `identity` may use it.
pub(crate) fn accessible_cohort(identity: &Identity, raw: String) -> Result<CohortId, ChatError> {
    let cohort_id = CohortId::new(raw)?;
    if !identity.can_access(&cohort_id) {
        tracing::warn!(
            "User '{}' is not a member of cohort '{}'",
            identity.id,
            cohort_id
        );
        return Err(ChatError::forbidden(format!(
            "not a member of cohort '{cohort_id}'"
        )));
    }
    Ok(cohort_id)
}

pub(crate) async fn find_message(
    repository: &dyn MessageRepository,
    id: &MessageId,
) -> Result<Message, ChatError> {
    repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ChatError::NotFound(format!("message '{id}'")))
}

/// The cohort named by the client must be the one the message lives in.
pub(crate) fn ensure_same_cohort(message: &Message, claimed: &CohortId) -> Result<(), ChatError> {
    if message.cohort_id() != claimed {
        return Err(ChatError::invalid(format!(
            "message '{}' does not belong to cohort '{}'",
            message.id, claimed
        )));
    }
    Ok(())
}
