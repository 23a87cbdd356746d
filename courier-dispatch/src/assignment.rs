//! Provider assignment: pick the best enabled, capable provider.

use courier_common::{message::MessageKind, provider::ProviderType};
use thiserror::Error;

/// No enabled provider can handle a message class.
///
/// This is a configuration error, fatal for the current stage and not
/// retryable per message: callers must not touch any message's error count
/// for it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("No enabled provider can process {kind} messages")]
pub struct AssignmentError {
    pub kind: MessageKind,
}

/// Select the provider for a message of the given kind.
///
/// Candidates are filtered to enabled providers whose capability matches
/// the kind; the lowest `priority` value wins. Ties break on provider name
/// so the choice is deterministic regardless of candidate order.
///
/// # Errors
///
/// Returns [`AssignmentError`] when the filtered set is empty.
pub fn assign(
    kind: MessageKind,
    candidates: &[ProviderType],
) -> Result<&ProviderType, AssignmentError> {
    candidates
        .iter()
        .filter(|p| !p.is_disabled && p.can_process(kind))
        .min_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)))
        .ok_or(AssignmentError { kind })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(id: i64, name: &str, priority: i32, mail: bool, text: bool) -> ProviderType {
        ProviderType {
            id,
            name: name.to_string(),
            priority,
            can_process_mail: mail,
            can_process_text: text,
            is_disabled: false,
            adapter: "test".to_string(),
            parameters: Default::default(),
        }
    }

    #[test]
    fn picks_the_lowest_priority_value() {
        let candidates = vec![
            provider(1, "smtp-backup", 2, true, false),
            provider(2, "smtp-primary", 1, true, false),
        ];

        let chosen = assign(MessageKind::Mail, &candidates).unwrap();
        assert_eq!(chosen.id, 2);
    }

    #[test]
    fn ties_break_on_name_regardless_of_order() {
        let mut candidates = vec![
            provider(1, "smtp-b", 1, true, false),
            provider(2, "smtp-a", 1, true, false),
        ];

        assert_eq!(assign(MessageKind::Mail, &candidates).unwrap().id, 2);

        candidates.reverse();
        assert_eq!(
            assign(MessageKind::Mail, &candidates).unwrap().id,
            2,
            "tie-break must not depend on candidate order"
        );
    }

    #[test]
    fn skips_disabled_and_incapable_providers() {
        let mut disabled = provider(1, "smtp-fast", 0, true, true);
        disabled.is_disabled = true;

        let candidates = vec![
            disabled,
            provider(2, "sms-only", 1, false, true),
            provider(3, "smtp-slow", 5, true, false),
        ];

        assert_eq!(assign(MessageKind::Mail, &candidates).unwrap().id, 3);
        assert_eq!(assign(MessageKind::Text, &candidates).unwrap().id, 2);
    }

    #[test]
    fn empty_filtered_set_is_fatal() {
        let candidates = vec![provider(1, "smtp-primary", 1, true, false)];

        let err = assign(MessageKind::Text, &candidates).unwrap_err();
        assert_eq!(err.kind, MessageKind::Text);
        assert_eq!(
            err.to_string(),
            "No enabled provider can process text messages"
        );
    }
}
