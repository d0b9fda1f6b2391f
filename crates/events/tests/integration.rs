//! Integration tests for events

#[cfg(test)]
mod tests {
    use rigup_errors::{FetchError, UserFacingError};
    use rigup_events::*;

    #[tokio::test]
    async fn test_event_sender_ext() {
        let (tx, mut rx) = channel();

        // Test emit helpers
        tx.emit_error("test error");
        tx.emit_debug("test debug");

        let event1 = rx.recv().await.unwrap();
        assert!(matches!(
            event1,
            AppEvent::General(GeneralEvent::Error { .. })
        ));

        let event2 = rx.recv().await.unwrap();
        assert!(matches!(
            event2,
            AppEvent::General(GeneralEvent::DebugLog { .. })
        ));
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning("ignored");
    }

    #[test]
    fn test_app_event_serialization() {
        let event = AppEvent::Run(RunEvent::StepSkipped {
            step: "ocr-engine".into(),
            probe: "command tesseract -v".into(),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""domain":"run""#));
        assert!(json.contains(r#""type":"StepSkipped""#));
    }

    #[test]
    fn test_failure_context_from_error() {
        let err = FetchError::Timeout {
            url: "https://example.com/x".into(),
        };
        let ctx = FailureContext::from_error(&err);
        assert_eq!(ctx.code.as_deref(), Some("fetch.timeout"));
        assert_eq!(ctx.message, err.user_message());
        assert!(ctx.retryable);
    }
}
