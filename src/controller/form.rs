//! Shared form state machine

use std::future::Future;

use tokio::sync::watch;

use crate::error::{Result, ValidationError};

/// Field values of a form plus its submission status
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState<F> {
    pub fields: F,
    pub is_submitting: bool,
    pub error: Option<String>,
    pub succeeded: bool,
}

/// Holds a form's state in a `watch` channel
///
/// Edits clear the error. A submission runs the local check first and only
/// reaches the remote action when it passes. While one submission is in
/// flight further submits are ignored.
pub struct FormController<F> {
    state: watch::Sender<FormState<F>>,
}

impl<F: Clone + Default> Default for FormController<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Clone + Default> FormController<F> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(FormState::default());
        Self { state }
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState<F>> {
        self.state.subscribe()
    }

    pub fn current(&self) -> FormState<F> {
        self.state.borrow().clone()
    }

    pub fn edit(&self, change: impl FnOnce(&mut F)) {
        self.state.send_modify(|state| {
            change(&mut state.fields);
            state.error = None;
        });
    }

    /// Forget a completed submission so the form can be reused
    pub fn reset_success(&self) {
        self.state.send_if_modified(|state| std::mem::replace(&mut state.succeeded, false));
    }

    pub async fn submit<T, Fut>(
        &self,
        check: impl FnOnce(&F) -> std::result::Result<(), ValidationError>,
        action: impl FnOnce(F) -> Fut,
        fallback: &str,
    ) -> Option<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let mut accepted = None;
        self.state.send_if_modified(|state| {
            if state.is_submitting {
                return false;
            }
            match check(&state.fields) {
                Err(e) => {
                    tracing::debug!(error = %e, "Form rejected locally");
                    state.error = Some(e.to_string());
                }
                Ok(()) => {
                    state.is_submitting = true;
                    state.error = None;
                    state.succeeded = false;
                    accepted = Some(state.fields.clone());
                }
            }
            true
        });

        let fields = accepted?;
        let outcome = action(fields).await;

        self.state.send_modify(|state| {
            state.is_submitting = false;
            match &outcome {
                Ok(_) => state.succeeded = true,
                Err(e) => state.error = Some(e.user_message(fallback)),
            }
        });

        match outcome {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "Form submission failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::error::Error;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Name {
        value: String,
    }

    fn not_blank(fields: &Name) -> std::result::Result<(), ValidationError> {
        if fields.value.is_empty() {
            Err(ValidationError::EmptyUsername)
        } else {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_local_rejection_skips_action() {
        let form: FormController<Name> = FormController::new();
        let mut called = false;
        let result = form
            .submit(not_blank, |_| {
                called = true;
                async { Ok(()) }
            }, "failed")
            .await;

        assert!(result.is_none());
        assert!(!called);
        assert_eq!(form.current().error.as_deref(), Some("Username cannot be empty"));

        form.edit(|f| f.value = "budi".into());
        assert_eq!(form.current().error, None);
    }

    #[tokio::test]
    async fn test_success_and_failure() {
        let form: FormController<Name> = FormController::new();
        form.edit(|f| f.value = "budi".into());

        let ok = form.submit(not_blank, |f| async move { Ok(f.value.len()) }, "failed").await;
        assert_eq!(ok, Some(4));
        assert!(form.current().succeeded);
        assert!(!form.current().is_submitting);

        form.reset_success();
        let failed: Option<()> = form
            .submit(not_blank, |_| async { Err(Error::Backend(String::new())) }, "Sign in failed")
            .await;
        assert!(failed.is_none());
        assert_eq!(form.current().error.as_deref(), Some("Sign in failed"));
        assert!(!form.current().succeeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_submit_while_in_flight_is_ignored() {
        let form: FormController<Name> = FormController::new();
        form.edit(|f| f.value = "budi".into());

        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let slow = move |_: Name| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<(), Error>(())
        };

        let (first, second) = tokio::join!(
            form.submit(not_blank, slow, "failed"),
            form.submit(not_blank, slow, "failed"),
        );

        assert_eq!(first, Some(()));
        assert_eq!(second, None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!form.current().is_submitting);
        assert!(form.current().succeeded);
    }
}
