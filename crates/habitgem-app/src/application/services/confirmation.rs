/// Asks the user to approve a destructive action.
#[cfg_attr(test, mockall::automock)]
pub trait UserConfirmation: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Approves everything. For callers that confirm up front.
pub struct AlwaysConfirm;

impl UserConfirmation for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
