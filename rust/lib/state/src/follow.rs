//! Follow/unfollow button state for one user.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use codegram_client::{ApiError, CodegramApi};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FollowState {
    pub is_following: bool,
    pub loading: bool,
}

/// Not optimistic: the flag changes only once the server answers.
pub struct FollowToggle {
    api: Arc<dyn CodegramApi>,
    user_id: String,
    state: Mutex<FollowState>,
}

impl FollowToggle {
    pub fn new(api: Arc<dyn CodegramApi>, user_id: impl Into<String>, initial: bool) -> Self {
        Self {
            api,
            user_id: user_id.into(),
            state: Mutex::new(FollowState { is_following: initial, loading: false }),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Flip the relationship. Returns `Ok(None)` if a toggle is already in
    /// flight, otherwise the server's resulting `is_following`.
    pub async fn toggle(&self) -> Result<Option<bool>, ApiError> {
        {
            let mut state = self.state.lock();
            if state.loading {
                return Ok(None);
            }
            state.loading = true;
        }

        let result = self.api.toggle_follow(&self.user_id).await;

        let mut state = self.state.lock();
        state.loading = false;
        match result {
            Ok(status) => {
                state.is_following = status.is_following;
                Ok(Some(status.is_following))
            }
            Err(e) => {
                warn!(user = %self.user_id, error = %e, "follow toggle failed");
                Err(e)
            }
        }
    }

    pub fn state(&self) -> FollowState {
        *self.state.lock()
    }
}
