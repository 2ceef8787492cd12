//! CodeGram client-side state.
//!
//! Explicit state containers mirroring server responses, each owning its
//! collection exclusively:
//!
//! - [`FeedStore`]: paginated feed with cursor, exhaustion flag, de-dup by id
//! - [`InteractionController`]: optimistic like/bookmark with rollback
//! - [`NotificationStore`]: inbox + unread counter, merges pushed events
//! - [`CommentStore`]: comments of the item being viewed
//! - [`FollowToggle`]: follow/unfollow button state for one profile
//! - [`EventBus`]: routes push-channel events to the stores
//! - [`Session`]: builds and wires all of the above for one signed-in user
//!
//! Stores are shared as `Arc`s and mutated through `&self`; every mutation is
//! a short critical section, never held across a request. Logical races
//! between optimistic local state and late server answers are resolved by the
//! rules documented on each store.

mod bus;
mod comment;
mod feed;
mod follow;
mod interaction;
mod notification;
mod session;

#[cfg(test)]
mod testing;

pub use bus::{EventBus, EventHandler, SubscriptionId};
pub use comment::{CommentError, CommentState, CommentStore};
pub use feed::{FeedState, FeedStore, FetchOutcome, FEED_PAGE_SIZE};
pub use follow::{FollowState, FollowToggle};
pub use interaction::{InteractionController, InteractionError, ToggleOutcome};
pub use notification::{NotificationState, NotificationStore};
pub use session::{Session, SessionConfig};
