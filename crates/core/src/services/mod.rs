//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod feed;
pub mod friendship;
pub mod post;
pub mod user;

pub use comment::{CommentService, CreateCommentInput};
pub use feed::{COMMENT_PREVIEW_LIMIT, FeedComment, FeedPost, FeedService};
pub use friendship::{FriendEntry, FriendshipService};
pub use post::{CreatePostInput, PostService, UpdatePostInput};
pub use user::{RegisterInput, UpdateUserInput, UserService, UserWithProfile};
