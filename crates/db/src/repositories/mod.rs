//! Repositories wrapping `SeaORM` queries.
//!
//! Each repository holds the shared connection handle it was constructed
//! with and maps `DbErr` into [`dailyflip_common::AppError::Database`].

mod comment;
mod friendship;
mod post;
mod profile;
mod user;

pub use comment::CommentRepository;
pub use friendship::FriendshipRepository;
pub use post::PostRepository;
pub use profile::ProfileRepository;
pub use user::UserRepository;
