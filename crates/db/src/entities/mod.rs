//! `SeaORM` entities.

pub mod comment;
pub mod friendship;
pub mod post;
pub mod profile;
pub mod user;

pub use comment::Entity as Comment;
pub use friendship::Entity as Friendship;
pub use post::Entity as Post;
pub use profile::Entity as Profile;
pub use user::Entity as User;
