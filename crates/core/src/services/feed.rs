//! Feed service.
//!
//! Builds newest-first lists of public posts, each joined with its owner
//! and a short preview of its latest comments.

use std::collections::{BTreeSet, HashMap};

use dailyflip_common::AppResult;
use dailyflip_db::{
    entities::{comment, post, user},
    repositories::{CommentRepository, PostRepository, UserRepository},
};

/// Number of recent comments attached to each feed post.
pub const COMMENT_PREVIEW_LIMIT: u64 = 3;

/// Feed service for business logic.
#[derive(Clone)]
pub struct FeedService {
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    user_repo: UserRepository,
}

/// A post as shown in a feed.
#[derive(Debug, Clone)]
pub struct FeedPost {
    pub post: post::Model,
    pub author: user::Model,
    /// Newest first, at most [`COMMENT_PREVIEW_LIMIT`].
    pub comments: Vec<FeedComment>,
}

/// A comment preview with its author.
#[derive(Debug, Clone)]
pub struct FeedComment {
    pub comment: comment::Model,
    pub author: user::Model,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            post_repo,
            comment_repo,
            user_repo,
        }
    }

    /// Get the global feed of public posts.
    pub async fn global(&self, limit: u64) -> AppResult<Vec<FeedPost>> {
        let posts = self.post_repo.find_public(limit).await?;
        self.assemble(posts).await
    }

    /// Get the public posts of one user.
    ///
    /// Private posts are left out even when the viewer owns them.
    pub async fn for_user(&self, user_id: &str, limit: u64) -> AppResult<Vec<FeedPost>> {
        self.user_repo.get_by_id(user_id).await?;

        let posts = self.post_repo.find_public_by_user(user_id, limit).await?;
        self.assemble(posts).await
    }

    async fn assemble(&self, posts: Vec<post::Model>) -> AppResult<Vec<FeedPost>> {
        if posts.is_empty() {
            return Ok(vec![]);
        }

        let owner_ids: Vec<String> = posts
            .iter()
            .map(|p| p.user_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let owners = self.users_by_id(&owner_ids).await?;

        let mut previews = Vec::with_capacity(posts.len());
        for post in &posts {
            previews.push(
                self.comment_repo
                    .find_recent_by_post(&post.id, COMMENT_PREVIEW_LIMIT)
                    .await?,
            );
        }

        let commenter_ids: Vec<String> = previews
            .iter()
            .flatten()
            .map(|c| c.user_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let commenters = self.users_by_id(&commenter_ids).await?;

        Ok(posts
            .into_iter()
            .zip(previews)
            .filter_map(|(post, comments)| {
                let Some(author) = owners.get(&post.user_id).cloned() else {
                    tracing::warn!(
                        post_id = %post.id,
                        user_id = %post.user_id,
                        "Post owner missing"
                    );
                    return None;
                };

                let comments = comments
                    .into_iter()
                    .filter_map(|comment| {
                        commenters
                            .get(&comment.user_id)
                            .cloned()
                            .map(|author| FeedComment { comment, author })
                    })
                    .collect();

                Some(FeedPost {
                    post,
                    author,
                    comments,
                })
            })
            .collect())
    }

    async fn users_by_id(&self, ids: &[String]) -> AppResult<HashMap<String, user::Model>> {
        Ok(self
            .user_repo
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect())
    }
}
