//! # cb-services
//!
//! The board's operations, expressed against the `cb-core` ports. Every
//! service receives its storage handles at construction; none of them hold
//! state of their own.

pub mod accounts;
pub mod comments;
pub mod identity;
pub mod likes;
pub mod posts;

use std::sync::Arc;

use cb_core::traits::{CommentRepo, CredentialScheme, LikeRepo, MemberRepo, PostRepo};

pub use accounts::AccountService;
pub use comments::CommentStore;
pub use identity::IdentityLookup;
pub use likes::LikeLedger;
pub use posts::PostStore;

/// Every service, wired to one storage backend.
#[derive(Clone)]
pub struct Services {
    pub accounts: AccountService,
    pub posts: PostStore,
    pub comments: CommentStore,
    pub likes: LikeLedger,
}

impl Services {
    pub fn new<S>(store: Arc<S>, credentials: Arc<dyn CredentialScheme>) -> Self
    where
        S: MemberRepo + PostRepo + CommentRepo + LikeRepo + 'static,
    {
        let members: Arc<dyn MemberRepo> = store.clone();
        let posts: Arc<dyn PostRepo> = store.clone();
        let comments: Arc<dyn CommentRepo> = store.clone();
        let likes: Arc<dyn LikeRepo> = store;

        let identity = IdentityLookup::new(Arc::clone(&members));

        Self {
            accounts: AccountService::new(members, credentials, identity.clone()),
            posts: PostStore::new(posts, identity.clone()),
            comments: CommentStore::new(comments, identity),
            likes: LikeLedger::new(likes),
        }
    }
}
