use std::sync::Arc;
use std::time::Duration;

use crate::db::{PostStore, UserStore};
use crate::security::JwtKeys;
use crate::services::{AuthService, PostService, UserService};
use crate::uploads::UploadSettings;

/// Store handles for one backend.
#[derive(Clone)]
pub struct Stores {
    pub posts: Arc<dyn PostStore>,
    pub users: Arc<dyn UserStore>,
}

/// Shared application state handed to every handler through `web::Data`.
pub struct AppState {
    pub auth: AuthService,
    pub users: UserService,
    pub posts: PostService,
    pub uploads: UploadSettings,
    pub store_health: Arc<dyn PostStore>,
    pub store_timeout: Duration,
}

impl AppState {
    pub fn new(
        stores: Stores,
        keys: Arc<JwtKeys>,
        uploads: UploadSettings,
        store_timeout: Duration,
    ) -> Self {
        Self {
            auth: AuthService::new(stores.users.clone(), keys, store_timeout),
            users: UserService::new(stores.users.clone(), store_timeout),
            posts: PostService::new(stores.posts.clone(), stores.users, store_timeout),
            uploads,
            store_health: stores.posts,
            store_timeout,
        }
    }
}
