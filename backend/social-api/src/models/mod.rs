mod post;
mod user;

pub use post::{AuthorSnapshot, LikeState, Likes, NewPost, Post};
pub use user::{FriendSummary, NewUser, User};
