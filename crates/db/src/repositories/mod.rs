//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod badge_lock_repo;
pub mod badge_repo;
pub mod comment_repo;
pub mod post_repo;
pub mod user_badge_repo;
pub mod user_repo;

pub use badge_lock_repo::BadgeLockRepo;
pub use badge_repo::BadgeRepo;
pub use comment_repo::CommentRepo;
pub use post_repo::PostRepo;
pub use user_badge_repo::UserBadgeRepo;
pub use user_repo::UserRepo;
