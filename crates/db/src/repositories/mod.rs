//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Every mutation is a single
//! atomic SQL statement (or one transaction for the grant path) -- no
//! read-then-write sequences guarded only by application locks, since
//! multiple process instances may run against the same database.

pub mod achievement_repo;
pub mod badge_repo;
pub mod behavior_repo;
pub mod session_repo;
pub mod user_repo;

pub use achievement_repo::AchievementRepo;
pub use badge_repo::BadgeRepo;
pub use behavior_repo::BehaviorRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
