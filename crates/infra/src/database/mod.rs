//! SQLite cache implementations of the core repository ports.

pub mod manager;
pub mod status_repository;
pub mod time_entry_repository;
pub mod user_repository;
pub mod user_setting_repository;

pub use manager::DbManager;
pub use status_repository::SqliteStatusRepository;
pub use time_entry_repository::SqliteTimeEntryRepository;
pub use user_repository::SqliteUserRepository;
pub use user_setting_repository::SqliteUserSettingRepository;
