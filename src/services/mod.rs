pub mod database;
pub mod fcm;

pub use database::{DatabaseService, DirectoryStore, FieldPredicate};
pub use fcm::{FcmService, NotificationTransport};
