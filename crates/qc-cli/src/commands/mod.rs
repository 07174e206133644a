pub mod access;
pub mod auth;
pub mod creators;
pub mod dispatch;
pub mod quests;
pub mod shared;
pub mod users;
