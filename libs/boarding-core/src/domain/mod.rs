pub mod account;
pub mod billing;
pub mod room;
pub mod session;
pub mod summary;
pub mod tenant;
