//! Built-in tools.

mod insert_profile;

pub use insert_profile::InsertUserInformationTool;
