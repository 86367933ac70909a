pub mod application;
pub mod field;
pub mod job;
pub mod profile;
pub mod resume;
