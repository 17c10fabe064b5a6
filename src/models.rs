pub mod auth;
pub mod dashboard;
pub mod employee;
pub mod lms;
pub mod requests;
pub mod talent;
pub mod training;
