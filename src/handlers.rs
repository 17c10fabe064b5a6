pub mod dashboard;
pub mod documents;
pub mod employees;
pub mod ess;
pub mod lms;
pub mod requests;
pub mod talent;
pub mod training;
