pub mod auth;
pub mod dashboard_service;
pub mod document_service;
pub mod employee_service;
pub mod lms_service;
pub mod progress;
pub mod request_service;
pub mod talent_service;
pub mod training_service;
