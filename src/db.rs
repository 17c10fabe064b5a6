pub mod employee_repo;
pub use employee_repo::EmployeeRepository;
pub mod request_repo;
pub use request_repo::RequestRepository;
pub mod lms_repo;
pub use lms_repo::LmsRepository;
pub mod training_repo;
pub use training_repo::TrainingRepository;
pub mod talent_repo;
pub use talent_repo::TalentRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
