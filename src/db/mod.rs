pub mod company_repo;
pub mod user_repo;

pub use company_repo::CompanyRepository;
pub use user_repo::UserRepository;
