pub mod auth;
pub mod company_service;
pub mod trading_service;

pub use auth::AuthService;
pub use company_service::CompanyService;
pub use trading_service::TradingService;
