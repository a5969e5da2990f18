//! Investment records exchanged with the persistence layer.

mod investment;
mod investment_type;

pub use investment::Investment;
pub use investment_type::InvestmentType;
