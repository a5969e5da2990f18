mod allocation_calculator;
mod allocation_model;

pub use allocation_calculator::allocation_by_type;
pub use allocation_model::TypeAllocation;
