pub mod ingredient;
pub mod product;
pub mod substitute;
