pub mod convexity;
pub mod helper;
pub mod point_order;
pub mod types;
