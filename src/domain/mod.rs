pub mod artifact;
pub mod registry;
