pub mod help;
pub mod wizard;
