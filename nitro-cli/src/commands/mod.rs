pub mod apply;
pub mod hosts;
pub mod remove;
pub mod status;
