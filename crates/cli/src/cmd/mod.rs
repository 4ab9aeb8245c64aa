mod build;
mod plan;

pub use build::cmd_build;
pub use plan::cmd_plan;
