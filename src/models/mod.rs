pub mod issue;
pub mod task;
