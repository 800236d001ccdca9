use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("task text cannot be empty")]
    EmptyInput,
}
