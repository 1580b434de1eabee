use thiserror::Error;
use workbench_core::CheckError;

use crate::script::ScriptError;

pub(crate) type WorkbenchResult<T> = Result<T, WorkbenchError>;

#[derive(Error, Debug)]
pub(crate) enum WorkbenchError {
    #[error("IO error, more details: {0}")]
    IOError(#[from] std::io::Error),
    #[error("The script is invalid, more details: {0}")]
    Script(#[from] ScriptError),
    #[error("The model has {0} validation error(s).")]
    InvalidModel(usize),
    #[error("The solution violates the model, more details: {0}")]
    InvalidSolution(#[from] CheckError),
}
