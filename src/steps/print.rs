//! The `print` step: write the input value to stdout or stderr.
//!
//! Set the `stream` param to `"stderr"` to print to stderr. Produces no
//! output value.

use std::io::Write;

use crate::action::{Params, Value};
use crate::error::StepError;

use super::params;
use super::registry::StepRunner;

/// Prints its input.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintRunner;

/// Text printed for a value.
pub fn render(input: Option<&Value>) -> std::result::Result<String, StepError> {
    match input {
        None => Err(StepError::InvalidInput {
            message: "print requires an input".to_string(),
        }),
        Some(Value::Structured(_)) => Err(StepError::UnsupportedType {
            kind: "structured".to_string(),
        }),
        Some(value) => Ok(value.to_string()),
    }
}

impl StepRunner for PrintRunner {
    fn run(
        &self,
        input: Option<&Value>,
        params: &Params,
    ) -> std::result::Result<Option<Value>, StepError> {
        let text = render(input)?;

        if params::string(params, "stream")? == Some("stderr") {
            let mut stderr = std::io::stderr().lock();
            stderr.write_all(text.as_bytes())?;
            stderr.flush()?;
        } else {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }

        Ok(None)
    }
}
