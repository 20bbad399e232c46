//! The `exec` step: run an external program.
//!
//! Params:
//!
//! | key                 | type                       | meaning                                   |
//! |---------------------|----------------------------|-------------------------------------------|
//! | `command`           | string (required)          | program to run                            |
//! | `args`              | list                       | program arguments                         |
//! | `directory`         | string                     | working directory, relative to the cwd    |
//! | `env`               | list of `K=V` or map       | extra environment variables               |
//! | `continue_on_error` | bool                       | tolerate any failing exit code            |
//! | `ignore_exit_codes` | list of integers           | exit codes treated as success             |
//! | `print_stdout`      | bool                       | echo captured stdout                      |
//! | `print_stderr`      | bool                       | echo captured stderr                      |
//!
//! A string or bytes input is written to the program's stdin. The output
//! is the captured stdout followed by the captured stderr.

use std::path::PathBuf;

use crate::action::{Params, Value};
use crate::error::StepError;
use crate::shell::{display_command, execute, CommandOptions};

use super::params;
use super::registry::StepRunner;

/// Runs an external program.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecRunner;

impl StepRunner for ExecRunner {
    fn run(
        &self,
        input: Option<&Value>,
        params: &Params,
    ) -> std::result::Result<Option<Value>, StepError> {
        let command = params::required_string(params, "command")?;
        let args = params::string_list(params, "args")?;
        let env = params::env_map(params, "env")?;
        let continue_on_error = params::flag(params, "continue_on_error")?;
        let ignore_exit_codes = params::int_list(params, "ignore_exit_codes")?;
        let print_stdout = params::flag(params, "print_stdout")?;
        let print_stderr = params::flag(params, "print_stderr")?;

        let cwd = match params::string(params, "directory")? {
            Some(dir) => Some(resolve_directory(dir)?),
            None => None,
        };

        let stdin = match input {
            None => None,
            Some(value) => Some(
                value
                    .as_bytes()
                    .ok_or_else(|| StepError::InvalidInput {
                        message: format!("exec expects string or bytes input, got {}", value.kind()),
                    })?
                    .to_vec(),
            ),
        };

        let options = CommandOptions { cwd, env, stdin };
        let rendered = display_command(command, &args);

        let result = execute(command, &args, &options).map_err(|e| StepError::Spawn {
            command: rendered.clone(),
            message: e.to_string(),
        })?;

        if !result.success {
            let ignored = result
                .exit_code
                .is_some_and(|code| ignore_exit_codes.contains(&i64::from(code)));

            if !ignored && !continue_on_error {
                return Err(StepError::CommandFailed {
                    command: rendered,
                    code: result.exit_code,
                    stdout: result.stdout.trim().to_string(),
                    stderr: result.stderr.trim().to_string(),
                });
            }

            tracing::debug!(
                "tolerating exit code {:?} of {}",
                result.exit_code,
                rendered
            );
        }

        if print_stdout {
            print!("{}", result.stdout);
        }
        if print_stderr {
            print!("{}", result.stderr);
        }

        Ok(Some(Value::String(result.stdout + &result.stderr)))
    }
}

fn resolve_directory(dir: &str) -> std::result::Result<PathBuf, StepError> {
    let path = PathBuf::from(dir);
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
