//! Human-readable pass/fail output.

use crate::errors::HarnessError;
use tracing::error;

/// Receives one status line per finished step.
pub trait Reporter: Send + Sync {
    fn report(&self, message: &str, err: Option<&HarnessError>);
}

/// Prints results to stdout, errors indented underneath.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, message: &str, err: Option<&HarnessError>) {
        match err {
            None => println!("{} Passed", message),
            Some(err) => {
                println!("{} Failed", message);
                println!("    {}", err);
                error!(kind = %err.kind(), "{} {}", message, err);
            }
        }
    }
}
