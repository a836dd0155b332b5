//! Terminal verdict source
//!
//! Prompts on stdout and reads answers from stdin. The read blocks a
//! dedicated blocking task so the async session stays parked on the live
//! pipeline without tying up the runtime. EOF on stdin means the operator
//! is gone for good.

use async_trait::async_trait;

use sinkcheck_core::{VerdictError, VerdictPrompt, VerdictSource};

/// Asks the person at the terminal for a pass/fail call on each playing
/// configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleVerdicts;

#[async_trait]
impl VerdictSource for ConsoleVerdicts {
    async fn ask(&self, prompt: &VerdictPrompt) -> Result<bool, VerdictError> {
        println!();
        println!(
            "[{}/{}] {} is playing:",
            prompt.position, prompt.total, prompt.sink
        );
        println!("        {}", prompt.configuration);

        tokio::task::spawn_blocking(read_verdict)
            .await
            .map_err(|e| VerdictError::Io(e.to_string()))?
    }
}

/// Blocking stdin loop: re-asks until an answer parses; EOF closes the
/// interface.
fn read_verdict() -> Result<bool, VerdictError> {
    use std::io::{BufRead, Write};

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("Is it working? [y/n] ");
        std::io::stdout()
            .flush()
            .map_err(|e| VerdictError::Io(e.to_string()))?;

        line.clear();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| VerdictError::Io(e.to_string()))?;
        if read == 0 {
            return Err(VerdictError::Closed);
        }
        match parse_answer(&line) {
            Some(verdict) => return Ok(verdict),
            None => println!("Please answer y or n."),
        }
    }
}

fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
