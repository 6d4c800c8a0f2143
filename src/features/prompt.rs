use rust_decimal::prelude::*;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum PromptError {
    #[error("Invalid input {input:?}, expected {expected}")]
    Invalid {
        input: String,
        expected: &'static str,
    },

    #[error("Input stream closed")]
    Closed,

    #[error("Console I/O failed - {0}")]
    Io(#[from] io::Error),
}

pub(crate) type PromptResult<T> = anyhow::Result<T, PromptError>;

/// Line-oriented console over any reader/writer pair
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writes `text` without a newline and flushes it ahead of the next read.
    pub(crate) fn prompt(&mut self, text: &str) -> PromptResult<()> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        Ok(())
    }

    pub(crate) fn say(&mut self, text: &str) -> PromptResult<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Next line without its terminator.
    pub(crate) fn read_line(&mut self) -> PromptResult<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    pub(crate) fn read_integer(&mut self) -> PromptResult<i32> {
        let line = self.read_line()?;
        line.trim().parse().map_err(|_| PromptError::Invalid {
            input: line,
            expected: "a whole number",
        })
    }

    /// Accepts plain (`12.50`) and scientific (`1.25e1`) notation.
    pub(crate) fn read_amount(&mut self) -> PromptResult<Decimal> {
        let line = self.read_line()?;
        let text = line.trim();
        Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map_err(|_| PromptError::Invalid {
                input: line.clone(),
                expected: "an amount",
            })
    }

    #[cfg(test)]
    pub(crate) fn output(&self) -> &W {
        &self.output
    }
}
