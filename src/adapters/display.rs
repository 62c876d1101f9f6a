//! Status display adapter that writes through the log.
//!
//! Headless boxes have no screen; the status lines go to the same
//! stream as everything else.

use log::info;

use crate::app::ports::DisplayPort;
use crate::error::DisplayError;

#[derive(Debug, Default)]
pub struct LogDisplay {
    last: String,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently rendered text.
    pub fn last(&self) -> &str {
        &self.last
    }
}

impl DisplayPort for LogDisplay {
    fn render(&mut self, text: &str) -> Result<(), DisplayError> {
        for line in text.lines() {
            info!("DISPLAY | {}", line.trim_end());
        }
        self.last.clear();
        self.last.push_str(text);
        Ok(())
    }
}
