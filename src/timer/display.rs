use std::io::{self, Write};

/// Presentation surface for the live status line. Decouples the tick loop
/// from the terminal so the loop can be driven headless in tests.
pub trait StatusRenderer: Send {
    fn render(&mut self, line: &str);

    /// Called once when the loop ends so the last status line isn't left
    /// dangling without a newline.
    fn finish(&mut self);
}

/// Renders to stdout by blanking and rewriting a single line in place. The
/// terminal shows one live-updating line instead of a scrolling log.
pub struct ConsoleRenderer {
    blank_width: usize,
}

impl ConsoleRenderer {
    pub fn new() -> ConsoleRenderer {
        ConsoleRenderer { blank_width: 100 }
    }
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusRenderer for ConsoleRenderer {
    fn render(&mut self, line: &str) {
        print!("\r{:width$}\r{line}", "", width = self.blank_width);
        let _ = io::stdout().flush();
    }

    fn finish(&mut self) {
        println!();
    }
}
