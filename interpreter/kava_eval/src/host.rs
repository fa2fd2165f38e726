//! Host services: program output and line-based input.
//!
//! Output and input are enum-dispatch handlers so the same evaluator runs
//! against stdout/stdin, against buffers in tests, or silently. One output
//! line per `print` statement; one blocking read per `inputi`/`inputs`.

use std::collections::VecDeque;
use std::io::BufRead;

use parking_lot::Mutex;

/// Output handler that captures lines into a buffer, for tests and embedding.
#[derive(Default)]
pub struct BufferOutput {
    buffer: Mutex<String>,
}

impl BufferOutput {
    pub fn new() -> Self {
        BufferOutput::default()
    }

    pub fn println(&self, msg: &str) {
        let mut buf = self.buffer.lock();
        buf.push_str(msg);
        buf.push('\n');
    }

    /// All captured output so far.
    pub fn contents(&self) -> String {
        self.buffer.lock().clone()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

/// Where `print` lines go.
pub enum OutputHandler {
    /// Line-buffered standard output (the default).
    Stdout,
    /// Captured to a buffer.
    Buffer(BufferOutput),
    /// Discarded.
    Silent,
}

impl OutputHandler {
    pub fn println(&self, msg: &str) {
        match self {
            OutputHandler::Stdout => println!("{msg}"),
            OutputHandler::Buffer(buf) => buf.println(msg),
            OutputHandler::Silent => {}
        }
    }

    /// Captured output; empty for non-buffering handlers.
    pub fn contents(&self) -> String {
        match self {
            OutputHandler::Buffer(buf) => buf.contents(),
            _ => String::new(),
        }
    }
}

/// Pre-seeded input lines, for tests.
#[derive(Default)]
pub struct QueueInput {
    lines: Mutex<VecDeque<String>>,
}

impl QueueInput {
    pub fn new(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        QueueInput {
            lines: Mutex::new(lines.into_iter().map(Into::into).collect()),
        }
    }

    fn pop(&self) -> Option<String> {
        self.lines.lock().pop_front()
    }
}

/// Where `inputi`/`inputs` lines come from.
pub enum InputHandler {
    /// Blocking reads from standard input.
    Stdin,
    /// Pops from a pre-seeded queue.
    Queue(QueueInput),
}

impl InputHandler {
    /// One blocking line read; `None` when the source is exhausted.
    pub fn read_line(&self) -> Option<String> {
        match self {
            InputHandler::Stdin => {
                let mut line = String::new();
                let n = std::io::stdin().lock().read_line(&mut line).ok()?;
                if n == 0 {
                    return None;
                }
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Some(line)
            }
            InputHandler::Queue(queue) => queue.pop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_captures_lines_in_order() {
        let out = OutputHandler::Buffer(BufferOutput::new());
        out.println("a");
        out.println("b");
        assert_eq!(out.contents(), "a\nb\n");
    }

    #[test]
    fn silent_discards() {
        let out = OutputHandler::Silent;
        out.println("a");
        assert_eq!(out.contents(), "");
    }

    #[test]
    fn queue_input_drains_then_signals_exhaustion() {
        let input = InputHandler::Queue(QueueInput::new(["5", "hello"]));
        assert_eq!(input.read_line().as_deref(), Some("5"));
        assert_eq!(input.read_line().as_deref(), Some("hello"));
        assert_eq!(input.read_line(), None);
    }
}
