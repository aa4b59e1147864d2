//! Output rendering for the chat application.
//!
//! Replies arrive whole; the renderer replays them one `char` at a time with
//! a short pause in between so the terminal shows a typing effect.  The
//! pacing is cosmetic: the characters written are exactly the characters
//! received, in order, with nothing dropped.

use std::io::{self, Stdout, Write};
use std::thread;
use std::time::Duration;

use crate::observability::RENDER_CHARS;

/// Pause between two rendered characters.
pub const DEFAULT_CHAR_DELAY: Duration = Duration::from_millis(20);

/// ANSI escape code for dim text (used for informational messages).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Paced plain text for an interactive terminal
/// - Unpaced, uncolored text for piping/redirecting
/// - Capturing output in tests
pub trait Renderer: Send {
    /// Print the text of an assistant reply.
    fn print_text(&mut self, text: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when a reply is complete.
    ///
    /// Used to ensure proper newlines after the reply.
    fn finish_response(&mut self);
}

/// Plain text renderer with a typing effect and optional ANSI styling.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    char_delay: Duration,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new renderer on stdout with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new renderer on stdout with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            out: io::stdout(),
            use_color,
            char_delay: DEFAULT_CHAR_DELAY,
        }
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer over an arbitrary writer, without colors.
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            use_color: false,
            char_delay: DEFAULT_CHAR_DELAY,
        }
    }

    /// Sets the pause between characters.  `Duration::ZERO` disables pacing.
    pub fn with_char_delay(mut self, char_delay: Duration) -> Self {
        self.char_delay = char_delay;
        self
    }

    /// Enables or disables ANSI styling.
    pub fn use_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// The pause between characters.
    pub fn char_delay(&self) -> Duration {
        self.char_delay
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Borrows the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    // Terminal write failures are not actionable mid-reply; output is
    // best-effort.
    fn write_str(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }

    fn write_styled(&mut self, style: &str, text: &str) {
        if self.use_color {
            self.write_str(style);
            self.write_str(text);
            self.write_str(ANSI_RESET);
        } else {
            self.write_str(text);
        }
        self.write_str("\n");
        self.flush();
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_text(&mut self, text: &str) {
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            self.write_str(ch.encode_utf8(&mut buf));
            self.flush();
            RENDER_CHARS.click();
            if !self.char_delay.is_zero() {
                thread::sleep(self.char_delay);
            }
        }
    }

    fn print_error(&mut self, error: &str) {
        self.write_styled(ANSI_RED, error);
    }

    fn print_info(&mut self, info: &str) {
        self.write_styled(ANSI_DIM, info);
    }

    fn finish_response(&mut self) {
        self.write_str("\n");
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn captured(renderer: PlainTextRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn renderer_default_has_color_and_delay() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
        assert_eq!(renderer.char_delay(), Duration::from_millis(20));
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn text_is_written_exactly() {
        let mut renderer =
            PlainTextRenderer::with_writer(Vec::new()).with_char_delay(Duration::ZERO);
        let reply = "Héllo, wörld! 👋\nsecond line\ttab";
        renderer.print_text(reply);
        assert_eq!(captured(renderer), reply);
    }

    #[test]
    fn finish_response_adds_newline() {
        let mut renderer =
            PlainTextRenderer::with_writer(Vec::new()).with_char_delay(Duration::ZERO);
        renderer.print_text("done");
        renderer.finish_response();
        assert_eq!(captured(renderer), "done\n");
    }

    #[test]
    fn text_is_paced_per_char() {
        let mut renderer =
            PlainTextRenderer::with_writer(Vec::new()).with_char_delay(Duration::from_millis(5));
        let start = Instant::now();
        renderer.print_text("abcd");
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(captured(renderer), "abcd");
    }

    #[test]
    fn errors_are_colored_only_when_enabled() {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new());
        renderer.print_error("An error occurred: boom");
        assert_eq!(captured(renderer), "An error occurred: boom\n");

        let mut renderer = PlainTextRenderer::with_writer(Vec::new()).use_color(true);
        renderer.print_error("boom");
        assert_eq!(captured(renderer), "\x1b[31mboom\x1b[0m\n");
    }

    #[test]
    fn info_is_dimmed_when_colored() {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new()).use_color(true);
        renderer.print_info("Goodbye!");
        assert_eq!(captured(renderer), "\x1b[2mGoodbye!\x1b[0m\n");
    }
}
