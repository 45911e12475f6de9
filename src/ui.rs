//! # Handler-facing output.
//!
//! [`Ui`] pairs the caller's normal and error writers. Handlers report through it
//! instead of touching the process streams directly.
//!
//! | Method    | Writer | Styling (color on) |
//! |-----------|--------|--------------------|
//! | `output`  | out    | none               |
//! | `info`    | out    | bold               |
//! | `warn`    | err    | yellow             |
//! | `error`   | err    | red                |
//!
//! Write failures are ignored: a closed pipe on the caller's side must not turn into
//! a handler failure.

use console::style;

use crate::logging::Sink;

/// Normal/error writer pair with an optional color flag.
#[derive(Clone, Debug)]
pub struct Ui {
    out: Sink,
    err: Sink,
    color: bool,
}

impl Ui {
    /// Creates a UI over the given writers.
    pub fn new(out: Sink, err: Sink, color: bool) -> Self {
        Self { out, err, color }
    }

    /// Writes a plain line to the normal writer.
    pub fn output(&self, msg: &str) {
        let _ = self.out.write_line(msg);
    }

    /// Writes an informational line to the normal writer.
    pub fn info(&self, msg: &str) {
        let line = self.paint(msg, |s| s.bold());
        let _ = self.out.write_line(&line);
    }

    /// Writes a warning line to the error writer.
    pub fn warn(&self, msg: &str) {
        let line = self.paint(msg, |s| s.yellow());
        let _ = self.err.write_line(&line);
    }

    /// Writes an error line to the error writer.
    pub fn error(&self, msg: &str) {
        let line = self.paint(msg, |s| s.red());
        let _ = self.err.write_line(&line);
    }

    /// Normal writer.
    pub fn out(&self) -> &Sink {
        &self.out
    }

    /// Error writer.
    pub fn err(&self) -> &Sink {
        &self.err
    }

    /// Whether styled output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }

    fn paint(
        &self,
        msg: &str,
        f: impl FnOnce(console::StyledObject<&str>) -> console::StyledObject<&str>,
    ) -> String {
        if self.color {
            f(style(msg)).force_styling(true).to_string()
        } else {
            msg.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Capture;

    #[test]
    fn test_streams_are_routed() {
        let out = Capture::new();
        let err = Capture::new();
        let ui = Ui::new(out.sink(), err.sink(), false);

        ui.output("plain");
        ui.info("note");
        ui.warn("careful");
        ui.error("broken");

        assert_eq!(out.lines(), vec!["plain", "note"]);
        assert_eq!(err.lines(), vec!["careful", "broken"]);
    }

    #[test]
    fn test_color_adds_escape_codes() {
        let err = Capture::new();
        let ui = Ui::new(Sink::discard(), err.sink(), true);
        ui.error("broken");

        let line = err.contents();
        assert!(line.contains("\u{1b}["));
        assert!(line.contains("broken"));
    }
}
