use std::io;
use std::io::IsTerminal;
use std::io::Write;
use std::path::Path;

use termcolor::Color;
use termcolor::ColorChoice;
use termcolor::ColorSpec;
use termcolor::StandardStream;
use termcolor::StandardStreamLock;
use termcolor::WriteColor;

#[macro_export]
macro_rules! cwrite {
    ($ctor:ident($dst:expr $(, $($arg1:tt)*)?), $($arg2:tt)*) => {{
        let mut w = $crate::ui::$ctor(&mut $dst $(, $($arg1)*)?)?;
        write!(w, $($arg2)*)?;
        $crate::ui::CWrite::finish(w).map(|_| ())
    }};
}

/// A writer which must be finished to restore the state of its inner writer.
pub trait CWrite: WriteColor {
    type Inner;

    fn finish(self) -> io::Result<Self::Inner>;
}

/// A terminal ui wrapper for output messaging.
#[derive(Debug)]
pub struct Ui {
    /// The unlocked stdout stream.
    stdout: StandardStream,

    /// The unlocked stderr stream.
    stderr: StandardStream,
}

/// Returns whether or not a given output stream is connected to a terminal.
pub fn check_terminal<T: IsTerminal>(t: T, choice: ColorChoice) -> ColorChoice {
    match choice {
        // When we use auto and the stream is not a terminal, we disable it
        // since termcolor does not check for this, in any other case we let
        // termcolor figure out what to do.
        ColorChoice::Auto if !t.is_terminal() => ColorChoice::Never,
        other => other,
    }
}

impl Ui {
    /// Creates a new [`Ui`] with the given color choices for stdout and stderr.
    pub fn new(out: ColorChoice, err: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(check_terminal(io::stdout(), out)),
            stderr: StandardStream::stderr(check_terminal(io::stderr(), err)),
        }
    }
}

impl Ui {
    /// Returns an exclusive lock to stdout.
    pub fn stdout(&self) -> StandardStreamLock<'_> {
        self.stdout.lock()
    }

    /// Returns an exclusive lock to stderr.
    pub fn stderr(&self) -> StandardStreamLock<'_> {
        self.stderr.lock()
    }

    /// Returns a writer for emitting a user-facing error.
    pub fn error(&self) -> io::Result<Indented<impl WriteColor + '_>> {
        error(self.stderr())
    }

    /// Returns a writer for emitting a user-facing hint.
    pub fn hint(&self) -> io::Result<Indented<impl WriteColor + '_>> {
        hint(self.stderr())
    }

    /// Flushes and resets both output streams.
    pub fn flush(&self) -> io::Result<()> {
        let mut out = self.stdout();
        let mut err = self.stderr();

        out.reset()?;
        out.flush()?;

        err.reset()?;
        err.flush()?;

        Ok(())
    }
}

/// Returns a writer which writes in the given color.
pub fn colored<W: WriteColor>(w: W, color: Color) -> io::Result<Styled<W>> {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color));
    Styled::new(w, spec)
}

/// Returns a writer which writes bold in the given color.
pub fn bold_colored<W: WriteColor>(w: W, color: Color) -> io::Result<Styled<W>> {
    let mut spec = ColorSpec::new();
    spec.set_bold(true).set_fg(Some(color));
    Styled::new(w, spec)
}

/// Returns a writer for annotated output. Annotated output is output which uses
/// a hanging indent after an initial annotation. The writer will continue on
/// the same line as the annotation.
pub fn annotated<W: WriteColor>(mut w: W, header: &str, color: Color) -> io::Result<Indented<W>> {
    cwrite!(bold_colored(w, color), "{header} ")?;

    // the header is followed by a space which is part of the indent
    Ok(Indented::continued(w, header.len() + 1))
}

/// Returns a writer for emitting a user-facing error.
pub fn error<W: WriteColor>(w: W) -> io::Result<Indented<W>> {
    annotated(w, "error:", Color::Red)
}

/// Returns a writer for emitting a user-facing hint.
pub fn hint<W: WriteColor>(w: W) -> io::Result<Indented<W>> {
    annotated(w, "hint:", Color::Cyan)
}

/// Writes a path quoted and colored.
pub fn write_path(mut w: &mut dyn WriteColor, path: &Path) -> io::Result<()> {
    cwrite!(colored(w, Color::Cyan), "'{}'", path.display())
}

/// Writes a command line flag or command colored.
pub fn write_flag(mut w: &mut dyn WriteColor, flag: &str) -> io::Result<()> {
    cwrite!(colored(w, Color::Cyan), "{flag}")
}

/// Writes content in a fixed color spec which is reset once the writer is
/// finished.
#[derive(Debug)]
pub struct Styled<W> {
    writer: W,
}

impl<W: WriteColor> Styled<W> {
    /// Creates a new writer and applies the given spec.
    pub fn new(mut writer: W, spec: ColorSpec) -> io::Result<Self> {
        writer.set_color(&spec)?;
        Ok(Self { writer })
    }
}

impl<W: WriteColor> Write for Styled<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W: WriteColor> WriteColor for Styled<W> {
    fn supports_color(&self) -> bool {
        self.writer.supports_color()
    }

    fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()> {
        self.writer.set_color(spec)
    }

    fn reset(&mut self) -> io::Result<()> {
        self.writer.reset()
    }
}

impl<W: WriteColor> CWrite for Styled<W> {
    type Inner = W;

    fn finish(mut self) -> io::Result<W> {
        self.writer.reset()?;
        Ok(self.writer)
    }
}

/// Writes content indented, ensuring color specs are correctly enabled and
/// disabled around the indent.
#[derive(Debug)]
pub struct Indented<W> {
    /// The writer to write to.
    writer: W,

    /// The indent of every non-empty line.
    indent: usize,

    /// Whether an indent is required before the next non-empty line.
    need_indent: bool,

    /// The color spec to reactivate after the next indent.
    spec: Option<ColorSpec>,
}

impl<W> Indented<W> {
    /// Creates a new writer which indents every non-empty line.
    #[cfg(test)]
    pub fn new(writer: W, indent: usize) -> Self {
        Self {
            writer,
            indent,
            need_indent: true,
            spec: None,
        }
    }

    /// Creates a new writer which indents every non-empty line after the first
    /// one. This is useful for writers which start on a non-empty line.
    pub fn continued(writer: W, indent: usize) -> Self {
        Self {
            writer,
            indent,
            need_indent: false,
            spec: None,
        }
    }

    /// Returns the inner writer.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: WriteColor> Write for Indented<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_all(buf).map(|_| buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        for line in buf.split_inclusive(|&b| b == b'\n') {
            if self.need_indent && line != b"\n" {
                if self.spec.is_some() {
                    self.writer.reset()?;
                }
                write!(self.writer, "{:1$}", "", self.indent)?;
                if let Some(spec) = &self.spec {
                    self.writer.set_color(spec)?;
                }
                self.need_indent = false;
            }

            self.writer.write_all(line)?;

            if line.ends_with(b"\n") {
                self.need_indent = true;
            }
        }

        Ok(())
    }
}

impl<W: WriteColor> WriteColor for Indented<W> {
    fn supports_color(&self) -> bool {
        self.writer.supports_color()
    }

    fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()> {
        self.spec = Some(spec.clone());
        self.writer.set_color(spec)
    }

    fn reset(&mut self) -> io::Result<()> {
        self.spec = None;
        self.writer.reset()
    }
}

impl<W: WriteColor> CWrite for Indented<W> {
    type Inner = W;

    fn finish(self) -> io::Result<W> {
        Ok(self.writer)
    }
}
