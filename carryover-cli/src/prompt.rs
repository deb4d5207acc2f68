//! Interactive resolver reading decisions from the terminal

use std::io::{self, BufRead, Write};

use carryover::resolver::{ResolveKind, ResolveRequest};
use carryover::{Resolution, Resolver};
use tracing::warn;

/// Occurrences listed per question before the rest is summarised
const MAX_LISTED_OCCURRENCES: usize = 10;

/// Asks the operator to pick a translation
///
/// Option 1 asks for a custom translation (empty skips), option 2 skips and
/// options 3 and up are the candidates. `q` or end of input stops the run.
pub struct TerminalResolver<R, W> {
    input: R,
    output: W,
    asked: usize,
}

impl TerminalResolver<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            asked: 0,
        }
    }

    /// Next input line, trimmed; `None` at end of input
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask(&mut self, request: &ResolveRequest<'_>) -> io::Result<Resolution> {
        self.asked += 1;
        let heading = match request.kind {
            ResolveKind::ExactFill => "Multiple translations found",
            ResolveKind::Inconsistency => "Inconsistent translations",
            ResolveKind::ShortTranslation => "Suspiciously short translation",
        };
        writeln!(self.output, "\n{}", "-".repeat(60))?;
        writeln!(self.output, "{} (#{})", heading, self.asked)?;
        writeln!(self.output, "Source: {}", request.source_text)?;

        if !request.occurrences.is_empty() {
            writeln!(self.output, "Found in:")?;
            for location in request.occurrences.iter().take(MAX_LISTED_OCCURRENCES) {
                writeln!(
                    self.output,
                    "  - {}:{} -> '{}'",
                    location.document, location.order, location.target_text
                )?;
            }
            if request.occurrences.len() > MAX_LISTED_OCCURRENCES {
                writeln!(
                    self.output,
                    "  ... and {} more",
                    request.occurrences.len() - MAX_LISTED_OCCURRENCES
                )?;
            }
        }

        writeln!(self.output, "\nOptions:")?;
        writeln!(self.output, "  1. Provide custom translation")?;
        writeln!(self.output, "  2. Skip")?;
        for (i, option) in request.options.iter().enumerate() {
            writeln!(self.output, "  {}. {}", i + 3, option)?;
        }
        let total = request.options.len() + 2;

        loop {
            write!(self.output, "\nChoose option (1-{}, q to quit): ", total)?;
            self.output.flush()?;
            let Some(answer) = self.read_line()? else {
                return Ok(Resolution::Abort);
            };
            if answer.eq_ignore_ascii_case("q") {
                return Ok(Resolution::Abort);
            }
            match answer.parse::<usize>() {
                Ok(1) => {
                    write!(self.output, "Enter custom translation (empty to skip): ")?;
                    self.output.flush()?;
                    return Ok(self
                        .read_line()?
                        .map_or(Resolution::Abort, |custom| Resolution::from_text(&custom)));
                }
                Ok(2) => return Ok(Resolution::Skip),
                Ok(n) if (3..=total).contains(&n) => {
                    return Ok(Resolution::from_text(&request.options[n - 3]));
                }
                _ => writeln!(self.output, "Please enter a number between 1 and {}", total)?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Resolver for TerminalResolver<R, W> {
    fn resolve(&mut self, request: &ResolveRequest<'_>) -> Resolution {
        self.ask(request).unwrap_or_else(|err| {
            warn!("terminal unavailable, stopping: {}", err);
            Resolution::Abort
        })
    }

    fn name(&self) -> &str {
        "prompt"
    }
}
