//! Interactive terminal session.
//!
//! Reads one command per line, applies it to a [`RevealController`] and
//! renders the resulting view. Rows are numbered from 1 for the user.
//!
//! ```text
//! > set 1 2
//! > set 2 4
//! Password (11 characters, masked)
//!   row 1  pos  2   *
//!   row 2  pos  4   *
//!   row 3  pos  -   -    5-11
//!   row 4  pos  -   -    5-11
//! ```

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use charpick_core::{
    Cell, ClipboardExporter, ClipboardSink, FieldSet, RevealController, RevealError, RowView,
    SecretField, SessionView, NONE,
};
use thiserror::Error;
use tracing::debug;

const HELP: &str = "\
Commands:
  fields                 list the fields of the record
  field <name|number>    switch to another field
  set <row> <position>   choose a character position for a row (- clears)
  clear <row>            clear a row
  mask                   show or hide the chosen characters
  copy                   copy the chosen characters to the clipboard
  show                   print the current state
  help                   print this help
  quit                   leave";

/// Errors parsing a command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// Blank line.
    #[error("empty command")]
    Empty,

    /// First word is not a command.
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    /// A required argument is missing.
    #[error("missing {0}")]
    MissingArgument(&'static str),

    /// An argument is not a number.
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
}

/// One user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fields,
    /// Switch by name or by 1-based number.
    Field(String),
    /// `row` is 1-based; `position` 0 clears.
    Set { row: usize, position: usize },
    Clear(usize),
    Mask,
    Copy,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(CommandError::Empty);
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "fields" | "ls" => Command::Fields,
            "field" | "f" => {
                let rest: Vec<&str> = words.collect();
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("field name or number"));
                }
                return Ok(Command::Field(rest.join(" ")));
            }
            "set" | "s" => {
                let row = parse_number(words.next(), "row")?;
                let position = match words.next() {
                    Some("-") => NONE,
                    other => parse_number(other, "position")?,
                };
                Command::Set { row, position }
            }
            "clear" | "c" => Command::Clear(parse_number(words.next(), "row")?),
            "mask" | "m" => Command::Mask,
            "copy" | "y" => Command::Copy,
            "show" | "p" => Command::Show,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn parse_number(word: Option<&str>, what: &'static str) -> Result<usize, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument(what))?;
    word.parse()
        .map_err(|_| CommandError::InvalidNumber(word.to_string()))
}

/// Whether the loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A reveal session over one record.
pub struct Session<'f, S: ClipboardSink> {
    fields: &'f FieldSet,
    controller: RevealController<'f>,
    exporter: ClipboardExporter<S>,
}

impl<'f, S: ClipboardSink> Session<'f, S> {
    /// Start a session on the first field of `fields`.
    pub fn new(fields: &'f FieldSet, rows: usize, sink: S) -> Self {
        let mut controller = RevealController::new(rows);
        if let Some(first) = fields.get(0) {
            controller.select_field(first);
        }
        Self {
            fields,
            controller,
            exporter: ClipboardExporter::new(sink),
        }
    }

    /// Read commands from `input` until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        render(&self.controller.view(), out)?;
        writeln!(out, "Type 'help' for commands.")?;

        let mut lines = input.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = lines.next().transpose()? else {
                break;
            };
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(CommandError::Empty) => continue,
                Err(e) => {
                    writeln!(out, "error: {}", e)?;
                    continue;
                }
            };
            if self.execute(command, out)? == Flow::Quit {
                break;
            }
        }

        self.controller.close();
        Ok(())
    }

    /// Apply one command and print its outcome.
    ///
    /// Rejected operations are reported to `out`; only write failures are
    /// returned as errors.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<Flow> {
        debug!(?command, "Executing command");
        let result = match command {
            Command::Fields => {
                list_fields(self.fields, self.controller.active_field().map(|f| f.name()), out)?;
                return Ok(Flow::Continue);
            }
            Command::Field(target) => match self.find_field(&target) {
                Some(field) => {
                    self.controller.select_field(field);
                    Ok(())
                }
                None => {
                    writeln!(out, "error: no field '{}'", target)?;
                    return Ok(Flow::Continue);
                }
            },
            Command::Set { row, position } => {
                to_index(row).and_then(|row| self.controller.set_row_index(row, position))
            }
            Command::Clear(row) => to_index(row).and_then(|row| self.controller.clear_row(row)),
            Command::Mask => self.controller.toggle_mask().map(|_| ()),
            Command::Copy => match self.exporter.export(&self.controller) {
                Ok(count) => {
                    writeln!(out, "Copied {} character(s) to the clipboard.", count)?;
                    return Ok(Flow::Continue);
                }
                Err(e) => Err(e),
            },
            Command::Show => Ok(()),
            Command::Help => {
                writeln!(out, "{}", HELP)?;
                return Ok(Flow::Continue);
            }
            Command::Quit => return Ok(Flow::Quit),
        };

        match result {
            Ok(()) => render(&self.controller.view(), out)?,
            Err(e) => writeln!(out, "error: {}", user_message(&e))?,
        }
        Ok(Flow::Continue)
    }

    fn find_field(&self, target: &str) -> Option<&'f SecretField> {
        let fields: &'f FieldSet = self.fields;
        match target.parse::<usize>() {
            Ok(number) => number.checked_sub(1).and_then(|i| fields.get(i)),
            Err(_) => fields.find(target),
        }
    }
}

/// Convert a 1-based row number to an index.
fn to_index(row: usize) -> Result<usize, RevealError> {
    row.checked_sub(1)
        .ok_or(RevealError::UnknownRow { row, rows: 0 })
}

/// Phrase core errors with 1-based rows.
fn user_message(error: &RevealError) -> String {
    match error {
        RevealError::InvalidSelection { row, index } => {
            format!("position {} is not available on row {}", index, row + 1)
        }
        RevealError::UnknownRow { .. } => "no such row".to_string(),
        other => other.to_string(),
    }
}

fn list_fields<W: Write>(fields: &FieldSet, active: Option<&str>, out: &mut W) -> io::Result<()> {
    if fields.is_empty() {
        return writeln!(out, "No fields.");
    }
    for (i, field) in fields.iter().enumerate() {
        let marker = if Some(field.name()) == active { '*' } else { ' ' };
        let kind = if field.is_masked() { "protected" } else { "plain" };
        writeln!(
            out,
            "{} {}. {} ({} characters, {})",
            marker,
            i + 1,
            field.name(),
            field.len(),
            kind
        )?;
    }
    Ok(())
}

/// Render a view as text.
pub fn render<W: Write>(view: &SessionView, out: &mut W) -> io::Result<()> {
    let Some(field) = &view.field else {
        return writeln!(out, "No field selected.");
    };

    let state = match (view.masked, view.reveal_enabled) {
        (true, _) => "masked",
        (false, true) => "revealed",
        (false, false) => "plain",
    };
    writeln!(out, "{} ({} characters, {})", field, view.field_length, state)?;

    for row in &view.rows {
        writeln!(out, "{}", render_row(row))?;
    }
    Ok(())
}

fn render_row(row: &RowView) -> String {
    let position = if row.chosen == NONE {
        "-".to_string()
    } else {
        row.chosen.to_string()
    };

    let cell = row.cell();
    let shown = match cell {
        Cell::Blank => "-".to_string(),
        Cell::Masked => "*".to_string(),
        Cell::Clear { ch, emphasize, .. } => {
            if emphasize {
                format!("{}^", ch)
            } else {
                ch.to_string()
            }
        }
    };

    let detail = match (cell.description(), row.chosen == NONE) {
        (Some(description), _) => description.to_string(),
        (None, true) => options(&row.candidates),
        (None, false) => String::new(),
    };

    format!("  row {}  pos {:>2}   {:<4} {}", row.row + 1, position, shown, detail)
        .trim_end()
        .to_string()
}

/// Summarize the selectable positions of an empty row.
fn options(candidates: &[usize]) -> String {
    match (candidates.get(1), candidates.last()) {
        (Some(first), Some(last)) if first == last => first.to_string(),
        (Some(first), Some(last)) => format!("{}-{}", first, last),
        _ => "no positions left".to_string(),
    }
}
