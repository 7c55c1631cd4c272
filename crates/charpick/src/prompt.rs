//! Terminal entry of field values.
//!
//! Protected values are read with `rpassword` (no echo); plain values are
//! read as a line from the given input so they can be piped.

use std::io::{self, BufRead, Write};

use charpick_core::{FieldSource, HostField};
use secrecy::SecretString;
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

/// Errors while reading field values.
#[derive(Debug, Error)]
pub enum PromptError {
    /// Reading from the terminal failed.
    #[error("Failed to read value for '{field}': {source}")]
    Io {
        field: String,
        #[source]
        source: io::Error,
    },

    /// Input ended before a value was entered.
    #[error("No value entered for '{0}'")]
    NoInput(String),
}

/// A field to ask the user for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Host key of the field.
    pub key: String,
    /// Whether the value is protected (entered without echo).
    pub protected: bool,
}

impl FieldSpec {
    /// A protected field.
    pub fn protected(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            protected: true,
        }
    }

    /// A plain field.
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            protected: false,
        }
    }
}

/// Field values entered at the terminal.
#[derive(Debug, Default)]
pub struct PromptedFields {
    fields: Vec<HostField>,
}

impl PromptedFields {
    /// Ask for each field in order.
    ///
    /// Prompts go to stderr. Protected values are read from the terminal
    /// without echo, plain values as one line from `input`.
    pub fn prompt<R: BufRead>(specs: &[FieldSpec], input: &mut R) -> Result<Self, PromptError> {
        let mut fields = Vec::with_capacity(specs.len());

        for spec in specs {
            let value = if spec.protected {
                read_hidden(&spec.key)?
            } else {
                read_plain(&spec.key, input)?
            };
            fields.push(HostField {
                key: spec.key.clone(),
                value,
                protected: spec.protected,
            });
        }

        debug!(count = fields.len(), "Field values entered");
        Ok(Self { fields })
    }

    /// Wrap fields that were obtained elsewhere.
    pub fn from_fields(fields: Vec<HostField>) -> Self {
        Self { fields }
    }
}

impl FieldSource for PromptedFields {
    fn fields(&self) -> Vec<HostField> {
        self.fields.clone()
    }
}

fn read_hidden(key: &str) -> Result<SecretString, PromptError> {
    rpassword::prompt_password(format!("{}: ", key))
        .map(|value| into_secret(Zeroizing::new(value)))
        .map_err(|source| PromptError::Io {
            field: key.to_string(),
            source,
        })
}

fn read_plain<R: BufRead>(key: &str, input: &mut R) -> Result<SecretString, PromptError> {
    let io_error = |source| PromptError::Io {
        field: key.to_string(),
        source,
    };

    eprint!("{}: ", key);
    io::stderr().flush().map_err(io_error)?;

    let mut line = Zeroizing::new(String::new());
    if input.read_line(&mut line).map_err(io_error)? == 0 {
        return Err(PromptError::NoInput(key.to_string()));
    }
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(into_secret(line))
}

/// Copy a read buffer into a `SecretString` and wipe the buffer.
///
/// `SecretString::from(String)` reallocates when the string has spare
/// capacity, leaving the old allocation unwiped. Copying from `&str`
/// allocates exactly the value's length instead.
fn into_secret(value: Zeroizing<String>) -> SecretString {
    SecretString::from(value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Cursor;

    #[test]
    fn plain_fields_are_read_from_input() {
        let specs = [FieldSpec::plain("UserName"), FieldSpec::plain("memorable word")];
        let mut input = Cursor::new("alice\r\notter\n");

        let prompted = PromptedFields::prompt(&specs, &mut input).unwrap();
        let fields = prompted.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].key, "UserName");
        assert_eq!(fields[0].value.expose_secret(), "alice");
        assert!(!fields[0].protected);
        assert_eq!(fields[1].value.expose_secret(), "otter");
    }

    #[test]
    fn missing_input_is_an_error() {
        let specs = [FieldSpec::plain("UserName")];
        let mut input = Cursor::new("");

        let err = PromptedFields::prompt(&specs, &mut input).unwrap_err();
        assert!(matches!(err, PromptError::NoInput(ref key) if key == "UserName"));
    }

    #[test]
    fn protected_and_plain_constructors() {
        assert!(FieldSpec::protected("PIN").protected);
        assert!(!FieldSpec::plain("UserName").protected);
    }

    #[test]
    fn plain_value_keeps_inner_whitespace_and_drops_line_ending() {
        let mut input = Cursor::new("  two words \r\n");
        let value = read_plain("memorable word", &mut input).unwrap();
        assert_eq!(value.expose_secret(), "  two words ");
    }

    #[test]
    fn secret_is_copied_out_of_an_oversized_buffer() {
        let mut buffer = String::with_capacity(64);
        buffer.push_str("Tr0ub4dor&3");
        let secret = into_secret(Zeroizing::new(buffer));
        assert_eq!(secret.expose_secret(), "Tr0ub4dor&3");

        let empty = into_secret(Zeroizing::new(String::with_capacity(8)));
        assert_eq!(empty.expose_secret(), "");
    }

    #[test]
    fn from_fields_is_a_source() {
        let prompted = PromptedFields::from_fields(vec![HostField::new("PIN", "1234", true)]);
        assert_eq!(prompted.fields().len(), 1);
    }
}
