//! Core types for charpick.
//!
//! This module contains the small value types shared across the crate:
//! the field record handed over by a host and the Unicode classification
//! used to help users tell look-alike characters apart.

use secrecy::SecretString;
use serde::Serialize;
use unicode_general_category::{get_general_category, GeneralCategory};
use zeroize::Zeroizing;

/// Unicode general category of a revealed character.
///
/// One variant per category, so look-alikes such as `'O'` (uppercase
/// letter), `'0'` (decimal digit) and `'Ⓞ'` (other symbol) are told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CharClass {
    UppercaseLetter,
    LowercaseLetter,
    TitlecaseLetter,
    ModifierLetter,
    OtherLetter,
    NonspacingMark,
    SpacingMark,
    EnclosingMark,
    DecimalDigit,
    /// Letter-like numerals (`'Ⅻ'`).
    LetterNumber,
    OtherNumber,
    ConnectorPunctuation,
    DashPunctuation,
    OpenPunctuation,
    ClosePunctuation,
    InitialPunctuation,
    FinalPunctuation,
    OtherPunctuation,
    MathSymbol,
    CurrencySymbol,
    ModifierSymbol,
    OtherSymbol,
    SpaceSeparator,
    LineSeparator,
    ParagraphSeparator,
    Control,
    /// Invisible formatting characters such as the zero-width space.
    Format,
    Surrogate,
    PrivateUse,
    Unassigned,
}

impl CharClass {
    /// Classify a character.
    ///
    /// # Examples
    ///
    /// ```
    /// use charpick_core::types::CharClass;
    ///
    /// assert_eq!(CharClass::of('T'), CharClass::UppercaseLetter);
    /// assert_eq!(CharClass::of('Ω'), CharClass::UppercaseLetter);
    /// assert_eq!(CharClass::of('0'), CharClass::DecimalDigit);
    /// assert_eq!(CharClass::of('&'), CharClass::OtherPunctuation);
    /// ```
    pub fn of(c: char) -> Self {
        use GeneralCategory as G;

        match get_general_category(c) {
            G::UppercaseLetter => CharClass::UppercaseLetter,
            G::LowercaseLetter => CharClass::LowercaseLetter,
            G::TitlecaseLetter => CharClass::TitlecaseLetter,
            G::ModifierLetter => CharClass::ModifierLetter,
            G::OtherLetter => CharClass::OtherLetter,
            G::NonspacingMark => CharClass::NonspacingMark,
            G::SpacingMark => CharClass::SpacingMark,
            G::EnclosingMark => CharClass::EnclosingMark,
            G::DecimalNumber => CharClass::DecimalDigit,
            G::LetterNumber => CharClass::LetterNumber,
            G::OtherNumber => CharClass::OtherNumber,
            G::ConnectorPunctuation => CharClass::ConnectorPunctuation,
            G::DashPunctuation => CharClass::DashPunctuation,
            G::OpenPunctuation => CharClass::OpenPunctuation,
            G::ClosePunctuation => CharClass::ClosePunctuation,
            G::InitialPunctuation => CharClass::InitialPunctuation,
            G::FinalPunctuation => CharClass::FinalPunctuation,
            G::OtherPunctuation => CharClass::OtherPunctuation,
            G::MathSymbol => CharClass::MathSymbol,
            G::CurrencySymbol => CharClass::CurrencySymbol,
            G::ModifierSymbol => CharClass::ModifierSymbol,
            G::OtherSymbol => CharClass::OtherSymbol,
            G::SpaceSeparator => CharClass::SpaceSeparator,
            G::LineSeparator => CharClass::LineSeparator,
            G::ParagraphSeparator => CharClass::ParagraphSeparator,
            G::Control => CharClass::Control,
            G::Format => CharClass::Format,
            G::Surrogate => CharClass::Surrogate,
            G::PrivateUse => CharClass::PrivateUse,
            G::Unassigned => CharClass::Unassigned,
            // Categories added by later Unicode versions
            #[allow(unreachable_patterns)]
            _ => CharClass::Unassigned,
        }
    }

    /// Short description shown next to an unmasked character.
    pub fn description(&self) -> &'static str {
        match self {
            CharClass::UppercaseLetter => "Uppercase letter",
            CharClass::LowercaseLetter => "Lowercase letter",
            CharClass::TitlecaseLetter => "Titlecase letter",
            CharClass::ModifierLetter => "Modifier letter",
            CharClass::OtherLetter => "Other letter",
            CharClass::NonspacingMark => "Non-spacing mark",
            CharClass::SpacingMark => "Spacing combining mark",
            CharClass::EnclosingMark => "Enclosing mark",
            CharClass::DecimalDigit => "Decimal digit",
            CharClass::LetterNumber => "Letter number",
            CharClass::OtherNumber => "Other number",
            CharClass::ConnectorPunctuation => "Connector punctuation",
            CharClass::DashPunctuation => "Dash punctuation",
            CharClass::OpenPunctuation => "Open punctuation",
            CharClass::ClosePunctuation => "Close punctuation",
            CharClass::InitialPunctuation => "Initial quote punctuation",
            CharClass::FinalPunctuation => "Final quote punctuation",
            CharClass::OtherPunctuation => "Other punctuation",
            CharClass::MathSymbol => "Math symbol",
            CharClass::CurrencySymbol => "Currency symbol",
            CharClass::ModifierSymbol => "Modifier symbol",
            CharClass::OtherSymbol => "Other symbol",
            CharClass::SpaceSeparator => "Space separator",
            CharClass::LineSeparator => "Line separator",
            CharClass::ParagraphSeparator => "Paragraph separator",
            CharClass::Control => "Control character",
            CharClass::Format => "Format character",
            CharClass::Surrogate => "Surrogate",
            CharClass::PrivateUse => "Private use character",
            CharClass::Unassigned => "Unassigned",
        }
    }

    /// Whether an unmasked character of this class deserves emphasis.
    ///
    /// Uppercase letters are easy to confuse with digits and lowercase
    /// forms (`O`/`0`, `I`/`l`), so presentation layers highlight them.
    pub fn is_lookalike_risk(&self) -> bool {
        matches!(self, CharClass::UppercaseLetter)
    }
}

impl std::fmt::Display for CharClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// One named value of a host record, as handed to the core.
#[derive(Clone)]
pub struct HostField {
    /// Key in the host record (e.g. `"Password"`, `"UserName"`, `"PIN"`).
    pub key: String,

    /// The value.
    pub value: SecretString,

    /// Whether the host marks the value as protected.
    pub protected: bool,
}

impl HostField {
    /// Create a host field.
    pub fn new(key: impl Into<String>, value: impl Into<String>, protected: bool) -> Self {
        // Copy out of the caller's buffer, which may carry spare capacity
        let value = Zeroizing::new(value.into());
        Self {
            key: key.into(),
            value: SecretString::from(value.as_str()),
            protected,
        }
    }
}

// Manual Debug implementation to avoid exposing the secret
impl std::fmt::Debug for HostField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostField")
            .field("key", &self.key)
            .field("value", &"[REDACTED]")
            .field("protected", &self.protected)
            .finish()
    }
}
