use std::fmt::{Display, Formatter};

/// Leading keyword of a CUE line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword {
    Rem,
    Catalog,
    CdTextFile,
    Title,
    Performer,
    Songwriter,
    File,
    Track,
    Flags,
    Isrc,
    Pregap,
    Index,
    Postgap,
    Unknown(String),
}

impl Keyword {
    pub fn parse(token: &str) -> Self {
        match token.to_ascii_uppercase().as_str() {
            "REM" => Keyword::Rem,
            "CATALOG" => Keyword::Catalog,
            "CDTEXTFILE" => Keyword::CdTextFile,
            "TITLE" => Keyword::Title,
            "PERFORMER" => Keyword::Performer,
            "SONGWRITER" => Keyword::Songwriter,
            "FILE" => Keyword::File,
            "TRACK" => Keyword::Track,
            "FLAGS" => Keyword::Flags,
            "ISRC" => Keyword::Isrc,
            "PREGAP" => Keyword::Pregap,
            "INDEX" => Keyword::Index,
            "POSTGAP" => Keyword::Postgap,
            _ => Keyword::Unknown(token.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Keyword::Rem => "REM",
            Keyword::Catalog => "CATALOG",
            Keyword::CdTextFile => "CDTEXTFILE",
            Keyword::Title => "TITLE",
            Keyword::Performer => "PERFORMER",
            Keyword::Songwriter => "SONGWRITER",
            Keyword::File => "FILE",
            Keyword::Track => "TRACK",
            Keyword::Flags => "FLAGS",
            Keyword::Isrc => "ISRC",
            Keyword::Pregap => "PREGAP",
            Keyword::Index => "INDEX",
            Keyword::Postgap => "POSTGAP",
            Keyword::Unknown(raw) => raw,
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One non-blank input line, split into its keyword and the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueLine {
    /// One-based line number in the document.
    pub number: usize,
    pub keyword: Keyword,
    pub args: String,
}

impl CueLine {
    /// Classifies a raw line. Blank lines yield `None`.
    pub fn parse(number: usize, raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let (keyword, args) = split_token(trimmed);
        Some(Self {
            number,
            keyword: Keyword::parse(keyword),
            args: args.to_string(),
        })
    }
}

/// Splits off the first whitespace-delimited token.
pub fn split_token(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim_start()),
        None => (text, ""),
    }
}

// Opening quote and the closing quotes accepted for it.
const QUOTE_PAIRS: &[(char, &[char])] = &[
    ('"', &['"']),
    ('\u{201C}', &['\u{201D}', '\u{201C}']),
    ('\u{201E}', &['\u{201C}', '\u{201D}']),
    ('\u{2018}', &['\u{2019}']),
    ('\u{201A}', &['\u{2018}', '\u{2019}']),
    ('\u{00AB}', &['\u{00BB}']),
    ('\u{00BB}', &['\u{00AB}']),
];

/// Result of reading a possibly quoted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quoted<'a> {
    pub value: &'a str,
    /// Whatever follows the closing quote.
    pub rest: &'a str,
    /// The value was opened with a quote that never got closed.
    pub unterminated: bool,
}

/// Reads a value that may be wrapped in straight or typographic quotes.
///
/// The closing quote is the last matching one on the line, so quotes inside
/// the value survive. Unquoted values run to the end of the text.
pub fn unquote(text: &str) -> Quoted<'_> {
    let text = text.trim();
    let Some(open) = text.chars().next() else {
        return Quoted {
            value: "",
            rest: "",
            unterminated: false,
        };
    };
    let Some((_, closes)) = QUOTE_PAIRS.iter().find(|(candidate, _)| *candidate == open) else {
        return Quoted {
            value: text,
            rest: "",
            unterminated: false,
        };
    };

    let body = &text[open.len_utf8()..];
    match body.rfind(|c: char| closes.contains(&c)) {
        Some(end) => {
            let close_len = body[end..].chars().next().map_or(1, char::len_utf8);
            Quoted {
                value: &body[..end],
                rest: body[end + close_len..].trim(),
                unterminated: false,
            }
        }
        None => Quoted {
            value: body.trim_end(),
            rest: "",
            unterminated: true,
        },
    }
}

/// Splits the arguments of a FILE line into path and type token.
///
/// Quoted paths may be followed by the type. Unquoted paths may contain
/// spaces; the last token is then taken as the type.
pub fn split_file_args(args: &str) -> (Quoted<'_>, Option<&str>) {
    let quoted = unquote(args);
    if quoted.value.len() != args.trim().len() || quoted.unterminated {
        let file_type = Some(quoted.rest).filter(|rest| !rest.is_empty());
        return (
            Quoted {
                rest: "",
                ..quoted
            },
            file_type,
        );
    }

    let args = args.trim();
    match args.rfind(char::is_whitespace) {
        Some(split) => (
            Quoted {
                value: args[..split].trim_end(),
                rest: "",
                unterminated: false,
            },
            Some(args[split..].trim_start()),
        ),
        None => (quoted, None),
    }
}
