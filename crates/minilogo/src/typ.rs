use crate::token::parse_number;

/// A runtime value.
///
/// Everything in this LOGO is text: numbers and booleans are just words that happen to parse as
/// numbers or as `TRUE`/`FALSE`. Lists keep their (unevaluated) inner text, and are only tokenized
/// again when something runs them.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Word(String),
    /// The text between the outer brackets.
    List(String),
}

impl Value {
    pub fn word(s: impl Into<String>) -> Value {
        Value::Word(s.into())
    }

    pub fn list(s: impl Into<String>) -> Value {
        Value::List(s.into())
    }

    pub fn num(x: f64) -> Value {
        Value::Word(format_num(x))
    }

    pub fn boolean(b: bool) -> Value {
        Value::Word(if b { "TRUE" } else { "FALSE" }.to_owned())
    }

    pub fn empty() -> Value {
        Value::Word(String::new())
    }

    pub fn as_word(&self) -> Option<&str> {
        match self {
            Value::Word(w) => Some(w),
            Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&str> {
        match self {
            Value::List(l) => Some(l),
            Value::Word(_) => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        self.as_word().and_then(parse_number)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.as_word()? {
            w if w.eq_ignore_ascii_case("TRUE") => Some(true),
            w if w.eq_ignore_ascii_case("FALSE") => Some(false),
            _ => None,
        }
    }

    /// The form used by `PRINT`: like `Display`, but without the outer brackets of a list.
    pub fn print_form(&self) -> &str {
        match self {
            Value::Word(w) | Value::List(w) => w,
        }
    }

    /// Combine the values produced by running a list.
    ///
    /// Nothing produced means no value, a single value is passed through unchanged, and several
    /// values are gathered into a list.
    pub fn collect(values: Vec<Value>) -> Option<Value> {
        match values.len() {
            0 => None,
            1 => values.into_iter().next(),
            _ => Some(Value::List(
                values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
            )),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Word(w) => f.write_str(w),
            Value::List(l) => f.write_fmt(format_args!("[{l}]")),
        }
    }
}

/// Formats a computed number the way it should be spliced back into an instruction.
///
/// Integers print without a decimal point, and anything else is rounded to six places so that
/// trigonometric noise (`49.99999999999999`) doesn't leak into the output.
pub fn format_num(x: f64) -> String {
    let s = format!("{x:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_owned()
    } else {
        s.to_owned()
    }
}

/// A user-defined procedure.
#[derive(Clone, Debug, PartialEq)]
pub struct Procedure {
    pub name: String,
    /// Parameter names, without the leading `:`.
    pub params: Vec<String>,
    /// Normalized body lines, joined by newlines.
    pub body: String,
}

impl Procedure {
    /// The `TO` line that introduces this procedure.
    pub fn title(&self) -> String {
        let mut ret = format!("TO {}", self.name);
        for p in &self.params {
            ret.push_str(" :");
            ret.push_str(p);
        }
        ret
    }

    /// The full definition, in the same form that `SAVE` writes it.
    pub fn text(&self) -> String {
        let mut ret = self.title();
        ret.push('\n');
        if !self.body.is_empty() {
            ret.push_str(&self.body);
            ret.push('\n');
        }
        ret.push_str("END\n");
        ret
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Stack exhausted: calls nested more than {limit} deep")]
    StackExhausted { limit: usize },
    #[error("I don't know how to {name}")]
    UnknownCommand { name: String },
    #[error("Not enough inputs to {proc}")]
    BadArgumentCount { proc: String },
    #[error("Unbalanced brackets in list")]
    MalformedList,
    #[error("{name} has no value")]
    UnknownVariable { name: String },
    #[error("{name} is not a valid name")]
    InvalidIdentifier { name: String },
    #[error("{name} is a reserved word")]
    ReservedName { name: String },
    #[error("{name} is already a local variable")]
    DuplicateLocal { name: String },
    #[error("OUTPUT can only be used inside a procedure")]
    ReturnOutsideProcedure,
    #[error("Turtle out of bounds")]
    FenceViolation,
    #[error("I can't erase {name}: it isn't defined")]
    EraseFailure { name: String },
    #[error("{what} is not supported")]
    Unsupported { what: String },
    #[error("{proc} doesn't like {arg} as input")]
    BadArgument { proc: String, arg: Value },
    #[error("{callee} didn't output to {proc}")]
    NoOutput { callee: String, proc: String },
    #[error("You don't say what to do with {val}")]
    UnusedValue { val: Value },
    #[error("File error: {msg}")]
    Io { msg: String },
    #[error("Bad procedure file at line {line}: {msg}")]
    ProcFile { line: u32, msg: String },
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io { msg: e.to_string() }
    }
}
