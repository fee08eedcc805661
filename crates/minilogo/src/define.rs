//! Recording `TO ... END` definitions.

use crate::typ::{Error, Procedure};

/// Names that can never be given to a procedure.
pub const RESERVED: &[&str] = &["OUTPUT", "TO", "SAVE", "LOAD", "QUIT", "END"];

const FORBIDDEN: &[char] = &[':', '"', '+', '-', '*', '/', '[', ']'];

/// Can `name` be used for a procedure, parameter or variable?
pub fn valid_identifier(name: &str) -> bool {
    match name.chars().next() {
        None => false,
        Some(c) if c.is_ascii_digit() => false,
        Some(_) => !name.contains(FORBIDDEN) && !name.contains(char::is_whitespace),
    }
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// Does this line start a procedure definition?
pub fn is_definition(line: &str) -> bool {
    let t = line.trim_start();
    t.get(..2).map_or(false, |to| to.eq_ignore_ascii_case("TO"))
        && t[2..].chars().next().map_or(true, char::is_whitespace)
}

/// Does this line end a procedure definition?
pub fn is_end(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("END")
}

/// The parsed `TO` line.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub name: String,
    /// Without the leading colons.
    pub params: Vec<String>,
}

pub fn parse_header(line: &str) -> Result<Header, Error> {
    let mut words = line.split_whitespace();
    // The caller has already checked for the `TO`.
    words.next();
    let name = words.next().ok_or_else(|| Error::BadArgumentCount {
        proc: "TO".to_owned(),
    })?;
    if is_reserved(name) {
        return Err(Error::ReservedName {
            name: name.to_owned(),
        });
    }
    if !valid_identifier(name) {
        return Err(Error::InvalidIdentifier {
            name: name.to_owned(),
        });
    }
    let params = words
        .map(|p| match p.strip_prefix(':') {
            Some(param) if valid_identifier(param) => Ok(param.to_owned()),
            _ => Err(Error::InvalidIdentifier { name: p.to_owned() }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Header {
        name: name.to_owned(),
        params,
    })
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum State {
    AwaitingLine,
    Accumulating,
    Done,
}

/// What happened to a line fed to a [`Recorder`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Feed {
    /// The line was added to the body; keep going.
    More,
    /// The line tried to start another definition, and was dropped.
    Skipped,
    /// That was the `END`.
    Done,
}

/// Accumulates the body of a procedure, one line at a time.
#[derive(Clone, Debug)]
pub struct Recorder {
    header: Header,
    lines: Vec<String>,
    state: State,
}

impl Recorder {
    pub fn start(line: &str) -> Result<Recorder, Error> {
        Ok(Recorder {
            header: parse_header(line)?,
            lines: Vec::new(),
            state: State::AwaitingLine,
        })
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn feed(&mut self, line: &str) -> Feed {
        if is_end(line) {
            self.state = State::Done;
            Feed::Done
        } else if line.trim().is_empty() {
            Feed::More
        } else if is_definition(line) {
            log::warn!("ignoring nested definition in {}", self.header.name);
            Feed::Skipped
        } else {
            self.lines.push(line.to_owned());
            self.state = State::Accumulating;
            Feed::More
        }
    }

    /// The finished procedure. A missing `END` is as good as one.
    pub fn finish(self) -> Procedure {
        Procedure {
            name: self.header.name,
            params: self.header.params,
            body: self.lines.join("\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(valid_identifier("SQUARE"));
        assert!(valid_identifier("SQUARE2"));
        assert!(valid_identifier("A.B"));
        assert!(!valid_identifier(""));
        assert!(!valid_identifier("2SQUARE"));
        assert!(!valid_identifier("A-B"));
        assert!(!valid_identifier(":A"));
        assert!(!valid_identifier("A B"));
    }

    #[test]
    fn definitions() {
        assert!(is_definition("TO SQUARE"));
        assert!(is_definition("to square :side"));
        assert!(is_definition("TO"));
        assert!(!is_definition("TOWER"));
        assert!(!is_definition("T"));
        assert!(!is_definition("FD 10"));
        assert!(is_end(" end "));
        assert!(!is_end("ENDING"));
    }

    #[test]
    fn headers() {
        assert_eq!(
            parse_header("TO SQUARE :SIDE :N"),
            Ok(Header {
                name: "SQUARE".to_owned(),
                params: vec!["SIDE".to_owned(), "N".to_owned()],
            })
        );
        assert_eq!(
            parse_header("TO OUTPUT"),
            Err(Error::ReservedName {
                name: "OUTPUT".to_owned()
            })
        );
        assert_eq!(
            parse_header("TO 9LIVES"),
            Err(Error::InvalidIdentifier {
                name: "9LIVES".to_owned()
            })
        );
        assert_eq!(
            parse_header("TO SQUARE SIDE"),
            Err(Error::InvalidIdentifier {
                name: "SIDE".to_owned()
            })
        );
        assert_eq!(
            parse_header("TO"),
            Err(Error::BadArgumentCount {
                proc: "TO".to_owned()
            })
        );
    }

    #[test]
    fn recording() {
        let mut rec = Recorder::start("TO SQUARE :SIDE").unwrap();
        assert_eq!(rec.state(), State::AwaitingLine);
        assert_eq!(rec.feed("REPEAT 4 [FD :SIDE RT 90]"), Feed::More);
        assert_eq!(rec.state(), State::Accumulating);
        assert_eq!(rec.feed("TO OTHER"), Feed::Skipped);
        assert_eq!(rec.feed(""), Feed::More);
        assert_eq!(rec.feed("PU"), Feed::More);
        assert_eq!(rec.feed("END"), Feed::Done);
        assert_eq!(rec.state(), State::Done);
        let proc = rec.finish();
        assert_eq!(proc.name, "SQUARE");
        assert_eq!(proc.body, "REPEAT 4 [FD :SIDE RT 90]\nPU");
    }
}
