//! Reading and writing procedure files.
//!
//! A procedure file is just the definitions, one after the other, separated by blank lines:
//!
//! ```text
//! TO SQUARE :SIDE
//! REPEAT 4 [FD :SIDE RT 90]
//! END
//!
//! TO STAR
//! REPEAT 5 [FD 100 RT 144]
//! END
//! ```

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{line_ending, multispace0, not_line_ending, space0},
    combinator::{eof, recognize, verify},
    multi::many_till,
    sequence::{terminated, tuple},
    IResult,
};

use crate::{
    define::{is_definition, Feed, Recorder},
    token::normalize,
    typ::{Error, Procedure},
};

pub type Span<'a> = nom_locate::LocatedSpan<&'a str>;

fn line(input: Span) -> IResult<Span, Span> {
    terminated(not_line_ending, alt((line_ending, eof)))(input)
}

fn header(input: Span) -> IResult<Span, Span> {
    verify(line, |s: &Span| is_definition(s.fragment()))(input)
}

fn end_line(input: Span) -> IResult<Span, Span> {
    recognize(tuple((
        space0,
        tag_no_case("END"),
        space0,
        alt((line_ending, eof)),
    )))(input)
}

fn file_error(line: u32, msg: impl Into<String>) -> Error {
    Error::ProcFile {
        line,
        msg: msg.into(),
    }
}

fn block(input: Span) -> Result<(Span, Procedure), Error> {
    let (input, title) =
        header(input).map_err(|_| file_error(input.location_line(), "expected a TO line"))?;
    let title_line = title.location_line();
    let (rest, (body, _)) = many_till(line, end_line)(input)
        .map_err(|_| file_error(title_line, "definition has no END"))?;

    let mut rec = Recorder::start(&normalize(title.fragment()))
        .map_err(|e| file_error(title_line, e.to_string()))?;
    for l in body {
        if rec.feed(&normalize(l.fragment())) == Feed::Skipped {
            return Err(file_error(
                l.location_line(),
                "can't define a procedure inside another one",
            ));
        }
    }
    Ok((rest, rec.finish()))
}

/// Parse a whole procedure file.
pub fn procedures(text: &str) -> Result<Vec<Procedure>, Error> {
    let mut input = Span::new(text);
    let mut ret = Vec::new();
    loop {
        let (rest, _) = multispace0::<_, nom::error::Error<Span>>(input)
            .map_err(|_| file_error(input.location_line(), "unreadable"))?;
        if rest.fragment().is_empty() {
            return Ok(ret);
        }
        let (rest, proc) = block(rest)?;
        ret.push(proc);
        input = rest;
    }
}

/// Render procedures in the format that [`procedures`] reads.
pub fn render<'a>(procs: impl IntoIterator<Item = &'a Procedure>) -> String {
    procs
        .into_iter()
        .map(Procedure::text)
        .collect::<Vec<_>>()
        .join("\n")
}
