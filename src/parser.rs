//! Command parser for the interactive client.

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_until, take_while1},
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{opt, recognize},
    sequence::{delimited, tuple},
    IResult,
};

#[derive(Debug, PartialEq, Clone)]
pub enum Command {
    /// Re-seed the store from the server's dataset.
    Setup,
    /// Last known position of a satellite at an exact timestamp.
    Last { id: String, at: String },
    /// Closest satellite to (latitude, longitude) at an exact timestamp.
    Closest {
        latitude: f64,
        longitude: f64,
        at: String,
    },
    Help,
    Exit,
}

// --- BASIC PARSERS ---

fn parse_float(input: &str) -> IResult<&str, f64> {
    let (input, num_str) = recognize(tuple((
        opt(char('-')),
        digit1,
        opt(tuple((char('.'), digit1))),
    )))(input)?;
    match num_str.parse::<f64>() {
        Ok(n) => Ok((input, n)),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Float,
        ))),
    }
}

/// A timestamp token: digits plus the `-T:` separators. Format correctness
/// is the server's call; the client only needs to cut the token.
fn parse_timestamp(input: &str) -> IResult<&str, String> {
    let (input, t) =
        take_while1(|c: char| c.is_ascii_digit() || c == '-' || c == 'T' || c == ':')(input)?;
    Ok((input, t.to_string()))
}

/// A satellite id, quoted (`'SAT-1'`, `"SAT-1"`) or bare.
fn parse_id(input: &str) -> IResult<&str, String> {
    if let Ok((rest, id)) = delimited(char::<_, nom::error::Error<&str>>('\''), take_until("'"), char('\''))(input) {
        return Ok((rest, id.to_string()));
    }
    if let Ok((rest, id)) = delimited(char::<_, nom::error::Error<&str>>('"'), take_until("\""), char('"'))(input) {
        return Ok((rest, id.to_string()));
    }
    let (input, id) = take_while1(|c: char| !c.is_whitespace())(input)?;
    Ok((input, id.to_string()))
}

// --- HELPERS ---

fn ws<'a, F, O, E: nom::error::ParseError<&'a str>>(
    inner: F,
) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
    F: FnMut(&'a str) -> IResult<&'a str, O, E>,
{
    delimited(multispace0, inner, multispace0)
}

fn tag_ci(t: &'static str) -> impl FnMut(&str) -> IResult<&str, &str> {
    move |input| tag_no_case(t)(input)
}

// --- COMMAND PARSERS ---

fn parse_setup(input: &str) -> IResult<&str, Command> {
    let (input, _) = tag_ci("SETUP")(input)?;
    Ok((input, Command::Setup))
}

fn parse_last(input: &str) -> IResult<&str, Command> {
    let (input, _) = tag_ci("LAST")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, id) = parse_id(input)?;
    let (input, _) = ws(tag_ci("AT"))(input)?;
    let (input, at) = parse_timestamp(input)?;
    Ok((input, Command::Last { id, at }))
}

fn parse_closest(input: &str) -> IResult<&str, Command> {
    let (input, _) = tag_ci("CLOSEST")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, latitude) = parse_float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, longitude) = parse_float(input)?;
    let (input, _) = ws(tag_ci("AT"))(input)?;
    let (input, at) = parse_timestamp(input)?;
    Ok((
        input,
        Command::Closest {
            latitude,
            longitude,
            at,
        },
    ))
}

fn parse_help(input: &str) -> IResult<&str, Command> {
    let (input, _) = tag_ci("HELP")(input)?;
    Ok((input, Command::Help))
}

fn parse_exit(input: &str) -> IResult<&str, Command> {
    let (input, _) = alt((tag_ci("EXIT"), tag_ci("QUIT")))(input)?;
    Ok((input, Command::Exit))
}

pub fn parse_command(input: &str) -> Result<Command, String> {
    let input = input.trim();
    let result = alt((
        parse_setup,
        parse_last,
        parse_closest,
        parse_help,
        parse_exit,
    ))(input);

    match result {
        Ok((remainder, cmd)) => {
            if !remainder.trim().is_empty() {
                return Err(format!("Unexpected tokens at end: '{}'", remainder));
            }
            Ok(cmd)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let context = if e.input.len() > 20 {
                format!("{}...", &e.input[..20])
            } else {
                e.input.to_string()
            };
            Err(format!("Invalid syntax near: '{}'", context))
        }
        Err(nom::Err::Incomplete(_)) => Err("Incomplete command.".to_string()),
    }
}
