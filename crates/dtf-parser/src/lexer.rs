//! Lexical primitives for token values.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, char, digit1, multispace0},
    combinator::{map, map_res, opt, recognize, verify},
    multi::separated_list1,
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};

/// Parse a number (integer or float, optionally negative, leading dot allowed).
pub fn number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit1)))),
                recognize(pair(char('.'), digit1)),
            )),
        ))),
        |s: &str| s.parse::<f64>(),
    )(input)
}

/// Parse a unit suffix: `%` or any alphabetic run (`px`, `rem`, `em`, ...).
pub fn unit(input: &str) -> IResult<&str, &str> {
    alt((tag("%"), alpha1))(input)
}

/// A number followed directly by an optional unit.
pub fn dimension(input: &str) -> IResult<&str, (f64, Option<&str>)> {
    delimited(multispace0, pair(number, opt(unit)), multispace0)(input)
}

/// Hex digits of a `#rgb` or `#rrggbb` literal.
pub fn hex_color(input: &str) -> IResult<&str, &str> {
    preceded(
        char('#'),
        verify(take_while1(|c: char| c.is_ascii_hexdigit()), |s: &str| {
            s.len() == 3 || s.len() == 6
        }),
    )(input)
}

/// One argument of a color function: a number with an optional `%`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Argument {
    pub value: f64,
    pub percent: bool,
}

fn argument(input: &str) -> IResult<&str, Argument> {
    map(
        delimited(multispace0, pair(number, opt(char('%'))), multispace0),
        |(value, percent)| Argument { value, percent: percent.is_some() },
    )(input)
}

/// A functional color literal such as `rgba(1, 2, 3, 0.5)`.
pub fn color_function(input: &str) -> IResult<&str, (&str, Vec<Argument>)> {
    pair(
        terminated(alpha1, multispace0),
        delimited(char('('), separated_list1(char(','), argument), char(')')),
    )(input)
}

fn field_name(input: &str) -> IResult<&str, &str> {
    delimited(
        multispace0,
        alt((delimited(char('"'), alpha1, char('"')), alpha1)),
        multispace0,
    )(input)
}

/// A float-object literal `{ r: 0.1, g: 0.2, b: 0.3, opacity: 1 }`.
///
/// Keys may be bare or double-quoted.
pub fn float_object(input: &str) -> IResult<&str, Vec<(&str, f64)>> {
    delimited(
        char('{'),
        separated_list1(
            char(','),
            separated_pair(field_name, char(':'), delimited(multispace0, number, multispace0)),
        ),
        char('}'),
    )(input)
}
