//! Text front end: reads Prolog source into [`Term`]s and [`Clause`]s.
//!
//! Supported syntax is the subset the engine understands: atoms (`tom`,
//! `42`, `'New York'`), variables (`X`, `_Rest`, `_`), compound terms
//! (`parent(tom, X)`, and `f()` with no arguments), the infix goal `A \= B`, parenthesized conjunctions,
//! clauses (`head.` and `head :- goal, goal.`) and `%` line comments.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_while, take_while1},
    character::complete::{char, multispace1, satisfy},
    combinator::{all_consuming, map, map_opt, opt, recognize, value},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
    Finish, IResult,
};

use crate::error::{Error, Result};
use crate::term::{Clause, Term};

fn comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('%'), opt(is_not("\r\n"))))(input)
}

/// Whitespace and comments
fn ws(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((multispace1, comment))))(input)
}

fn lexeme<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    preceded(ws, inner)
}

fn identifier_tail(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn plain_name(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(satisfy(|c| c.is_ascii_lowercase()), identifier_tail)),
        String::from,
    )(input)
}

fn number(input: &str) -> IResult<&str, String> {
    map(take_while1(|c: char| c.is_ascii_digit()), String::from)(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    let escape = alt((
        value("\\", char('\\')),
        value("'", char('\'')),
        value("\n", char('n')),
        value("\t", char('t')),
    ));
    delimited(
        char('\''),
        map(
            opt(escaped_transform(is_not("\\'"), '\\', escape)),
            Option::unwrap_or_default,
        ),
        char('\''),
    )(input)
}

fn name(input: &str) -> IResult<&str, String> {
    alt((plain_name, number, quoted))(input)
}

fn variable(input: &str) -> IResult<&str, Term> {
    map(
        recognize(pair(
            satisfy(|c| c.is_ascii_uppercase() || c == '_'),
            identifier_tail,
        )),
        |name: &str| Term::var(name),
    )(input)
}

/// An atom, or a compound term when the name is directly followed by `(`
fn structure(input: &str) -> IResult<&str, Term> {
    let (input, name) = name(input)?;
    let (input, args) = opt(delimited(
        char('('),
        separated_list0(lexeme(char(',')), goal),
        lexeme(char(')')),
    ))(input)?;
    let term = match args {
        Some(args) => Term::compound(name, args),
        None => Term::Atom(name),
    };
    Ok((input, term))
}

fn parenthesized(input: &str) -> IResult<&str, Term> {
    delimited(char('('), conjunction, lexeme(char(')')))(input)
}

fn primary(input: &str) -> IResult<&str, Term> {
    lexeme(alt((parenthesized, variable, structure)))(input)
}

/// A term, or `term \= term`
fn goal(input: &str) -> IResult<&str, Term> {
    let (input, left) = primary(input)?;
    let (input, right) = opt(preceded(lexeme(tag("\\=")), primary))(input)?;
    let term = match right {
        Some(right) => Term::not_unifiable(left, right),
        None => left,
    };
    Ok((input, term))
}

fn goals(input: &str) -> IResult<&str, Vec<Term>> {
    separated_list1(lexeme(char(',')), goal)(input)
}

fn conjunction(input: &str) -> IResult<&str, Term> {
    map_opt(goals, |list: Vec<Term>| Term::conjunction(list))(input)
}

fn clause(input: &str) -> IResult<&str, Clause> {
    let (input, head) = primary(input)?;
    let (input, body) = opt(preceded(lexeme(tag(":-")), goals))(input)?;
    let (input, _) = lexeme(char('.'))(input)?;
    Ok((input, Clause::rule(head, body.unwrap_or_default())))
}

fn query(input: &str) -> IResult<&str, Term> {
    terminated(
        preceded(opt(lexeme(tag("?-"))), conjunction),
        opt(lexeme(char('.'))),
    )(input)
}

/// Runs `parser` over the whole input, allowing trailing whitespace
fn parse_all<'a, O, F>(parser: F, input: &'a str) -> Result<O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    all_consuming(terminated(parser, ws))(input)
        .finish()
        .map(|(_, output)| output)
        .map_err(|err| {
            let message = if err.input.trim().is_empty() {
                "unexpected end of input".to_string()
            } else {
                format!("unexpected input ({})", err.code.description())
            };
            Error::Parse {
                input: err.input.chars().take(32).collect(),
                message,
            }
        })
}

/// Gives every `_` its own name so that each occurrence is a distinct variable
fn name_anonymous(term: &Term, counter: &mut usize) -> Term {
    match term {
        Term::Variable(name) if name == "_" => {
            *counter += 1;
            Term::Variable(format!("_#{counter}"))
        }
        Term::Compound { functor, args } => Term::Compound {
            functor: functor.clone(),
            args: args.iter().map(|arg| name_anonymous(arg, counter)).collect(),
        },
        _ => term.clone(),
    }
}

/// Parse a single term, e.g. `parent(tom, X)`.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the input is not exactly one term.
pub fn parse_term(input: &str) -> Result<Term> {
    let term = parse_all(goal, input)?;
    Ok(name_anonymous(&term, &mut 0))
}

/// Parse a query: goals separated by commas, optionally introduced by `?-`
/// and terminated by `.`. Several goals become a right-nested conjunction.
///
/// # Errors
///
/// Returns [`Error::Parse`] on malformed input.
pub fn parse_query(input: &str) -> Result<Term> {
    let query = parse_all(query, input)?;
    Ok(name_anonymous(&query, &mut 0))
}

/// Parse one clause ending in `.`
///
/// # Errors
///
/// Returns [`Error::Parse`] if the input is not exactly one clause.
pub fn parse_clause(input: &str) -> Result<Clause> {
    parse_all(clause, input).map(|clause| anonymous_in_clause(&clause))
}

/// Parse a sequence of clauses
///
/// # Errors
///
/// Returns [`Error::Parse`] at the first malformed clause.
pub fn parse_program(input: &str) -> Result<Vec<Clause>> {
    let clauses = parse_all(many0(clause), input)?;
    Ok(clauses.iter().map(anonymous_in_clause).collect())
}

fn anonymous_in_clause(clause: &Clause) -> Clause {
    let mut counter = 0;
    let head = name_anonymous(&clause.head, &mut counter);
    let body = clause
        .body
        .iter()
        .map(|goal| name_anonymous(goal, &mut counter))
        .collect();
    Clause { head, body }
}
