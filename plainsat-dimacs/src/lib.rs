//! DIMACS CNF reader and writer for the plainsat SAT solver.
//!
//! The reader is deliberately lax and line oriented: lines starting with `c`, `%` or `0` and
//! blank lines are skipped, the first remaining line is taken to be the header and is discarded
//! without validation, and every further line is a clause whose last whitespace-separated token
//! (conventionally `0`) is discarded.

use std::{borrow::Borrow, io, mem::replace};

use plainsat_formula::{CnfFormula, Lit, Var};

use anyhow::Error;
use thiserror::Error;

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {}: clause token '{}' is not an integer", line, token)]
    InvalidToken { line: usize, token: String },
    #[error("line {}: literal 0 inside a clause", line)]
    ZeroLiteral { line: usize },
    #[error("line {}: literal magnitude {} is too large", line, magnitude)]
    LiteralTooLarge { line: usize, magnitude: usize },
    #[error("line {}: clause is empty", line)]
    EmptyClause { line: usize },
}

/// Parser for DIMACS CNF files.
///
/// The input can be consumed line by line using [`parse_line`](DimacsParser::parse_line), or all
/// at once using [`parse`](DimacsParser::parse).
#[derive(Default)]
pub struct DimacsParser {
    formula: CnfFormula,
    partial_clause: Vec<Lit>,
    line_number: usize,
    clause_count: usize,
    header_seen: bool,
}

impl DimacsParser {
    /// Create a new DIMACS CNF parser.
    pub fn new() -> DimacsParser {
        DimacsParser::default()
    }

    /// Parse the given input into a single [`CnfFormula`].
    pub fn parse(input: impl io::Read) -> Result<CnfFormula, Error> {
        use io::BufRead;

        let mut parser = DimacsParser::new();

        for line in io::BufReader::new(input).lines() {
            parser.parse_line(&line?)?;
        }

        Ok(parser.take_formula())
    }

    /// Parse a single line of input.
    pub fn parse_line(&mut self, line: &str) -> Result<(), ParserError> {
        self.line_number += 1;

        if line.is_empty() || line.starts_with('c') || line.starts_with('%') || line.starts_with('0')
        {
            return Ok(());
        }

        if !self.header_seen {
            // The first surviving line is the header. Its contents are not validated, the
            // variable and clause counts are recovered from the clauses themselves.
            self.header_seen = true;
            return Ok(());
        }

        let mut tokens: Vec<&str> = line.split_whitespace().collect();
        // The trailing terminator token is discarded without being looked at.
        tokens.pop();

        if tokens.is_empty() {
            return Err(ParserError::EmptyClause {
                line: self.line_number,
            });
        }

        self.partial_clause.clear();

        for token in tokens {
            let number: isize = token.parse().map_err(|_| ParserError::InvalidToken {
                line: self.line_number,
                token: token.to_owned(),
            })?;

            if number == 0 {
                return Err(ParserError::ZeroLiteral {
                    line: self.line_number,
                });
            }

            let magnitude = number.unsigned_abs();
            if magnitude > Var::max_count() {
                return Err(ParserError::LiteralTooLarge {
                    line: self.line_number,
                    magnitude,
                });
            }

            self.partial_clause.push(Lit::from_dimacs(number));
        }

        self.formula.add_clause(&self.partial_clause);
        self.clause_count += 1;

        Ok(())
    }

    /// Returns the formula parsed so far, resetting the parser's formula buffer.
    pub fn take_formula(&mut self) -> CnfFormula {
        let mut new_formula = CnfFormula::new();
        new_formula.set_var_count(self.formula.var_count());
        replace(&mut self.formula, new_formula)
    }

    /// Number of clauses parsed.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Number of variables in the parsed formula.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }
}

/// Write a formula as DIMACS CNF.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    let mut number_buf = itoa::Buffer::new();

    writeln!(target, "p cnf {} {}", formula.var_count(), formula.len())?;

    for clause in formula.iter() {
        for lit in clause.iter() {
            target.write_all(number_buf.format(lit.to_dimacs()).as_bytes())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a satisfying assignment as `v` lines, five literals per line.
///
/// Every line is prefixed with `v` and terminated with ` 0`; the final line may hold fewer than
/// five literals. An empty model produces no output.
pub fn write_model(
    target: &mut impl io::Write,
    model: impl IntoIterator<Item = impl Borrow<Lit>>,
) -> io::Result<()> {
    let mut number_buf = itoa::Buffer::new();
    let mut on_line = 0;

    for lit in model.into_iter() {
        if on_line == 0 {
            target.write_all(b"v")?;
        }
        target.write_all(b" ")?;
        target.write_all(number_buf.format(lit.borrow().to_dimacs()).as_bytes())?;
        on_line += 1;
        if on_line == 5 {
            target.write_all(b" 0\n")?;
            on_line = 0;
        }
    }

    if on_line != 0 {
        target.write_all(b" 0\n")?;
    }

    Ok(())
}
