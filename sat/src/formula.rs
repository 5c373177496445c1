use std::str::FromStr;

use crate::{Literal, ParseError};

/// A formula in conjunctive normal form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Formula {
    pub variables: usize,
    pub clauses: Vec<Vec<Literal>>,
}

impl Formula {
    /// Size of the action space, one action per literal.
    pub fn literals(&self) -> usize {
        2 * self.variables
    }
}

impl FromStr for Formula {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut header = None;
        let mut clauses = Vec::new();
        let mut clause = Vec::new();

        for line in s.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('c') {
                continue;
            }
            // Some benchmark sets end the body with a `%` line.
            if line.starts_with('%') {
                break;
            }
            if line.starts_with('p') {
                let words: Vec<_> = line.split_whitespace().collect();
                let (variables, count) = match words.as_slice() {
                    ["p", "cnf", v, c] => (
                        v.parse::<usize>().map_err(|_| ParseError::Header(line.to_string()))?,
                        c.parse::<usize>().map_err(|_| ParseError::Header(line.to_string()))?,
                    ),
                    _ => return Err(ParseError::Header(line.to_string())),
                };
                header = Some((variables, count));
                continue;
            }

            let (variables, _) = header.ok_or(ParseError::MissingHeader)?;
            for word in line.split_whitespace() {
                if word == "0" {
                    clauses.push(std::mem::take(&mut clause));
                    continue;
                }
                let literal: Literal = word.parse()?;
                if literal.var() >= variables {
                    return Err(ParseError::VariableOutOfRange {
                        var: literal.var() + 1,
                        variables,
                    });
                }
                clause.push(literal);
            }
        }

        let (variables, expected) = header.ok_or(ParseError::MissingHeader)?;
        if !clause.is_empty() {
            return Err(ParseError::Unterminated);
        }
        if clauses.len() != expected {
            return Err(ParseError::ClauseCount {
                expected,
                found: clauses.len(),
            });
        }
        Ok(Formula { variables, clauses })
    }
}
