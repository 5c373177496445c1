use std::{fmt::Display, ops::Not, str::FromStr};

use crate::ParseError;

/// Zero-based variable index.
pub type Var = usize;

/// A variable together with its polarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    var: Var,
    negated: bool,
}

impl Literal {
    pub fn new(var: Var, negated: bool) -> Self {
        Literal { var, negated }
    }

    pub fn var(self) -> Var {
        self.var
    }

    pub fn is_negated(self) -> bool {
        self.negated
    }

    /// The value the variable needs for this literal to be true.
    pub fn value(self) -> bool {
        !self.negated
    }

    /// Index of this literal in an action space of `2 * variables`.
    pub fn action(self) -> usize {
        self.var * 2 + self.negated as usize
    }

    pub fn from_action(action: usize) -> Self {
        Literal {
            var: action / 2,
            negated: action % 2 == 1,
        }
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Literal {
            negated: !self.negated,
            ..self
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            write!(f, "-{}", self.var + 1)
        } else {
            write!(f, "{}", self.var + 1)
        }
    }
}

/// Parses the signed one-based DIMACS form. `0` is a clause terminator, not a literal.
impl FromStr for Literal {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let signed: i64 = s.parse().map_err(|_| ParseError::Literal(s.to_string()))?;
        if signed == 0 {
            return Err(ParseError::Literal(s.to_string()));
        }
        Ok(Literal {
            var: (signed.unsigned_abs() - 1) as Var,
            negated: signed < 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Literal;

    #[test]
    fn action_layout() {
        assert_eq!(Literal::new(0, false).action(), 0);
        assert_eq!(Literal::new(0, true).action(), 1);
        assert_eq!(Literal::new(3, true).action(), 7);
        assert_eq!(Literal::from_action(7), Literal::new(3, true));
        assert_eq!(!Literal::new(2, false), Literal::new(2, true));
    }

    #[test]
    fn dimacs_form() {
        assert_eq!("-4".parse::<Literal>(), Ok(Literal::new(3, true)));
        assert_eq!("1".parse::<Literal>(), Ok(Literal::new(0, false)));
        assert!("0".parse::<Literal>().is_err());
        assert!("x".parse::<Literal>().is_err());
        assert_eq!(Literal::new(3, true).to_string(), "-4");
    }
}
