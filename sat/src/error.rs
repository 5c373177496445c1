use thiserror::Error;

/// Errors from reading a DIMACS CNF file.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing `p cnf` header")]
    MissingHeader,
    #[error("malformed header `{0}`")]
    Header(String),
    #[error("`{0}` is not a literal")]
    Literal(String),
    #[error("variable {var} exceeds the declared {variables} variables")]
    VariableOutOfRange { var: usize, variables: usize },
    #[error("expected {expected} clauses but found {found}")]
    ClauseCount { expected: usize, found: usize },
    #[error("last clause is missing its terminating 0")]
    Unterminated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("variable {0} is already assigned")]
    Assigned(usize),
    #[error("variable {var} is not in a formula of {variables} variables")]
    OutOfRange { var: usize, variables: usize },
    #[error("the formula is already decided")]
    Finished,
}
