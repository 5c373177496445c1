use sat::*;

#[test]
fn parse_with_comments_and_split_clauses() -> Result<(), ParseError> {
    let formula: Formula = "c a small example\n\
                            c with two comment lines\n\
                            p cnf 3 2\n\
                            1 -3 0\n\
                            2 3\n\
                            -1 0\n"
        .parse()?;
    assert_eq!(formula.variables, 3);
    assert_eq!(formula.literals(), 6);
    assert_eq!(formula.clauses, vec![
        vec![Literal::new(0, false), Literal::new(2, true)],
        vec![Literal::new(1, false), Literal::new(2, false), Literal::new(0, true)],
    ]);
    Ok(())
}

#[test]
fn percent_marker_ends_body() -> Result<(), ParseError> {
    let formula: Formula = "p cnf 2 1\n1 2 0\n%\n0\n".parse()?;
    assert_eq!(formula.clauses.len(), 1);
    Ok(())
}

#[test]
fn missing_header() {
    assert_eq!("1 2 0\n".parse::<Formula>(), Err(ParseError::MissingHeader));
    assert_eq!("".parse::<Formula>(), Err(ParseError::MissingHeader));
}

#[test]
fn malformed_header() {
    assert!(matches!("p dnf 2 1\n1 0\n".parse::<Formula>(), Err(ParseError::Header(_))));
}

#[test]
fn variable_out_of_range() {
    assert_eq!(
        "p cnf 2 1\n1 -3 0\n".parse::<Formula>(),
        Err(ParseError::VariableOutOfRange { var: 3, variables: 2 })
    );
}

#[test]
fn clause_count_mismatch() {
    assert_eq!(
        "p cnf 2 2\n1 2 0\n".parse::<Formula>(),
        Err(ParseError::ClauseCount { expected: 2, found: 1 })
    );
}

#[test]
fn unterminated_clause() {
    assert_eq!("p cnf 2 1\n1 2\n".parse::<Formula>(), Err(ParseError::Unterminated));
}
