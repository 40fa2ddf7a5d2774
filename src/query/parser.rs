//! Recursive-descent parser: WHERE clause -> `Query` (`Or(And(Cond...))`).

use super::ast::{AndGroup, Condition, Key, Literal, Op, Query};
use super::lexer::{tokenize, Keyword, Token};
use crate::error::ValidationError;

pub fn parse(query_string: &str) -> Result<Query, ValidationError> {
    let trimmed = query_string.trim();
    let lower = trimmed.to_lowercase();
    if !lower.starts_with("where") {
        return Err(ValidationError::MalformedQuery(
            "query must start with 'WHERE'".to_string(),
        ));
    }
    let rest = trimmed[5..].trim();
    if rest.is_empty() {
        return Err(ValidationError::MalformedQuery(
            "no conditions provided in query".to_string(),
        ));
    }

    let tokens = tokenize(rest).map_err(ValidationError::MalformedQuery)?;
    let or_segments = split_top_level(&tokens, Keyword::Or);
    let mut groups = Vec::with_capacity(or_segments.len());
    for segment in or_segments {
        let and_segments = split_top_level(segment, Keyword::And);
        let mut group: AndGroup = Vec::with_capacity(and_segments.len());
        for cond_tokens in and_segments {
            group.push(parse_condition(cond_tokens)?);
        }
        groups.push(group);
    }
    Ok(Query { groups })
}

/// Splits `tokens` on unquoted occurrences of `kw` that sit at paren depth
/// zero (so an `IN (a, b)` list is never split on its own commas/keywords).
fn split_top_level(tokens: &[Token], kw: Keyword) -> Vec<&[Token]> {
    let mut segments = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, tok) in tokens.iter().enumerate() {
        match tok {
            Token::LParen => depth += 1,
            Token::RParen => depth -= 1,
            Token::Keyword(k) if *k == kw && depth == 0 => {
                segments.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&tokens[start..]);
    segments
}

fn parse_condition(tokens: &[Token]) -> Result<Condition, ValidationError> {
    let (key_text, rest) = match tokens.first() {
        Some(Token::Word { text, .. }) => (text.clone(), &tokens[1..]),
        _ => {
            return Err(ValidationError::MalformedQuery(
                "expected an attribute name at the start of a condition".to_string(),
            ))
        }
    };
    let key = Key::parse(&key_text);

    match rest.first() {
        Some(Token::Keyword(Keyword::In)) => {
            let list = parse_in_list(&rest[1..])?;
            Ok(Condition { key, op: Op::In, value: Literal::List(list) })
        }
        Some(Token::Keyword(Keyword::Contains)) => {
            let literal = join_words(&rest[1..])?;
            Ok(Condition { key, op: Op::Contains, value: Literal::Single(literal) })
        }
        Some(Token::Keyword(Keyword::Regex)) => {
            let pattern = join_words(&rest[1..])?;
            regex::Regex::new(&pattern)
                .map_err(|e| ValidationError::InvalidRegex(e.to_string()))?;
            Ok(Condition { key, op: Op::Regex, value: Literal::Single(pattern) })
        }
        Some(Token::Op(cmp)) => {
            let literal = join_words(&rest[1..])?;
            Ok(Condition { key, op: cmp.clone().into(), value: Literal::Single(literal) })
        }
        _ => Err(ValidationError::MalformedQuery(format!(
            "invalid condition for key '{key_text}': expected =, !=, >, <, >=, <=, IN, CONTAINS, or REGEX"
        ))),
    }
}

fn parse_in_list(tokens: &[Token]) -> Result<Vec<String>, ValidationError> {
    let Some(Token::LParen) = tokens.first() else {
        return Err(ValidationError::MalformedQuery(
            "IN condition must use parentheses, e.g., (value1, value2)".to_string(),
        ));
    };
    let Some(Token::RParen) = tokens.last() else {
        return Err(ValidationError::MalformedQuery(
            "IN condition must use parentheses, e.g., (value1, value2)".to_string(),
        ));
    };
    let inner = &tokens[1..tokens.len() - 1];
    let mut values = Vec::new();
    let mut current = Vec::new();
    for tok in inner {
        match tok {
            Token::Comma => {
                values.push(join_words(&current)?);
                current.clear();
            }
            other => current.push(other.clone()),
        }
    }
    if !current.is_empty() {
        values.push(join_words(&current)?);
    }
    if values.is_empty() {
        return Err(ValidationError::MalformedQuery(
            "IN condition must have at least one value".to_string(),
        ));
    }
    Ok(values)
}

/// Reconstructs a literal from the remaining tokens in a condition,
/// joining multiple words with a single space (the literal may legitimately
/// contain spaces, e.g. `name = New York`).
fn join_words(tokens: &[Token]) -> Result<String, ValidationError> {
    if tokens.is_empty() {
        return Err(ValidationError::MalformedQuery(
            "expected a literal value".to_string(),
        ));
    }
    let mut parts = Vec::with_capacity(tokens.len());
    for tok in tokens {
        match tok {
            Token::Word { text, .. } => parts.push(text.clone()),
            _ => {
                return Err(ValidationError::MalformedQuery(
                    "unexpected token in literal value".to_string(),
                ))
            }
        }
    }
    Ok(parts.join(" "))
}
