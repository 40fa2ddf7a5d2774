//! Tokenizer for the WHERE-clause mini-language.
//!
//! `spec.md` §9 flags the reference implementation's textual splitting on
//! ` AND `/` OR `/etc. as a known bug (a key or literal containing one of
//! those substrings splits incorrectly) and explicitly invites a proper
//! lexer instead — this is that lexer. Keywords are only recognized as
//! distinct, unquoted word tokens, never as substrings.

#[derive(Debug, Clone, PartialEq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Keyword {
    And,
    Or,
    In,
    Contains,
    Regex,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A bare or quoted word. `quoted` words are never matched against
    /// keywords, so a literal value of `"AND"` can never be mistaken for
    /// the logical operator.
    Word { text: String, quoted: bool },
    Op(CmpOp),
    Keyword(Keyword),
    LParen,
    RParen,
    Comma,
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Op(CmpOp::Ne));
                i += 2;
            }
            '>' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Op(CmpOp::Ge));
                i += 2;
            }
            '<' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Op(CmpOp::Le));
                i += 2;
            }
            '=' => {
                tokens.push(Token::Op(CmpOp::Eq));
                i += 1;
            }
            '>' => {
                tokens.push(Token::Op(CmpOp::Gt));
                i += 1;
            }
            '<' => {
                tokens.push(Token::Op(CmpOp::Lt));
                i += 1;
            }
            '"' => {
                let mut text = String::new();
                i += 1;
                let mut closed = false;
                while i < chars.len() {
                    if chars[i] == '"' {
                        closed = true;
                        i += 1;
                        break;
                    }
                    text.push(chars[i]);
                    i += 1;
                }
                if !closed {
                    return Err("unterminated quoted literal".to_string());
                }
                tokens.push(Token::Word { text, quoted: true });
            }
            _ => {
                let start = i;
                while i < chars.len()
                    && !chars[i].is_whitespace()
                    && !matches!(chars[i], '(' | ')' | ',' | '=' | '!' | '>' | '<' | '"')
                {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(word_or_keyword(text));
            }
        }
    }
    Ok(tokens)
}

fn word_or_keyword(text: String) -> Token {
    match text.to_uppercase().as_str() {
        "AND" => Token::Keyword(Keyword::And),
        "OR" => Token::Keyword(Keyword::Or),
        "IN" => Token::Keyword(Keyword::In),
        "CONTAINS" => Token::Keyword(Keyword::Contains),
        "REGEX" => Token::Keyword(Keyword::Regex),
        _ => Token::Word { text, quoted: false },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_comparison() {
        let tokens = tokenize("age >= 28").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word { text: "age".into(), quoted: false },
                Token::Op(CmpOp::Ge),
                Token::Word { text: "28".into(), quoted: false },
            ]
        );
    }

    #[test]
    fn quoted_literal_is_never_a_keyword() {
        let tokens = tokenize(r#"name = "AND""#).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word { text: "name".into(), quoted: false },
                Token::Op(CmpOp::Eq),
                Token::Word { text: "AND".into(), quoted: true },
            ]
        );
    }

    #[test]
    fn recognizes_in_and_parens() {
        let tokens = tokenize("age IN (25, 30)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word { text: "age".into(), quoted: false },
                Token::Keyword(Keyword::In),
                Token::LParen,
                Token::Word { text: "25".into(), quoted: false },
                Token::Comma,
                Token::Word { text: "30".into(), quoted: false },
                Token::RParen,
            ]
        );
    }
}
