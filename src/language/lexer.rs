use crate::language::{
    errors::SyntaxError,
    span::Span,
    token::{Token, TokenKind},
};
use nom::{
    IResult, Parser,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1},
    combinator::{map_res, recognize},
    sequence::tuple,
};

/// Tokenizes a compilation unit. A character no rule accepts becomes a
/// `SyntaxError` and lexing continues past it.
pub fn lex(source: &str) -> Result<Vec<Token>, Vec<SyntaxError>> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut rest = source;
    let mut offset = 0usize;

    loop {
        let (skipped, remaining) = skip_trivia(rest);
        offset += skipped;
        rest = remaining;
        if rest.is_empty() {
            break;
        }

        match lex_token(rest) {
            Ok((remaining, kind)) => {
                let consumed = rest.len() - remaining.len();
                tokens.push(Token {
                    kind,
                    span: Span::new(offset, offset + consumed),
                });
                offset += consumed;
                rest = remaining;
            }
            Err(_) => {
                let ch = rest.chars().next().unwrap_or('\u{fffd}');
                let len = ch.len_utf8().min(rest.len()).max(1);
                errors.push(SyntaxError::new(
                    format!("Unexpected character `{ch}`"),
                    Span::new(offset, offset + len),
                ));
                offset += len;
                rest = &rest[len..];
            }
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

fn skip_trivia(input: &str) -> (usize, &str) {
    let mut rest = input;
    loop {
        let trimmed = rest.trim_start();
        if trimmed.starts_with("//") {
            rest = match trimmed.find('\n') {
                Some(pos) => &trimmed[pos..],
                None => &trimmed[trimmed.len()..],
            };
        } else {
            rest = trimmed;
            break;
        }
    }
    (input.len() - rest.len(), rest)
}

fn lex_token(input: &str) -> IResult<&str, TokenKind> {
    lex_double(input)
        .or_else(|_| lex_int(input))
        .or_else(|_| lex_word(input))
        .or_else(|_| lex_symbol(input))
}

fn lex_double(input: &str) -> IResult<&str, TokenKind> {
    map_res(
        recognize(tuple((digit1, char('.'), digit1))),
        |text: &str| text.parse::<f64>().map(TokenKind::Double),
    )
    .parse(input)
}

fn lex_int(input: &str) -> IResult<&str, TokenKind> {
    map_res(recognize(digit1), |text: &str| {
        text.parse::<i64>().map(TokenKind::Int)
    })
    .parse(input)
}

fn lex_word(input: &str) -> IResult<&str, TokenKind> {
    let (input, word) = recognize(tuple((
        take_while1(|ch: char| ch.is_ascii_alphabetic() || ch == '_'),
        take_while(|ch: char| ch.is_ascii_alphanumeric() || ch == '_'),
    )))
    .parse(input)?;

    let kind = match word {
        "print" => TokenKind::Print,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        _ => TokenKind::Identifier(word.to_string()),
    };
    Ok((input, kind))
}

fn lex_symbol(input: &str) -> IResult<&str, TokenKind> {
    // Two-character operators first so `==` never lexes as two `=`.
    for (text, kind) in [
        ("==", TokenKind::EqEq),
        ("!=", TokenKind::BangEq),
        ("<=", TokenKind::LtEq),
        (">=", TokenKind::GtEq),
        ("&&", TokenKind::AmpersandAmpersand),
        ("||", TokenKind::PipePipe),
        ("=", TokenKind::Eq),
        ("!", TokenKind::Bang),
        ("<", TokenKind::Lt),
        (">", TokenKind::Gt),
        ("+", TokenKind::Plus),
        ("-", TokenKind::Minus),
        ("*", TokenKind::Star),
        ("/", TokenKind::Slash),
        (";", TokenKind::Semi),
        ("(", TokenKind::LParen),
        (")", TokenKind::RParen),
        ("{", TokenKind::LBrace),
        ("}", TokenKind::RBrace),
    ] {
        if let Ok((rest, _)) = tag::<_, _, nom::error::Error<&str>>(text)(input) {
            return Ok((rest, kind));
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Tag,
    )))
}
