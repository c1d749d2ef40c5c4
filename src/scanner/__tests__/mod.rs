use crate::util::Code;
use crate::{c_tokenizer, Token, TokenKind};

fn concat(code: &Code, tokens: &[Token]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for token in tokens {
        bytes.extend_from_slice(code.text_of(token));
    }
    bytes
}

#[test]
fn declaration_tokens() {
    let tokenizer = c_tokenizer();
    let code = Code::from("int x = 10;");
    let stream = tokenizer.tokenize(&code).unwrap();
    assert_eq!(
        stream,
        vec![
            Token::new(TokenKind::Int, 0, 3),
            Token::new(TokenKind::Whitespace, 3, 4),
            Token::new(TokenKind::Identifier, 4, 5),
            Token::new(TokenKind::Whitespace, 5, 6),
            Token::new(TokenKind::Assign, 6, 7),
            Token::new(TokenKind::Whitespace, 7, 8),
            Token::new(TokenKind::Number, 8, 10),
            Token::new(TokenKind::Semicolon, 10, 11),
        ]
    );
}

#[test]
fn compound_operators_match_longest() {
    let tokenizer = c_tokenizer();
    let code = Code::from("x <<= 2;");
    let stream = tokenizer.tokenize(&code).unwrap();
    assert_eq!(
        stream,
        vec![
            Token::new(TokenKind::Identifier, 0, 1),
            Token::new(TokenKind::Whitespace, 1, 2),
            Token::new(TokenKind::ShlAssign, 2, 5),
            Token::new(TokenKind::Whitespace, 5, 6),
            Token::new(TokenKind::Number, 6, 7),
            Token::new(TokenKind::Semicolon, 7, 8),
        ]
    );

    let arrow = tokenizer.tokenize(&Code::from("p->next")).unwrap();
    assert_eq!(
        arrow,
        vec![
            Token::new(TokenKind::Identifier, 0, 1),
            Token::new(TokenKind::Arrow, 1, 3),
            Token::new(TokenKind::Identifier, 3, 7),
        ]
    );

    let ellipsis = tokenizer.tokenize(&Code::from("f(a, ...)")).unwrap();
    assert_eq!(
        ellipsis,
        vec![
            Token::new(TokenKind::Identifier, 0, 1),
            Token::new(TokenKind::LParen, 1, 2),
            Token::new(TokenKind::Identifier, 2, 3),
            Token::new(TokenKind::Comma, 3, 4),
            Token::new(TokenKind::Whitespace, 4, 5),
            Token::new(TokenKind::Ellipsis, 5, 8),
            Token::new(TokenKind::RParen, 8, 9),
        ]
    );
}

#[test]
fn comment_tokens() {
    let tokenizer = c_tokenizer();

    let block = tokenizer.tokenize(&Code::from("a/*c*/b")).unwrap();
    assert_eq!(
        block,
        vec![
            Token::new(TokenKind::Identifier, 0, 1),
            Token::new(TokenKind::Comment, 1, 6),
            Token::new(TokenKind::Identifier, 6, 7),
        ]
    );

    // A line comment does not own its newline; the newline opens the next
    // whitespace token.
    let line = tokenizer.tokenize(&Code::from("// hi\nz")).unwrap();
    assert_eq!(
        line,
        vec![
            Token::new(TokenKind::Comment, 0, 5),
            Token::new(TokenKind::Whitespace, 5, 6),
            Token::new(TokenKind::Identifier, 6, 7),
        ]
    );

    // Unterminated comments are legal and span the rest of the input.
    let open = tokenizer.tokenize(&Code::from("/* open")).unwrap();
    assert_eq!(open, vec![Token::new(TokenKind::Comment, 0, 7)]);
}

#[test]
fn macro_tokens() {
    let tokenizer = c_tokenizer();

    let include = tokenizer
        .tokenize(&Code::from("#include <stdio.h>\nint x;"))
        .unwrap();
    assert_eq!(include[0], Token::new(TokenKind::Macro, 0, 18));
    assert_eq!(include[1], Token::new(TokenKind::Whitespace, 18, 19));
    assert_eq!(include[2], Token::new(TokenKind::Int, 19, 22));

    // Backslash-newline continuation keeps the next line inside the macro.
    let define = tokenizer
        .tokenize(&Code::from("#define X \\\n  1\nint y;"))
        .unwrap();
    assert_eq!(define[0], Token::new(TokenKind::Macro, 0, 15));
    assert_eq!(define[1], Token::new(TokenKind::Whitespace, 15, 16));
    assert_eq!(define[2], Token::new(TokenKind::Int, 16, 19));

    // A hash that is not at the start of a logical line is punctuation.
    let hash = tokenizer.tokenize(&Code::from("a # 1")).unwrap();
    assert_eq!(hash[2], Token::new(TokenKind::Hash, 2, 3));
}

#[test]
fn literal_tokens() {
    let tokenizer = c_tokenizer();

    let escaped_char = tokenizer.tokenize(&Code::from(r"'\n'")).unwrap();
    assert_eq!(escaped_char, vec![Token::new(TokenKind::CharLiteral, 0, 4)]);

    let escaped_string = tokenizer.tokenize(&Code::from(r#""a\"b""#)).unwrap();
    assert_eq!(
        escaped_string,
        vec![Token::new(TokenKind::StringLiteral, 0, 6)]
    );

    let unterminated = tokenizer.tokenize(&Code::from("\"abc")).unwrap();
    assert_eq!(
        unterminated,
        vec![Token::new(TokenKind::StringLiteral, 0, 4)]
    );
}

#[test]
fn keyword_classification() {
    let tokenizer = c_tokenizer();
    let code = Code::from("static inline char *f(void)");
    let stream = tokenizer.tokenize(&code).unwrap();
    let kinds: Vec<TokenKind> = stream.iter().map(|token| token.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Static,
            TokenKind::Whitespace,
            TokenKind::Inline,
            TokenKind::Whitespace,
            TokenKind::Char,
            TokenKind::Whitespace,
            TokenKind::Star,
            TokenKind::Identifier,
            TokenKind::LParen,
            TokenKind::Void,
            TokenKind::RParen,
        ]
    );

    // A keyword wins only on an exact spelling match.
    let words = tokenizer.tokenize(&Code::from("bool _Bool intx returnx")).unwrap();
    let kinds: Vec<TokenKind> = words
        .iter()
        .filter(|token| token.kind != TokenKind::Whitespace)
        .map(|token| token.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Bool,
            TokenKind::Bool,
            TokenKind::Identifier,
            TokenKind::Identifier,
        ]
    );
}

#[test]
fn number_literal_forms() {
    let tokenizer = c_tokenizer();
    let code = Code::from("0x1F 0b101 12.5e-3f .5 10UL 077");
    let stream = tokenizer.tokenize(&code).unwrap();
    let numbers: Vec<Token> = stream
        .iter()
        .copied()
        .filter(|token| token.kind != TokenKind::Whitespace)
        .collect();
    assert_eq!(
        numbers,
        vec![
            Token::new(TokenKind::Number, 0, 4),
            Token::new(TokenKind::Number, 5, 10),
            Token::new(TokenKind::Number, 11, 19),
            Token::new(TokenKind::Number, 20, 22),
            Token::new(TokenKind::Number, 23, 27),
            Token::new(TokenKind::Number, 28, 31),
        ]
    );
}

#[test]
fn tokens_cover_the_input_exactly() {
    let tokenizer = c_tokenizer();
    let inputs = [
        "int main(void) { return 0; }",
        "/* unterminated",
        "\"broken str",
        "#define A(x) \\\n  (x+1)\nint a;",
        "a @ $ b",
        "char *s = \"x\\\"y\";",
        "",
        "   \t\n  ",
    ];

    for input in inputs {
        let code = Code::from(input);
        let stream = tokenizer.tokenize(&code).unwrap();
        assert_eq!(
            concat(&code, &stream),
            input.as_bytes(),
            "token concatenation must reproduce {:?}",
            input
        );
        let mut cursor = 0;
        for token in &stream {
            assert_eq!(token.start, cursor, "gap before token in {:?}", input);
            assert!(token.end > token.start);
            cursor = token.end;
        }
        assert_eq!(cursor, input.len());
    }
}

#[test]
fn stray_bytes_become_unknown_tokens() {
    let tokenizer = c_tokenizer();
    let stream = tokenizer.tokenize(&Code::from("a@b")).unwrap();
    assert_eq!(
        stream,
        vec![
            Token::new(TokenKind::Identifier, 0, 1),
            Token::new(TokenKind::Unknown, 1, 2),
            Token::new(TokenKind::Identifier, 2, 3),
        ]
    );
}
