use crate::scanner::{
    CommentScanner, LiteralScanner, MacroScanner, NumberScanner, OperatorScanner,
    WhitespaceScanner, WordScanner,
};
use crate::util::{Code, Log};
use crate::{IScanner, RefactorError, Token, TokenKind, Tokenizer};
use once_cell::unsync::OnceCell;
use std::rc::Rc;

impl Tokenizer {
    pub fn new(scanners: Vec<Rc<dyn IScanner>>) -> Self {
        Self {
            scanners,
            debug: OnceCell::new(),
        }
    }

    /// Set a log label to debug tokenization.
    pub fn set_log(&self, log_label: Log<&'static str>) -> Result<(), String> {
        self.debug
            .set(log_label)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    /// Tokenize the code into a stream that covers the input exactly.
    ///
    /// Tokenization is total: a byte no scanner claims becomes a one-byte
    /// [TokenKind::Unknown] token. The only reportable failure is memory
    /// exhaustion while the stream grows.
    pub fn tokenize(&self, code: &Code) -> Result<Vec<Token>, RefactorError> {
        let mut stream: Vec<Token> = Vec::new();
        let mut pointer: usize = 0;
        let eof_pointer: usize = code.len();

        #[cfg(debug_assertions)]
        let debug = self.debug.get().map_or(Log::None, |label| *label);

        while pointer < eof_pointer {
            let token = match self
                .scanners
                .iter()
                .find_map(|scanner| scanner.consume(code, pointer, &stream))
            {
                Some(token) => token,
                None => Token::new(TokenKind::Unknown, pointer, pointer + 1),
            };
            debug_assert_eq!(pointer, token.start);
            debug_assert!(token.end > token.start, "a scanner produced an empty token");

            #[cfg(debug_assertions)]
            if debug.order() >= Log::Verbose(()).order() {
                println!(
                    "[{}; Token]: {:?} at {}",
                    debug,
                    token.kind,
                    code.obtain_position(token.start)
                );
            }

            pointer = token.end;
            stream.push(token);
        }

        #[cfg(debug_assertions)]
        if debug.order() >= Log::Success(()).order() {
            println!("[{}; Tokenization success: {} tokens]", debug, stream.len());
        }

        Ok(stream)
    }
}

/// The standard C tokenizer: one scanner per lexical family, ordered so comments
/// win over division, words win over nothing, and operators match longest-first.
pub fn c_tokenizer() -> Tokenizer {
    let whitespace = Rc::new(WhitespaceScanner::new());
    let comment = Rc::new(CommentScanner::new());
    let macro_line = Rc::new(MacroScanner::new());
    let literal = Rc::new(LiteralScanner::new());
    let number = Rc::new(NumberScanner::new().unwrap());

    let word = Rc::new(
        WordScanner::new(vec![
            ("struct", TokenKind::Struct),
            ("union", TokenKind::Union),
            ("enum", TokenKind::Enum),
            ("static", TokenKind::Static),
            ("inline", TokenKind::Inline),
            ("extern", TokenKind::Extern),
            ("const", TokenKind::Const),
            ("volatile", TokenKind::Volatile),
            ("auto", TokenKind::Auto),
            ("register", TokenKind::Register),
            ("if", TokenKind::If),
            ("while", TokenKind::While),
            ("for", TokenKind::For),
            ("switch", TokenKind::Switch),
            ("return", TokenKind::Return),
            ("_Static_assert", TokenKind::StaticAssert),
            ("static_assert", TokenKind::StaticAssert),
            ("void", TokenKind::Void),
            ("char", TokenKind::Char),
            ("int", TokenKind::Int),
            ("short", TokenKind::Short),
            ("long", TokenKind::Long),
            ("float", TokenKind::Float),
            ("double", TokenKind::Double),
            ("signed", TokenKind::Signed),
            ("unsigned", TokenKind::Unsigned),
            ("_Bool", TokenKind::Bool),
            ("bool", TokenKind::Bool),
        ])
        .unwrap(),
    );

    let operator = Rc::new(
        OperatorScanner::new(vec![
            ("{", TokenKind::LBrace),
            ("}", TokenKind::RBrace),
            ("(", TokenKind::LParen),
            (")", TokenKind::RParen),
            ("[", TokenKind::LBracket),
            ("]", TokenKind::RBracket),
            (";", TokenKind::Semicolon),
            (",", TokenKind::Comma),
            (":", TokenKind::Colon),
            ("?", TokenKind::Question),
            ("#", TokenKind::Hash),
            ("=", TokenKind::Assign),
            ("==", TokenKind::Eq),
            ("!=", TokenKind::Ne),
            ("->", TokenKind::Arrow),
            (".", TokenKind::Dot),
            ("...", TokenKind::Ellipsis),
            ("*", TokenKind::Star),
            ("&", TokenKind::Amp),
            ("+", TokenKind::Plus),
            ("-", TokenKind::Minus),
            ("/", TokenKind::Slash),
            ("%", TokenKind::Percent),
            ("!", TokenKind::Not),
            ("~", TokenKind::Tilde),
            ("^", TokenKind::Caret),
            ("|", TokenKind::Pipe),
            ("<", TokenKind::Lt),
            (">", TokenKind::Gt),
            ("<=", TokenKind::Le),
            (">=", TokenKind::Ge),
            ("<<", TokenKind::Shl),
            (">>", TokenKind::Shr),
            ("&&", TokenKind::AmpAmp),
            ("||", TokenKind::PipePipe),
            ("++", TokenKind::PlusPlus),
            ("--", TokenKind::MinusMinus),
            ("+=", TokenKind::PlusAssign),
            ("-=", TokenKind::MinusAssign),
            ("*=", TokenKind::StarAssign),
            ("/=", TokenKind::SlashAssign),
            ("%=", TokenKind::PercentAssign),
            ("&=", TokenKind::AmpAssign),
            ("|=", TokenKind::PipeAssign),
            ("^=", TokenKind::CaretAssign),
            ("<<=", TokenKind::ShlAssign),
            (">>=", TokenKind::ShrAssign),
        ])
        .unwrap(),
    );

    Tokenizer::new(vec![
        whitespace, comment, macro_line, literal, number, word, operator,
    ])
}
