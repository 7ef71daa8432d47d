//! Análisis léxico.
//!
//! # Tokenization
//! Esta es la primera fase del compilador. Descompone un [`InputStream`]
//! (flujo de caracteres) en unidades léxicas denominadas tokens. Los espacios
//! en blanco se descartan durante esta operación. Cada token emitido está
//! asociado a una ubicación en el código fuente original.
//!
//! # Contenido de un token
//! Operadores, puntuación y palabras clave se identifican por lo que son y
//! no incluyen lexemas. Identificadores y literales numéricos sí conservan
//! su texto original; un literal nunca se convierte a entero, por lo que
//! `007` se emite tal cual.
//!
//! # Reglas importantes del lenguaje
//! - Las palabras clave (`int`, `if`) distinguen mayúsculas de minúsculas.
//! - Los identificadores comienzan con una letra o `_`.
//! - `==` se reconoce antes que `=`.
//!
//! # Errores
//! El lexer es total: un carácter desconocido produce [`Token::Unknown`] y
//! el parser decide si es aceptable. La única falla posible proviene de E/S.

use crate::source::{InputStream, Located, Location};
use std::{
    fmt::{self, Display},
    iter::Peekable,
    rc::Rc,
    str::FromStr,
};

use thiserror::Error;

/// Error de escaneo.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LexerError {
    /// Error de E/S originado por el [`InputStream`].
    #[error("I/O error: {0}")]
    Input(#[from] std::io::Error),
}

/// Un identificador.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(Rc<str>);

impl Identifier {
    pub fn new(name: &str) -> Self {
        Identifier(Rc::from(name))
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Identifier {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

/// Objeto resultante del análisis léxico.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Identificador.
    Id(Identifier),

    /// Palabra clave.
    Keyword(Keyword),

    /// Literal entero, con su texto exacto.
    Number(Rc<str>),

    /// `=`
    Assign,

    /// `==`
    Equal,

    /// `+`
    Plus,

    /// `-`
    Minus,

    /// `;`
    Semicolon,

    /// `(`
    OpenParen,

    /// `)`
    CloseParen,

    /// `{`
    OpenCurly,

    /// `}`
    CloseCurly,

    /// Cualquier otro carácter.
    Unknown(char),

    /// Fin de la entrada. Siempre es el último token y aparece una sola vez.
    End,
}

impl Display for Token {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        match self {
            Id(id) => write!(fmt, "identifier `{}`", id),
            Keyword(keyword) => write!(fmt, "keyword `{}`", keyword),
            Number(digits) => write!(fmt, "literal `{}`", digits),
            Assign => fmt.write_str("`=`"),
            Equal => fmt.write_str("`==`"),
            Plus => fmt.write_str("`+`"),
            Minus => fmt.write_str("`-`"),
            Semicolon => fmt.write_str("`;`"),
            OpenParen => fmt.write_str("`(`"),
            CloseParen => fmt.write_str("`)`"),
            OpenCurly => fmt.write_str("`{`"),
            CloseCurly => fmt.write_str("`}`"),
            Unknown(c) => write!(fmt, "character {:?}", c),
            End => fmt.write_str("end of input"),
        }
    }
}

/// Una palabra clave.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Int,
    If,
}

impl Display for Keyword {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            Keyword::Int => "int",
            Keyword::If => "if",
        };

        fmt.write_str(string)
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        const KEYWORDS: &[(&str, Keyword)] = &[("int", Keyword::Int), ("if", Keyword::If)];

        KEYWORDS
            .iter()
            .find(|&&(name, _)| name == string)
            .map(|&(_, keyword)| keyword)
            .ok_or(())
    }
}

/// Máquina de estados para análisis léxico.
///
/// La salida del lexer, así como su siguiente estado, se define a partir
/// de tanto su estado actual como el siguiente carácter encontrado en el
/// flujo de entrada.
pub struct Lexer<S: Iterator> {
    source: Peekable<S>,
    state: State,
    start: Location,
    next: Location,
    finished: bool,
}

/// Posibles estados del lexer.
enum State {
    /// Estado que ocurre antes de encontrar el inicio de un token.
    Start,

    /// Estado de completitud; siempre emite el token incluido y
    /// pasa a [`State::Start`].
    Complete(Token),

    /// Se encontró `=`. Si sigue otro `=` se forma `==`, de lo contrario
    /// se emite `=` sin consumir el carácter siguiente.
    Equals,

    /// Literal numérico, crece mientras sigan dígitos.
    Digits(String),

    /// Término que puede ser un identificador o una palabra clave.
    Word(String),
}

impl<S: InputStream> Lexer<S> {
    /// Crea un lexer en estado inicial a partir de un flujo.
    pub fn new(start: Location, source: S) -> Self {
        let next = start.clone();
        Lexer {
            source: source.peekable(),
            state: State::Start,
            start,
            next,
            finished: false,
        }
    }

    /// Reduce la entrada completa a una secuencia de tokens terminada
    /// en [`Token::End`], o bien al primer error encontrado.
    pub fn exhaust(self) -> Result<Vec<Located<Token>>, Located<LexerError>> {
        let tokens = self.collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = tokens.len(), "lexed input");

        Ok(tokens)
    }

    /// Intenta construir un siguiente token.
    fn lex(&mut self) -> Result<Option<(Token, Location)>, LexerError> {
        use {State::*, Token::*};

        let mut last_accepted = self.start.clone();
        let token = loop {
            let next_char = match self.source.peek() {
                None => None,
                Some(Ok((c, _))) => Some(*c),
                Some(Err(_)) => match self.source.next() {
                    Some(Err(error)) => return Err(error.into()),
                    _ => None,
                },
            };

            // La posición de origen avanza junto a la posición siguiente
            // mientras no se haya encontrado el inicio de un token
            if let Start = self.state {
                self.start = self.next.clone();
            }

            match (&mut self.state, next_char) {
                // Tokens triviales
                (Start, None) => return Ok(None),
                (Start, Some('+')) => self.state = Complete(Plus),
                (Start, Some('-')) => self.state = Complete(Minus),
                (Start, Some(';')) => self.state = Complete(Semicolon),
                (Start, Some('(')) => self.state = Complete(OpenParen),
                (Start, Some(')')) => self.state = Complete(CloseParen),
                (Start, Some('{')) => self.state = Complete(OpenCurly),
                (Start, Some('}')) => self.state = Complete(CloseCurly),
                (Start, Some('=')) => self.state = Equals,

                // Identificadores, palabras clave y literales
                (Start, Some(c)) if c.is_ascii_alphabetic() || c == '_' => {
                    self.state = Word(c.to_string())
                }
                (Start, Some(c)) if c.is_ascii_digit() => self.state = Digits(c.to_string()),

                // Espacios en blanco y caracteres desconocidos
                (Start, Some(c)) if is_space(c) => (),
                (Start, Some(c)) => self.state = Complete(Unknown(c)),

                // Emisión retardada de tokens cualesquiera
                (Complete(token), _) => break std::mem::replace(token, End),

                // `==` o `=`; en el segundo caso el lookahead no se consume
                (Equals, Some('=')) => self.state = Complete(Equal),
                (Equals, _) => break Assign,

                (Digits(digits), Some(c)) if c.is_ascii_digit() => digits.push(c),
                (Digits(digits), _) => break Number(Rc::from(std::mem::take(digits).as_str())),

                (Word(word), Some(c)) if is_word_char(c) => word.push(c),
                (Word(word), _) => {
                    break match self::Keyword::from_str(word) {
                        Ok(keyword) => Keyword(keyword),
                        Err(()) => Id(Identifier::new(word)),
                    };
                }
            }

            // Si no hubo `break`, aquí se consume el carácter que
            // se observó con lookahead anteriormente
            if let Some(Ok((_, next_position))) = self.source.next() {
                last_accepted = std::mem::replace(&mut self.next, next_position);
            }
        };

        Ok(Some((token, last_accepted)))
    }
}

impl<S: InputStream> Iterator for Lexer<S> {
    type Item = Result<Located<Token>, Located<LexerError>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.lex() {
            Ok(Some((token, last_accepted))) => {
                self.state = State::Start;

                let location = Location::span(self.start.clone(), &last_accepted);
                Some(Ok(Located::at(token, location)))
            }

            Ok(None) => {
                self.finished = true;
                Some(Ok(Located::at(Token::End, self.next.clone())))
            }

            Err(error) => {
                self.finished = true;
                Some(Err(Located::at(error, self.next.clone())))
            }
        }
    }
}

/// Determina si un carácter puede continuar un término.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Espacios en blanco, incluyendo tabulador vertical.
fn is_space(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0b'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source;

    fn tokens(code: &str) -> Vec<Token> {
        let (start, stream) = source::consume(code.as_bytes(), "test.sl");
        Lexer::new(start, stream)
            .exhaust()
            .unwrap()
            .into_iter()
            .map(Located::into_inner)
            .collect()
    }

    fn id(name: &str) -> Token {
        Token::Id(Identifier::new(name))
    }

    fn number(digits: &str) -> Token {
        Token::Number(Rc::from(digits))
    }

    #[test]
    fn declaration_and_assignment() {
        use Token::*;

        assert_eq!(
            tokens("int x;\nx = 5 + y - 007;"),
            vec![
                Keyword(self::Keyword::Int),
                id("x"),
                Semicolon,
                id("x"),
                Assign,
                number("5"),
                Plus,
                id("y"),
                Minus,
                number("007"),
                Semicolon,
                End,
            ]
        );
    }

    #[test]
    fn equality_versus_assignment() {
        use Token::*;

        assert_eq!(tokens("a==b"), vec![id("a"), Equal, id("b"), End]);
        assert_eq!(tokens("a=b"), vec![id("a"), Assign, id("b"), End]);
        assert_eq!(tokens("a = = b"), vec![id("a"), Assign, Assign, id("b"), End]);
        assert_eq!(tokens("a===b"), vec![id("a"), Equal, Assign, id("b"), End]);
        assert_eq!(tokens("x="), vec![id("x"), Assign, End]);
    }

    #[test]
    fn keywords_are_exact_text() {
        use Token::*;

        assert_eq!(
            tokens("if IF int Int integer _if"),
            vec![
                Keyword(self::Keyword::If),
                id("IF"),
                Keyword(self::Keyword::Int),
                id("Int"),
                id("integer"),
                id("_if"),
                End,
            ]
        );
    }

    #[test]
    fn maximal_munch_splits_digits_from_words() {
        assert_eq!(tokens("12ab"), vec![number("12"), id("ab"), Token::End]);
        assert_eq!(tokens("ab12"), vec![id("ab12"), Token::End]);
    }

    #[test]
    fn unknown_characters_do_not_fail() {
        use Token::*;

        assert_eq!(
            tokens("x * 2; é"),
            vec![id("x"), Unknown('*'), number("2"), Semicolon, Unknown('é'), End]
        );
    }

    #[test]
    fn invalid_bytes_become_unknown() {
        let (start, stream) = source::consume(&b"x\xff;"[..], "test.sl");
        let tokens: Vec<_> = Lexer::new(start, stream)
            .exhaust()
            .unwrap()
            .into_iter()
            .map(Located::into_inner)
            .collect();

        assert_eq!(
            tokens,
            vec![id("x"), Token::Unknown('\u{fffd}'), Token::Semicolon, Token::End]
        );
    }

    #[test]
    fn empty_input_is_only_end() {
        assert_eq!(tokens(""), vec![Token::End]);
        assert_eq!(tokens(" \t\r\n\x0b\x0c "), vec![Token::End]);
    }

    #[test]
    fn tokens_carry_locations() {
        let (start, stream) = source::consume("int x;\n  if".as_bytes(), "test.sl");
        let tokens = Lexer::new(start, stream).exhaust().unwrap();

        let x = &tokens[1];
        assert_eq!(x.location().start().line(), 1);
        assert_eq!(x.location().start().column(), 5);

        let keyword = &tokens[3];
        assert_eq!(keyword.val(), &Token::Keyword(Keyword::If));
        assert_eq!(keyword.location().start().line(), 2);
        assert_eq!(keyword.location().start().column(), 3);
        assert_eq!(keyword.location().end().column(), 5);
    }
}
