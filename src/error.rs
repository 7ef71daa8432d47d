//! Reporte de errores.
//!
//! La compilación se detiene en el primer error, así que un
//! [`Diagnostics`] describe a lo sumo uno: su tipo, el mensaje y un
//! extracto del código fuente que lo señala.

use crate::source::{Located, Location};
use std::{
    error::Error,
    fmt::{self, Display},
};

mod sealed {
    pub trait Sealed {}
}

pub trait LocatedError: sealed::Sealed {
    fn source(&self) -> &dyn Error;
    fn location(&self) -> &Location;
}

pub struct Diagnostics {
    kind: &'static str,
    error: Option<Box<dyn 'static + LocatedError>>,
}

impl Diagnostics {
    pub fn kind(self, kind: &'static str) -> Self {
        Diagnostics { kind, ..self }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics {
            kind: "error",
            error: None,
        }
    }
}

impl<E: 'static + LocatedError> From<E> for Diagnostics {
    fn from(error: E) -> Self {
        Diagnostics {
            error: Some(Box::new(error)),
            ..Default::default()
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error = self
            .error
            .as_ref()
            .map(|error| format!("{} at {}", error.source(), error.location()));

        fmt.debug_struct("Diagnostics")
            .field("kind", &self.kind)
            .field("error", &error)
            .finish()
    }
}

impl Display for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error = match &self.error {
            Some(error) => error,
            None => return writeln!(fmt, "No errors were reported"),
        };

        writeln!(fmt, "{}: {}", self.kind, error.source())?;
        writeln!(fmt, " --> {}", error.location())?;
        excerpt(fmt, error.location())?;

        writeln!(fmt)?;
        writeln!(fmt, "Build failed with 1 error")
    }
}

/// Cita las líneas de `location` y subraya sus columnas con `^`.
fn excerpt(fmt: &mut fmt::Formatter<'_>, location: &Location) -> fmt::Result {
    let (start, end) = (location.start(), location.end());
    let gutter = end.line().to_string().len();

    writeln!(fmt, "{:gutter$} |", "", gutter = gutter)?;
    for number in start.line()..=end.line() {
        location.with_line(number, |line| {
            writeln!(fmt, "{:>gutter$} | {}", number, line, gutter = gutter)
        })?;
    }

    // `end` es exclusivo; un rango vacío todavía subraya una columna
    let last = end.back().column().max(start.column());
    let padding = (start.column() - 1) as usize;
    let carets = "^".repeat((last - start.column() + 1) as usize);

    writeln!(
        fmt,
        "{:gutter$} | {:padding$}{}",
        "",
        "",
        carets,
        gutter = gutter,
        padding = padding
    )
}

impl<E: Error> sealed::Sealed for Located<E> {}

impl<E: Error> LocatedError for Located<E> {
    fn source(&self) -> &dyn Error {
        self.as_ref()
    }

    fn location(&self) -> &Location {
        Located::location(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lex::Lexer, source};
    use thiserror::Error;

    #[derive(Error, Debug)]
    #[error("Something is off")]
    struct Oops;

    #[test]
    fn excerpt_highlights_the_token() {
        let (start, stream) = source::consume("int x;\nx = bogus;\n".as_bytes(), "demo.sl");
        let tokens = Lexer::new(start, stream).exhaust().unwrap();

        let bogus = tokens[5].location().clone();
        let rendered = Diagnostics::from(Located::at(Oops, bogus))
            .kind("Semantic error")
            .to_string();

        assert_eq!(
            rendered,
            "Semantic error: Something is off\n \
             --> demo.sl:[2:5-2:9]\n  \
             |\n\
             2 | x = bogus;\n  \
             |     ^^^^^\n\
             \n\
             Build failed with 1 error\n"
        );
    }

    #[test]
    fn end_of_input_points_past_the_text() {
        let (start, stream) = source::consume("int x".as_bytes(), "demo.sl");
        let tokens = Lexer::new(start, stream).exhaust().unwrap();

        let end = tokens.last().unwrap().location().clone();
        let rendered = Diagnostics::from(Located::at(Oops, end)).to_string();

        assert!(rendered.starts_with("error: Something is off\n --> demo.sl:1:6\n"), "{}", rendered);
        assert!(rendered.contains("1 | int x\n  |      ^\n"), "{}", rendered);
    }

    #[test]
    fn empty_diagnostics() {
        assert_eq!(Diagnostics::default().to_string(), "No errors were reported\n");
    }
}
