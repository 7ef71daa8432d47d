//! Rastreo de ubicaciones en el código fuente.
//!
//! La entrada se lee completa como bytes, sin dividirla en líneas. Los bytes
//! que no forman UTF-8 válido se sustituyen por `U+FFFD`, el cual el lexer
//! trata como cualquier otro carácter desconocido. El texto leído se conserva
//! para que los diagnósticos puedan citar la línea donde ocurrió un error.

use std::{
    fmt::{self, Debug, Display, Formatter},
    io::{self, Read},
    ops::Range,
    rc::Rc,
};

/// Ancho de los divisores de tabulador.
const TAB_STOP: u32 = 4;

/// Un flujo de entrada, carácter por carácter.
///
/// Cada carácter viene acompañado de la ubicación del carácter que le sigue.
pub trait InputStream: Iterator<Item = Result<(char, Location), io::Error>> {}

impl<I> InputStream for I where I: Iterator<Item = Result<(char, Location), io::Error>> {}

/// Un valor cualquiera junto a la ubicación de donde proviene.
#[derive(Debug, Clone)]
pub struct Located<T> {
    location: Location,
    value: T,
}

impl<T> Located<T> {
    pub fn at(value: T, location: Location) -> Self {
        Located { value, location }
    }

    pub fn val(&self) -> &T {
        &self.value
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> AsRef<T> for Located<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

/// Texto completo de un origen, con su nombre.
struct Source {
    name: String,
    text: String,
}

/// Rango de posiciones dentro de un origen. El fin es exclusivo.
#[derive(Clone)]
pub struct Location {
    from: Rc<Source>,
    position: Range<Position>,
}

impl Location {
    fn point(from: &Rc<Source>, at: Position) -> Self {
        Location {
            from: Rc::clone(from),
            position: at..at.advance(),
        }
    }

    /// Une dos ubicaciones del mismo origen.
    pub fn span(from: Location, to: &Location) -> Self {
        Location {
            from: from.from,
            position: from.position.start..to.position.end,
        }
    }

    pub fn start(&self) -> Position {
        self.position.start
    }

    pub fn end(&self) -> Position {
        self.position.end
    }

    /// Invoca a `f` con el texto de la línea `line` (base 1), sin el
    /// terminador. Una línea inexistente se presenta vacía.
    pub fn with_line<F, R>(&self, line: u32, f: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        let text = (line as usize)
            .checked_sub(1)
            .and_then(|index| self.from.text.split('\n').nth(index))
            .map(|text| text.strip_suffix('\r').unwrap_or(text))
            .unwrap_or("");

        f(text)
    }
}

impl Display for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let Range { start, end } = self.position;

        if end == start.advance() {
            write!(formatter, "{}:{}", self.from.name, start)
        } else {
            write!(formatter, "{}:[{}-{}]", self.from.name, start, end.back())
        }
    }
}

impl Debug for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        <Self as Display>::fmt(self, formatter)
    }
}

/// Una posición línea-columna, ambas con base 1.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Position {
    line: u32,
    column: u32,
}

impl Position {
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn advance(self) -> Position {
        Position {
            column: self.column + 1,
            ..self
        }
    }

    pub fn back(self) -> Position {
        Position {
            column: self.column.saturating_sub(1).max(1),
            ..self
        }
    }

    /// Posición que sigue a un carácter `c` ubicado aquí.
    fn after(self, c: char) -> Position {
        match c {
            '\n' => Position {
                line: self.line + 1,
                column: 1,
            },

            '\t' => Position {
                column: 1 + ((self.column - 1) / TAB_STOP + 1) * TAB_STOP,
                ..self
            },

            _ => self.advance(),
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl Display for Position {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.line, self.column)
    }
}

/// Lee la entrada completa y la transforma en un flujo por carácter.
///
/// La ubicación que se retorna es la del primer carácter. Si la lectura
/// falla, el flujo emite lo que se alcanzó a leer seguido del error.
pub fn consume<R, S>(mut reader: R, name: S) -> (Location, impl InputStream)
where
    R: Read,
    S: Into<String>,
{
    let mut bytes = Vec::new();
    let failure = reader.read_to_end(&mut bytes).err();

    let source = Rc::new(Source {
        name: name.into(),
        text: String::from_utf8_lossy(&bytes).into_owned(),
    });

    let mut here = Position::default();
    let mut stream: Vec<_> = source
        .text
        .chars()
        .map(|c| {
            here = here.after(c);
            Ok((c, Location::point(&source, here)))
        })
        .collect();

    stream.extend(failure.map(Err));
    tracing::trace!(bytes = bytes.len(), "read {}", source.name);

    (Location::point(&source, Position::default()), stream.into_iter())
}
