//! Compilador de SL para una máquina de acumulador de 8 bits.
//!
//! # Front end
//! Cada programa deriva de un único archivo de código fuente. Este archivo
//! se lee completo y se somete a análisis léxico en [`lex`], de lo cual se
//! obtiene una secuencia de tokens terminada en [`lex::Token::End`].
//!
//! # Traducción
//! No hay AST ni representación intermedia. El parser de [`parse`] recorre
//! los tokens una sola vez, de izquierda a derecha y con un token de
//! lookahead, y emite instrucciones de [`asm`] mediante [`emit`] conforme
//! reconoce la gramática. Las variables se ubican en memoria a través de
//! [`symbols`].
//!
//! # Errores
//! El primer error léxico, sintáctico o semántico detiene la compilación y
//! se reporta como [`error::Diagnostics`]. Nunca se produce un programa
//! parcial.

pub mod asm;
pub mod emit;
pub mod error;
pub mod lex;
pub mod parse;
pub mod source;
pub mod symbols;

use std::io::Read;

use crate::{emit::Program, error::Diagnostics, lex::Lexer};

/// Compila un flujo completo de código fuente.
///
/// `name` identifica al origen en los diagnósticos.
pub fn compile<R: Read>(reader: R, name: &str) -> Result<Program, Diagnostics> {
    let (start, stream) = source::consume(reader, name);

    let tokens = Lexer::new(start.clone(), stream)
        .exhaust()
        .map_err(|error| Diagnostics::from(error).kind("Lexical error"))?;

    let program = parse::translate(&tokens, start)?;
    tracing::debug!(source = name, lines = program.len(), "compiled");

    Ok(program)
}
