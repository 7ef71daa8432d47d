//! Emisión de código.
//!
//! El emisor acumula líneas de salida en orden y nunca las revisa ni las
//! reordena. Las etiquetas se numeran con un contador que solo crece.

use std::{
    fmt::Display,
    io::{self, Write},
};

use crate::asm::Label;

#[derive(Debug, Default)]
pub struct Emitter {
    lines: Vec<String>,
    next_label: u32,
}

impl Emitter {
    pub fn new() -> Self {
        Emitter::default()
    }

    /// Agrega una línea al final de la salida.
    pub fn emit(&mut self, line: impl Display) {
        self.lines.push(line.to_string());
    }

    /// Genera una etiqueta que no ha sido entregada antes.
    pub fn new_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;

        label
    }

    pub fn finish(self) -> Program {
        tracing::debug!(lines = self.lines.len(), labels = self.next_label, "emission finished");
        Program { lines: self.lines }
    }
}

/// Un programa ensamblador completo, listo para escribirse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    lines: Vec<String>,
}

impl Program {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Cantidad de líneas emitidas, incluyendo `HLT`.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Escribe una línea por instrucción o etiqueta, cada una terminada en `'\n'`.
    pub fn write<W: Write>(&self, output: &mut W) -> io::Result<()> {
        for line in &self.lines {
            writeln!(output, "{}", line)?;
        }

        output.flush()
    }
}
