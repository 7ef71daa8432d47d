//! Vocabulario del ensamblador objetivo.
//!
//! La máquina objetivo tiene un único acumulador `A`. Todas las cargas,
//! operaciones aritméticas, comparaciones y almacenamientos pasan por él.
//! Cada [`Instruction`] se despliega como exactamente una línea de salida.

use std::{
    fmt::{self, Display},
    rc::Rc,
};

use crate::symbols::Variable;

/// Etiqueta generada, se despliega como `L<n>`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Label(pub u32);

impl Display for Label {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "L{}", self.0)
    }
}

/// Un término ya resuelto contra la tabla de símbolos.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    /// Literal entero, con su texto tal como apareció en el fuente.
    Immediate(Rc<str>),

    /// Contenido de la dirección de una variable.
    Memory(Variable),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Load(Operand),
    Add(Operand),
    Sub(Operand),
    Store(Variable),
    Compare(Operand),
    JumpIfZero(Label),
    Jump(Label),
    SetLabel(Label),
    Halt,
}

impl Display for Instruction {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use {Instruction::*, Operand::*};

        // Los anchos de columna son parte del formato de salida
        match self {
            Load(Immediate(digits)) => write!(fmt, "    MOV A, #{}        ; load immediate", digits),
            Load(Memory(var)) => write!(fmt, "    LOAD A, [{}]    ; load {}", var.address, var.name),

            Add(Immediate(digits)) => write!(fmt, "    ADD A, #{}        ; add immediate", digits),
            Add(Memory(var)) => write!(fmt, "    ADD A, [{}]     ; add {}", var.address, var.name),

            Sub(Immediate(digits)) => write!(fmt, "    SUB A, #{}        ; sub immediate", digits),
            Sub(Memory(var)) => write!(fmt, "    SUB A, [{}]     ; sub {}", var.address, var.name),

            Store(var) => write!(fmt, "    STORE A, [{}]   ; {} = A", var.address, var.name),

            Compare(Immediate(digits)) => {
                write!(fmt, "    CMP A, #{}          ; compare with {}", digits, digits)
            }
            Compare(Memory(var)) => {
                write!(fmt, "    CMP A, [{}]       ; compare with {}", var.address, var.name)
            }

            JumpIfZero(label) => write!(fmt, "    JZ {}", label),
            Jump(label) => write!(fmt, "    JMP {}", label),
            SetLabel(label) => write!(fmt, "{}:", label),
            Halt => fmt.write_str("    HLT"),
        }
    }
}
