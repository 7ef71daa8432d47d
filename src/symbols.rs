//! Tabla de símbolos.
//!
//! El lenguaje no tiene ámbitos: toda variable declarada, sin importar el
//! bloque donde aparezca, vive en una única tabla global durante toda la
//! compilación. Cada variable recibe una dirección de memoria fija a partir
//! de [`BASE_ADDRESS`], en orden de primera declaración.

use std::fmt::{self, Display};

use crate::lex::Identifier;

/// Dirección de la primera variable declarada.
pub const BASE_ADDRESS: u32 = 0x10;

/// Dirección de memoria de una variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Address(pub u32);

impl Display for Address {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{:02X}", self.0)
    }
}

/// Una variable con su dirección asignada.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub name: Identifier,
    pub address: Address,
}

#[derive(Debug)]
pub struct SymbolTable {
    variables: Vec<Variable>,
    next_address: u32,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            variables: Vec::new(),
            next_address: BASE_ADDRESS,
        }
    }

    /// Busca una variable por nombre.
    pub fn lookup(&self, name: &Identifier) -> Option<&Variable> {
        self.variables.iter().find(|variable| variable.name == *name)
    }

    /// Declara una variable, asignándole la siguiente dirección libre.
    ///
    /// Declarar dos veces el mismo nombre no es un error: la segunda
    /// declaración retorna la variable ya existente con su dirección original.
    pub fn declare(&mut self, name: &Identifier) -> &Variable {
        match self.variables.iter().position(|variable| variable.name == *name) {
            Some(index) => &self.variables[index],

            None => {
                let address = Address(self.next_address);
                self.next_address += 1;

                tracing::trace!(%name, %address, "allocated variable");
                self.variables.push(Variable {
                    name: name.clone(),
                    address,
                });

                &self.variables[self.variables.len() - 1]
            }
        }
    }

    /// Variables en orden de declaración.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_start_at_base_and_increase() {
        let mut table = SymbolTable::new();
        let names: Vec<_> = ["a", "b", "c"].iter().map(|n| Identifier::new(n)).collect();

        for name in &names {
            table.declare(name);
        }

        let addresses: Vec<_> = table.iter().map(|v| v.address).collect();
        assert_eq!(
            addresses,
            vec![Address(BASE_ADDRESS), Address(BASE_ADDRESS + 1), Address(BASE_ADDRESS + 2)]
        );
    }

    #[test]
    fn redeclaration_keeps_address() {
        let mut table = SymbolTable::new();
        let x = Identifier::new("x");
        let y = Identifier::new("y");

        let first = table.declare(&x).address;
        table.declare(&y);
        let second = table.declare(&x).address;

        assert_eq!(first, second);
        assert_eq!(table.len(), 2);
        assert_eq!(table.declare(&Identifier::new("z")).address, Address(BASE_ADDRESS + 2));
    }

    #[test]
    fn lookup_does_not_declare() {
        let table = SymbolTable::new();
        assert!(table.lookup(&Identifier::new("ghost")).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn addresses_render_as_uppercase_hex() {
        assert_eq!(Address(0x10).to_string(), "10");
        assert_eq!(Address(0x1a).to_string(), "1A");
        assert_eq!(Address(0x5).to_string(), "05");
        assert_eq!(Address(0x100).to_string(), "100");
    }
}
