//! Análisis sintáctico y generación de código.
//!
//! No existe un AST: el parser es de descenso recursivo con un solo token
//! de lookahead y emite instrucciones conforme reconoce cada producción.
//!
//! ```text
//! program     := statement*
//! statement   := declaration | assignment | if_stmt | block
//! declaration := 'int' IDENT ';'
//! assignment  := IDENT '=' expr ';'
//! if_stmt     := 'if' '(' term '==' term ')' block
//! block       := '{' statement* '}'
//! expr        := term (('+' | '-') term)*
//! term        := NUMBER | IDENT
//! ```
//!
//! El primer error, sea sintáctico o semántico, termina la traducción.

use std::rc::Rc;
use thiserror::Error;

use crate::{
    asm::{Instruction, Operand},
    emit::{Emitter, Program},
    error::Diagnostics,
    lex::{Identifier, Keyword, Token},
    source::{Located, Location},
    symbols::SymbolTable,
};

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Expected token {0}, found {1} instead")]
    UnexpectedToken(Token, Token),

    #[error("Expected identifier in {0}, found {1} instead")]
    ExpectedId(&'static str, Token),

    #[error("Expected a number or identifier, found {0} instead")]
    ExpectedTerm(Token),

    #[error("Expected any of `int`, `if`, `{{` or assignment, found {0} instead")]
    ExpectedStatement(Token),

    #[error("Blocks are nested deeper than {} levels", MAX_NESTING)]
    TooDeep,
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SemanticError {
    #[error("Symbol `{0}` is undefined")]
    Undefined(Identifier),

    #[error("Assignment to undeclared variable `{0}`")]
    UndeclaredTarget(Identifier),
}

/// Causa por la cual se abandonó la traducción.
#[derive(Debug)]
pub enum Failure {
    Syntax(Located<ParserError>),
    Semantic(Located<SemanticError>),
}

impl From<Failure> for Diagnostics {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Syntax(error) => Diagnostics::from(error).kind("Syntax error"),
            Failure::Semantic(error) => Diagnostics::from(error).kind("Semantic error"),
        }
    }
}

type Translate<T> = Result<T, Failure>;

/// Profundidad máxima de bloques anidados, incluyendo los de `if`.
pub const MAX_NESTING: usize = 256;

/// Traduce una secuencia de tokens terminada en [`Token::End`].
///
/// `start` es la ubicación que se reporta si ocurre un error antes de
/// haber observado algún token.
pub fn translate(tokens: &[Located<Token>], start: Location) -> Result<Program, Failure> {
    let mut compiler = Compiler {
        tokens,
        cursor: 0,
        depth: 0,
        last_known: start,
        symbols: SymbolTable::new(),
        emitter: Emitter::new(),
    };

    compiler.program()?;
    for variable in compiler.symbols.iter() {
        tracing::trace!(name = %variable.name, address = %variable.address, "variable");
    }

    tracing::debug!(variables = compiler.symbols.len(), "translation finished");

    Ok(compiler.emitter.finish())
}

/// Operando tal como aparece en el fuente, antes de resolverlo.
enum Term {
    Literal(Rc<str>),
    Variable(Identifier),
}

/// Estado de una compilación.
struct Compiler<'a> {
    tokens: &'a [Located<Token>],
    cursor: usize,
    depth: usize,
    last_known: Location,
    symbols: SymbolTable,
    emitter: Emitter,
}

impl<'a> Compiler<'a> {
    fn program(&mut self) -> Translate<()> {
        while !self.at_end() {
            self.statement()?;
        }

        self.emitter.emit(Instruction::Halt);
        Ok(())
    }

    fn statement(&mut self) -> Translate<()> {
        match self.lookahead() {
            Some(Token::Keyword(Keyword::Int)) => self.declaration(),
            Some(Token::Id(_)) => self.assignment(),
            Some(Token::Keyword(Keyword::If)) => self.if_statement(),
            Some(Token::OpenCurly) => self.block(),

            _ => {
                let found = self.found();
                self.syntax(ParserError::ExpectedStatement(found))
            }
        }
    }

    fn declaration(&mut self) -> Translate<()> {
        self.keyword(Keyword::Int)?;
        let name = self.id("declaration")?;

        self.symbols.declare(name.val());
        self.expect(Token::Semicolon)
    }

    fn assignment(&mut self) -> Translate<()> {
        let target = self.id("assignment")?;
        self.expect(Token::Assign)?;

        // El valor se genera antes de resolver el destino
        self.expr()?;

        let variable = match self.symbols.lookup(target.val()) {
            Some(variable) => variable.clone(),
            None => {
                let (location, name) = (target.location().clone(), target.into_inner());
                return Err(Failure::Semantic(Located::at(
                    SemanticError::UndeclaredTarget(name),
                    location,
                )));
            }
        };

        self.emitter.emit(Instruction::Store(variable));
        self.expect(Token::Semicolon)
    }

    fn if_statement(&mut self) -> Translate<()> {
        self.keyword(Keyword::If)?;
        self.expect(Token::OpenParen)?;
        let left = self.term()?;
        self.expect(Token::Equal)?;
        let right = self.term()?;
        self.expect(Token::CloseParen)?;

        let then = self.emitter.new_label();
        let end = self.emitter.new_label();
        tracing::trace!(%then, %end, "allocated labels for conditional");

        let left = self.operand(&left)?;
        self.emitter.emit(Instruction::Load(left));

        let right = self.operand(&right)?;
        self.emitter.emit(Instruction::Compare(right));

        // Iguales: `JZ` entra al bloque. Distintos: `JMP` lo salta
        self.emitter.emit(Instruction::JumpIfZero(then));
        self.emitter.emit(Instruction::Jump(end));
        self.emitter.emit(Instruction::SetLabel(then));

        self.block()?;
        self.emitter.emit(Instruction::SetLabel(end));

        Ok(())
    }

    fn block(&mut self) -> Translate<()> {
        if self.depth == MAX_NESTING {
            return self.syntax(ParserError::TooDeep);
        }

        self.expect(Token::OpenCurly)?;
        self.depth += 1;

        while !self.at_end() && !matches!(self.lookahead(), Some(Token::CloseCurly)) {
            self.statement()?;
        }

        self.depth -= 1;
        self.expect(Token::CloseCurly)
    }

    /// Deja el resultado de la expresión en el acumulador.
    fn expr(&mut self) -> Translate<()> {
        let first = self.term()?;
        let first = self.operand(&first)?;
        self.emitter.emit(Instruction::Load(first));

        loop {
            let operation: fn(Operand) -> Instruction = match self.lookahead() {
                Some(Token::Plus) => Instruction::Add,
                Some(Token::Minus) => Instruction::Sub,
                _ => break Ok(()),
            };

            self.advance();
            let term = self.term()?;
            let operand = self.operand(&term)?;

            self.emitter.emit(operation(operand));
        }
    }

    fn term(&mut self) -> Translate<Located<Term>> {
        let term = match self.lookahead() {
            Some(Token::Number(digits)) => Term::Literal(Rc::clone(digits)),
            Some(Token::Id(id)) => Term::Variable(id.clone()),

            _ => {
                let found = self.found();
                return self.syntax(ParserError::ExpectedTerm(found));
            }
        };

        let location = self.here();
        self.advance();

        Ok(Located::at(term, location))
    }

    /// Resuelve un término contra la tabla de símbolos.
    fn operand(&self, term: &Located<Term>) -> Translate<Operand> {
        match term.val() {
            Term::Literal(digits) => Ok(Operand::Immediate(Rc::clone(digits))),
            Term::Variable(name) => match self.symbols.lookup(name) {
                Some(variable) => Ok(Operand::Memory(variable.clone())),
                None => Err(Failure::Semantic(Located::at(
                    SemanticError::Undefined(name.clone()),
                    term.location().clone(),
                ))),
            },
        }
    }

    fn id(&mut self, context: &'static str) -> Translate<Located<Identifier>> {
        let id = match self.lookahead() {
            Some(Token::Id(id)) => id.clone(),
            _ => {
                let found = self.found();
                return self.syntax(ParserError::ExpectedId(context, found));
            }
        };

        let location = self.here();
        self.advance();

        Ok(Located::at(id, location))
    }

    fn keyword(&mut self, keyword: Keyword) -> Translate<()> {
        self.expect(Token::Keyword(keyword))
    }

    fn expect(&mut self, token: Token) -> Translate<()> {
        match self.lookahead() {
            Some(found) if *found == token => {
                self.advance();
                Ok(())
            }

            _ => {
                let found = self.found();
                self.syntax(ParserError::UnexpectedToken(token, found))
            }
        }
    }

    fn lookahead(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(Located::val)
    }

    fn at_end(&self) -> bool {
        matches!(self.lookahead(), None | Some(Token::End))
    }

    /// Token actual, para diagnósticos.
    fn found(&self) -> Token {
        self.lookahead().cloned().unwrap_or(Token::End)
    }

    /// Ubicación del token actual.
    fn here(&self) -> Location {
        match self.tokens.get(self.cursor) {
            Some(token) => token.location().clone(),
            None => self.last_known.clone(),
        }
    }

    /// Consume el token actual. El cursor nunca pasa de [`Token::End`].
    fn advance(&mut self) {
        if let Some(token) = self.tokens.get(self.cursor) {
            if *token.val() != Token::End {
                self.last_known = token.location().clone();
                self.cursor += 1;
            }
        }
    }

    fn syntax<T>(&self, error: ParserError) -> Translate<T> {
        Err(Failure::Syntax(Located::at(error, self.here())))
    }
}
