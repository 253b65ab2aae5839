//! Error taxonomy for the tela interpreter.
//!
//! Every variant except [`ScriptError::SurfaceUnavailable`] is recoverable:
//! the execution loop turns it into an `Erro: …` line and moves on.  The
//! messages are the ones users of the dialect see on the surface.

use thiserror::Error;

/// Failure raised while processing a script.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    /// The rendering surface could not be acquired.  Fatal; raised before
    /// any line is processed.
    #[error("Canvas não encontrado ou contexto inválido: {0}")]
    SurfaceUnavailable(String),

    #[error("Comando desconhecido: {0}")]
    UnknownCommand(String),

    #[error("Comando 'set' inválido: {0}")]
    InvalidSetSyntax(String),

    #[error("Objeto malformado em: {0}")]
    MalformedObjectLiteral(String),

    #[error("Par chave-valor inválido em: {0}")]
    InvalidKeyValuePair(String),

    #[error("Valor inválido no comando: {0}")]
    InvalidValue(String),

    #[error("Sintaxe inválida em 'display': {0}")]
    InvalidDisplaySyntax(String),

    /// `expr` is the display argument as written; `reason` is the evaluator's
    /// diagnostic (logged, not rendered).
    #[error("Erro ao avaliar expressão: {expr}")]
    ExpressionEvaluation { expr: String, reason: EvalError },
}

impl ScriptError {
    /// `true` when the error aborts the whole invocation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScriptError::SurfaceUnavailable(_))
    }

    /// Short stable name of the error kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ScriptError::SurfaceUnavailable(_) => "SurfaceUnavailable",
            ScriptError::UnknownCommand(_) => "UnknownCommand",
            ScriptError::InvalidSetSyntax(_) => "InvalidSetSyntax",
            ScriptError::MalformedObjectLiteral(_) => "MalformedObjectLiteral",
            ScriptError::InvalidKeyValuePair(_) => "InvalidKeyValuePair",
            ScriptError::InvalidValue(_) => "InvalidValue",
            ScriptError::InvalidDisplaySyntax(_) => "InvalidDisplaySyntax",
            ScriptError::ExpressionEvaluation { .. } => "ExpressionEvaluationError",
        }
    }
}

/// Failure inside the restricted expression evaluator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected {0}")]
    UnexpectedToken(String),

    #[error("expected {expected}, found {found}")]
    Expected { expected: &'static str, found: String },

    #[error("operator '{op}' cannot be applied to {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("operator '{op}' cannot be applied to {operand}")]
    UnaryTypeMismatch { op: &'static str, operand: &'static str },

    #[error("{0} has no field '{1}'")]
    NoSuchField(&'static str, String),

    #[error("expression nests too deeply")]
    TooDeep,
}
