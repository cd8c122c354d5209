// Copyright (c) 2016-2021 Fabian Schuiki

//! Utilities to implement diagnostics and error reporting facilities.

use crate::source::Span;
use std::fmt;

/// Emits diagnostic messages.
pub trait DiagEmitter {
    /// Emit a diagnostic message.
    fn emit(&self, diag: DiagBuilder2);
}

impl<'a, T> DiagEmitter for &'a T
where
    T: DiagEmitter + ?Sized,
{
    fn emit(&self, diag: DiagBuilder2) {
        (*self).emit(diag)
    }
}

/// Used to emit structured error messages.
#[must_use]
#[derive(Clone, Debug)]
pub struct DiagBuilder2 {
    pub severity: Severity,
    pub code: Option<DiagCode>,
    pub message: String,
    pub segments: Vec<DiagSegment>,
}

#[derive(Clone, Debug)]
pub enum DiagSegment {
    Span(Span),
    Note(String),
}

impl DiagBuilder2 {
    pub fn new<S: Into<String>>(severity: Severity, message: S) -> DiagBuilder2 {
        DiagBuilder2 {
            severity,
            code: None,
            message: message.into(),
            segments: Vec::new(),
        }
    }

    pub fn bug<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Bug, message)
    }

    pub fn fatal<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Fatal, message)
    }

    pub fn error<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Error, message)
    }

    pub fn warning<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Warning, message)
    }

    pub fn note<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Note, message)
    }

    /// Tag the diagnostic with a code from the fixed taxonomy.
    pub fn code(self, code: DiagCode) -> DiagBuilder2 {
        DiagBuilder2 {
            code: Some(code),
            ..self
        }
    }

    pub fn segment(self, segment: DiagSegment) -> DiagBuilder2 {
        let mut segments = self.segments;
        segments.push(segment);
        DiagBuilder2 { segments, ..self }
    }

    pub fn span<S: Into<Span>>(self, span: S) -> DiagBuilder2 {
        self.segment(DiagSegment::Span(span.into()))
    }

    pub fn add_note<S: Into<String>>(self, message: S) -> DiagBuilder2 {
        self.segment(DiagSegment::Note(message.into()))
    }

    pub fn get_severity(&self) -> Severity {
        self.severity
    }

    pub fn get_code(&self) -> Option<DiagCode> {
        self.code
    }

    pub fn get_message(&self) -> &String {
        &self.message
    }

    pub fn get_segments(&self) -> &[DiagSegment] {
        &self.segments
    }

    /// Return the first span attached to the diagnostic, if any.
    pub fn get_span(&self) -> Option<Span> {
        self.segments.iter().find_map(|s| match *s {
            DiagSegment::Span(sp) => Some(sp),
            _ => None,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Severity {
    Note,
    Warning,
    Error,
    Fatal,
    Bug,
}

impl Severity {
    pub fn to_str(self) -> &'static str {
        match self {
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Bug => "compiler bug",
        }
    }

    /// Check whether this severity prevents a usable result.
    pub fn is_error(self) -> bool {
        self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// The fixed taxonomy of diagnostics raised while binding and evaluating
/// selections and member accesses.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[allow(missing_docs)]
pub enum DiagCode {
    // Selection binding.
    BadIndexExpression,
    CannotIndexScalar,
    IndexValueInvalid,
    BadRangeExpression,
    RangeWidthTooLarge,
    SelectEndianMismatch,
    SelectEndianDynamic,
    RangeSelectAssociative,
    SelectOfVectoredNet,
    DynamicNotProcedural,

    // General expression binding.
    ExprMustBeIntegral,
    ValueMustBePositive,
    ValueMustNotBeUnknown,
    ExpressionNotConstant,
    UnboundedNotAllowed,
    UndeclaredIdentifier,
    NotAValue,
    BadConversion,
    BadBinaryExpression,

    // Member access binding.
    InvalidMemberAccess,
    UnknownMember,
    InvalidClassAccess,
    ClassMemberInAssertion,
    LocalMemberAccess,
    ProtectedMemberAccess,
    ExpressionNotCallable,
    UnexpectedWithClause,
    WithClauseNotAllowed,
    TooManyArguments,
    TooFewArguments,

    // Assignability.
    ExpressionNotAssignable,
    UserDefPartialDriver,
    NetProceduralAssign,
    MultipleContinuousDrivers,

    // Constant evaluation.
    ConstEvalNonConstVariable,
    ConstEvalNonConstant,
    ConstEvalArrayIndexInvalid,
    ConstEvalPartSelectInvalid,
    ConstEvalAssociativeElementNotFound,
    ConstEvalAssociativeIndexInvalid,
    ConstEvalStringIndexInvalid,
    ConstEvalDynamicArrayIndex,
    ConstEvalDynamicArrayRange,
    ConstEvalQueueRange,
    ConstEvalTaggedUnion,
    ConstEvalEmptyQueue,
}

impl fmt::Display for DiagBuilder2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.get_severity(), self.get_message())?;
        if let Some(code) = self.code {
            write!(f, " [{:?}]", code)?;
        }
        writeln!(f)?;
        for segment in &self.segments {
            match *segment {
                DiagSegment::Span(sp) => writeln!(f, "  --> {}", sp)?,
                DiagSegment::Note(ref message) => writeln!(f, "   = note: {}", message)?,
            }
        }
        if self.get_severity() == Severity::Bug {
            writeln!(f, "\nYou have encountered a compiler bug. Sorry about that!")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;

    #[test]
    fn builder_collects_segments() {
        let d = DiagBuilder2::error("index `9` out of bounds")
            .code(DiagCode::IndexValueInvalid)
            .span(Span::new(Source(1), 3, 4))
            .add_note("declared here");
        assert_eq!(d.get_severity(), Severity::Error);
        assert_eq!(d.get_code(), Some(DiagCode::IndexValueInvalid));
        assert_eq!(d.get_segments().len(), 2);
        assert_eq!(d.get_span(), Some(Span::new(Source(1), 3, 4)));
        let text = format!("{}", d);
        assert!(text.starts_with("error: index `9` out of bounds [IndexValueInvalid]"));
        assert!(text.contains("note: declared here"));
    }

    #[test]
    fn severity_order() {
        assert!(Severity::Error.is_error());
        assert!(Severity::Fatal.is_error());
        assert!(!Severity::Warning.is_error());
        assert!(Severity::Warning < Severity::Error);
    }
}
