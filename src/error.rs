use std::num::ParseIntError;

use miette::{miette, LabeledSpan, Report, Severity};

use crate::span::Span;

// Translation errors. Each one aborts the whole translate call.

pub(crate) fn missing_label(line: usize, offs: usize, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "translate::missing_label",
        help = "every statement starts with a label, like `f0 lin 20 6`.",
        labels = vec![LabeledSpan::at_offset(offs, "statement without a label")],
        "Missing label at line {line}",
    )
    .with_source_code(src.to_string())
}

pub(crate) fn duplicate_label(
    label: &str,
    first_line: usize,
    line: usize,
    span: Span,
    src: &str,
) -> Report {
    miette!(
        severity = Severity::Error,
        code = "translate::duplicate_label",
        help = "labels name their own line, so each may appear only once.",
        labels = vec![LabeledSpan::at(span, "duplicate label")],
        "Duplicate label '{label}' at lines {first_line} and {line}",
    )
    .with_source_code(src.to_string())
}

pub(crate) fn missing_opcode(label: &str, line: usize, span: Span, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "translate::missing_opcode",
        help = "a label must be followed by an operation and its operands.",
        labels = vec![LabeledSpan::at(span, "label without an operation")],
        "Statement '{label}' at line {line} has no operation",
    )
    .with_source_code(src.to_string())
}

pub(crate) fn unknown_opcode(opcode: &str, label: &str, span: Span, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "translate::unknown_opcode",
        help = "available operations are add, sub, mul, div, out, lin and bnz.",
        labels = vec![LabeledSpan::at(span, "unknown operation")],
        "Unknown operation '{opcode}' at label '{label}'",
    )
    .with_source_code(src.to_string())
}

pub(crate) fn wrong_arity(
    opcode: &str,
    label: &str,
    want: usize,
    found: usize,
    span: Span,
    src: &str,
) -> Report {
    miette!(
        severity = Severity::Error,
        code = "translate::wrong_arity",
        help = "check the operands for this operation.",
        labels = vec![LabeledSpan::at(span, "wrong operand count")],
        "Operation '{opcode}' at label '{label}' takes {want} operands, found {found}",
    )
    .with_source_code(src.to_string())
}

pub(crate) fn invalid_operand(
    token: &str,
    opcode: &str,
    label: &str,
    span: Span,
    src: &str,
    e: ParseIntError,
) -> Report {
    miette!(
        severity = Severity::Error,
        code = "translate::invalid_operand",
        help = "registers and values are written as base-10 integers.",
        labels = vec![LabeledSpan::at(span, "invalid operand")],
        "Invalid operand '{token}' for '{opcode}' at label '{label}': {e}",
    )
    .with_source_code(src.to_string())
}

// Runtime errors. Soft faults go straight to the diagnostic sink; only the
// hard ones surface as reports.

pub(crate) fn division_by_zero(label: &str, lhs: i64, rhs: i64) -> Report {
    miette!(
        severity = Severity::Error,
        code = "run::division_by_zero",
        help = "the divisor register held 0 when this statement executed.",
        "Division by zero at '{label}': register {lhs} / register {rhs}",
    )
}
