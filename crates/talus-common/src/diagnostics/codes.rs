//! The diagnostic code catalog.
//!
//! Unlike the teacher's auto-generated, thousands-of-entries TypeScript
//! message table, this catalog only needs the handful of codes this
//! checker actually emits (§4.2, §7, §8). Each entry is a stable small
//! integer, a category, and a `{0}`/`{1}`-style message template consumed
//! by `format_message`.

use super::DiagnosticCategory;

pub const DUPLICATE_CONST: u32 = 1001;
pub const DUPLICATE_FN: u32 = 1002;
pub const DUPLICATE_IMPORT: u32 = 1003;
pub const IMPORT_SHADOWS_CONSTANT: u32 = 1004;
pub const IMPORT_SYMBOL_NOT_FOUND: u32 = 1005;

pub const UNUSED_MUTABLE_VARIABLE: u32 = 1101;
pub const UNUSED_VARIABLE: u32 = 1102;

pub const UNKNOWN_TYPE: u32 = 1201;
pub const TYPE_CANNOT_REFERENCE_ITSELF: u32 = 1202;
pub const CIRCULAR_ALIAS: u32 = 1203;

pub const INTERFACE_METHOD_MISMATCH: u32 = 1301;
pub const INTERFACE_FIELD_MISMATCH: u32 = 1302;
pub const INTERFACE_FIELD_MUTABILITY_MISMATCH: u32 = 1303;
pub const AMBIGUOUS_EMBED_MEMBER: u32 = 1304;
pub const NO_SUCH_FIELD_OR_METHOD: u32 = 1305;

pub const AMBIGUOUS_GENERIC_INFERENCE: u32 = 1401;
pub const UNBOUND_GENERIC_PARAMETER: u32 = 1402;

pub const IMMUTABLE_MUTATION: u32 = 1501;
pub const CONST_MUTATION: u32 = 1502;
pub const SHARED_REQUIRES_LOCK: u32 = 1503;
pub const NESTED_LOCK: u32 = 1504;
pub const DUPLICATE_LOCK: u32 = 1505;
pub const LOCK_AND_RLOCK_SAME_NAME: u32 = 1506;

pub const ARGUMENT_COUNT_MISMATCH: u32 = 1601;
pub const ARGUMENT_TYPE_MISMATCH: u32 = 1602;
pub const UNKNOWN_IDENTIFIER: u32 = 1603;
pub const NOT_CALLABLE: u32 = 1604;
pub const UNSAFE_CALL_OUTSIDE_UNSAFE_BLOCK: u32 = 1605;
pub const DEPRECATED_USE: u32 = 1606;
pub const OR_BLOCK_TYPE_MISMATCH: u32 = 1607;

pub const TOO_DEEPLY_NESTED_EXPRESSION: u32 = 1701;
pub const TOO_DEEPLY_NESTED_STATEMENT: u32 = 1702;
pub const MESSAGE_LIMIT_EXCEEDED: u32 = 1703;

pub const BRANCH_NOT_EXHAUSTIVE: u32 = 1801;
pub const CAST_NOT_ALLOWED: u32 = 1802;
pub const INDEX_TYPE_MISMATCH: u32 = 1803;
pub const MAIN_FUNCTION_MISSING: u32 = 1804;
pub const AMBIGUOUS_BOOLEAN_PRECEDENCE: u32 = 1805;

pub const SHIFT_REQUIRES_INTEGRAL: u32 = 1901;
pub const LEFT_SHIFT_OF_SIGNED: u32 = 1902;
pub const SHIFT_COUNT_OVERFLOW: u32 = 1903;
pub const POINTER_ARITHMETIC_REQUIRES_UNSAFE: u32 = 1904;
pub const POINTER_INDEX_OUTSIDE_UNSAFE: u32 = 1905;
pub const SIGNED_UNSIGNED_MISMATCH: u32 = 1906;

/// One entry in the catalog: a stable code, its default severity, and a
/// `{0}`-style message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

macro_rules! catalog {
    ($( $code:expr => $category:expr, $msg:expr ),+ $(,)?) => {
        pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
            $( DiagnosticMessage { code: $code, category: $category, message: $msg } ),+
        ];
    };
}

catalog! {
    DUPLICATE_CONST => DiagnosticCategory::Error, "duplicate const \"{0}\"",
    DUPLICATE_FN => DiagnosticCategory::Error, "duplicate function \"{0}\"",
    DUPLICATE_IMPORT => DiagnosticCategory::Error, "duplicate import of \"{0}\"",
    IMPORT_SHADOWS_CONSTANT => DiagnosticCategory::Error, "import \"{0}\" shadows an existing constant",
    IMPORT_SYMBOL_NOT_FOUND => DiagnosticCategory::Error, "module \"{0}\" has no symbol \"{1}\"",

    UNUSED_MUTABLE_VARIABLE => DiagnosticCategory::Warning, "{0} is declared as mutable but never changed",
    UNUSED_VARIABLE => DiagnosticCategory::Warning, "{0} is declared but never used",

    UNKNOWN_TYPE => DiagnosticCategory::Error, "unknown type {0}",
    TYPE_CANNOT_REFERENCE_ITSELF => DiagnosticCategory::Error, "type {0} cannot reference itself",
    CIRCULAR_ALIAS => DiagnosticCategory::Error, "circular alias declaration for {0}",

    INTERFACE_METHOD_MISMATCH => DiagnosticCategory::Error,
        "{0} incorrectly implements method {1} of {2}: expected return type {3}",
    INTERFACE_FIELD_MISMATCH => DiagnosticCategory::Error,
        "{0} incorrectly implements {1}: field {2} has the wrong type",
    INTERFACE_FIELD_MUTABILITY_MISMATCH => DiagnosticCategory::Error,
        "{0} incorrectly implements {1}: field {2} must be mutable",
    AMBIGUOUS_EMBED_MEMBER => DiagnosticCategory::Error,
        "ambiguous reference to {0}: present in more than one embedded type",
    NO_SUCH_FIELD_OR_METHOD => DiagnosticCategory::Error, "type {0} has no field or method {1}",

    AMBIGUOUS_GENERIC_INFERENCE => DiagnosticCategory::Error,
        "inferred generic type {0} is ambiguous",
    UNBOUND_GENERIC_PARAMETER => DiagnosticCategory::Error,
        "could not infer type parameter {0}",

    IMMUTABLE_MUTATION => DiagnosticCategory::Error, "{0} is immutable",
    CONST_MUTATION => DiagnosticCategory::Error, "{0} is a constant and cannot be assigned to",
    SHARED_REQUIRES_LOCK => DiagnosticCategory::Error,
        "{0} is shared and must be lock-ed to be mutated",
    NESTED_LOCK => DiagnosticCategory::Error, "lock blocks cannot be nested",
    DUPLICATE_LOCK => DiagnosticCategory::Error, "{0} is locked more than once in this block",
    LOCK_AND_RLOCK_SAME_NAME => DiagnosticCategory::Error,
        "{0} cannot be both lock-ed and rlock-ed in the same block",

    ARGUMENT_COUNT_MISMATCH => DiagnosticCategory::Error,
        "expected {0} arguments, got {1}",
    ARGUMENT_TYPE_MISMATCH => DiagnosticCategory::Error,
        "cannot use {0} as argument of type {1}",
    UNKNOWN_IDENTIFIER => DiagnosticCategory::Error, "undefined: {0}",
    NOT_CALLABLE => DiagnosticCategory::Error, "{0} is not callable",
    UNSAFE_CALL_OUTSIDE_UNSAFE_BLOCK => DiagnosticCategory::Error,
        "call to unsafe function {0} outside an unsafe block",
    DEPRECATED_USE => DiagnosticCategory::Notice, "{0} is deprecated{1}",
    OR_BLOCK_TYPE_MISMATCH => DiagnosticCategory::Error,
        "or block must return {0} or end in return/break/continue",

    TOO_DEEPLY_NESTED_EXPRESSION => DiagnosticCategory::Error, "too deeply nested expression",
    TOO_DEEPLY_NESTED_STATEMENT => DiagnosticCategory::Error, "too deeply nested statement",
    MESSAGE_LIMIT_EXCEEDED => DiagnosticCategory::Error, "too many errors, stopping",

    BRANCH_NOT_EXHAUSTIVE => DiagnosticCategory::Error, "match is not exhaustive, missing {0}",
    CAST_NOT_ALLOWED => DiagnosticCategory::Error, "cannot cast {0} to {1}",
    INDEX_TYPE_MISMATCH => DiagnosticCategory::Error, "cannot index {0} with {1}",
    MAIN_FUNCTION_MISSING => DiagnosticCategory::Error, "function main is undeclared",
    AMBIGUOUS_BOOLEAN_PRECEDENCE => DiagnosticCategory::Error,
        "ambiguous boolean expression, use parentheses to clarify precedence",

    SHIFT_REQUIRES_INTEGRAL => DiagnosticCategory::Error,
        "shift operands must be integral, got {0} and {1}",
    LEFT_SHIFT_OF_SIGNED => DiagnosticCategory::Warning,
        "left-hand operand {0} of shift is signed",
    SHIFT_COUNT_OVERFLOW => DiagnosticCategory::Error,
        "shift count {0} overflows the {1}-bit operand",
    POINTER_ARITHMETIC_REQUIRES_UNSAFE => DiagnosticCategory::Error,
        "pointer arithmetic on {0} requires an unsafe block",
    POINTER_INDEX_OUTSIDE_UNSAFE => DiagnosticCategory::Warning,
        "indexing pointer {0} outside an unsafe block",
    SIGNED_UNSIGNED_MISMATCH => DiagnosticCategory::Error,
        "cannot combine signed {0} and unsigned {1} of the same width",
}

#[must_use]
pub fn lookup(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}
