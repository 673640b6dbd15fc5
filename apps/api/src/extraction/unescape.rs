/// Decodes a PDF literal string operand, including its surrounding parentheses.
///
/// Only the common escapes are handled: `\(`, `\)`, `\n`, `\r`, `\t` and `\\`,
/// replaced in that order. Octal codes and line continuations pass through
/// untouched.
pub fn unescape_literal(literal: &str) -> String {
    let inner = literal
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(literal);

    inner
        .replace("\\(", "(")
        .replace("\\)", ")")
        .replace("\\n", "\n")
        .replace("\\r", "\r")
        .replace("\\t", "\t")
        .replace("\\\\", "\\")
}
