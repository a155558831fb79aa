use std::borrow::Cow;

use crate::error::EasyMssqlError;
use crate::params::Params;

/// Rewrite named `@param` references to the positional `@Pn` placeholders the
/// driver declares, using each parameter's binding position.
///
/// Skips string literals (with `''` escapes), double-quoted and bracketed
/// identifiers (with `""`/`]]` escapes), line comments, and nesting block
/// comments. `@@` system variables and names not present in `params` are left
/// untouched. Returns a borrowed `Cow` when no changes are needed.
#[must_use]
pub fn positionalize<'a>(sql: &'a str, params: &Params) -> Cow<'a, str> {
    let bytes = sql.as_bytes();
    let mut out: Option<String> = None;
    // Start of the segment not yet copied into `out`.
    let mut copied = 0;
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'[' => state = State::Bracketed,
                b'-' if bytes.get(idx + 1) == Some(&b'-') => {
                    state = State::LineComment;
                    idx += 1;
                }
                b'/' if bytes.get(idx + 1) == Some(&b'*') => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'@' => {
                    if bytes.get(idx + 1) == Some(&b'@') {
                        // system variable like @@ROWCOUNT
                        idx = scan_name(bytes, idx + 2);
                        continue;
                    }
                    let end = scan_name(bytes, idx + 1);
                    if end > idx + 1 {
                        if let Some(pos) = params.position(&sql[idx + 1..end]) {
                            let buf = out.get_or_insert_with(String::new);
                            buf.push_str(&sql[copied..idx]);
                            buf.push_str("@P");
                            buf.push_str(&(pos + 1).to_string());
                            copied = end;
                        }
                        idx = end;
                        continue;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Bracketed => {
                if b == b']' {
                    if bytes.get(idx + 1) == Some(&b']') {
                        idx += 1; // skip escaped bracket
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if b == b'/' && bytes.get(idx + 1) == Some(&b'*') {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if b == b'*' && bytes.get(idx + 1) == Some(&b'/') {
                    if depth == 1 {
                        state = State::Normal;
                    } else {
                        state = State::BlockComment(depth - 1);
                    }
                    idx += 1;
                }
            }
        }

        idx += 1;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}

/// Synthesize the `EXEC` statement that invokes a stored procedure with the
/// given parameters passed by name, placeholders in binding order.
#[must_use]
pub fn procedure_call(procedure: &str, params: &Params) -> String {
    let mut text = String::from("EXEC ");
    text.push_str(&quote_procedure_name(procedure));
    for (idx, name) in params.names().enumerate() {
        if idx > 0 {
            text.push(',');
        }
        text.push_str(&format!(" @{name} = @P{}", idx + 1));
    }
    text
}

/// Reject empty statement/procedure text before a connection is spent on it.
pub(crate) fn ensure_command(command: &str) -> Result<(), EasyMssqlError> {
    if command.trim().is_empty() {
        Err(EasyMssqlError::ExecutionError(
            "statement or procedure name is empty".to_string(),
        ))
    } else {
        Ok(())
    }
}

// Bracket-quote each dot-separated part of a possibly schema-qualified name,
// leaving parts the caller already bracketed alone.
fn quote_procedure_name(procedure: &str) -> String {
    procedure
        .split('.')
        .map(|part| {
            if part.starts_with('[') && part.ends_with(']') {
                part.to_string()
            } else {
                format!("[{}]", part.replace(']', "]]"))
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

// T-SQL variable names: letters, digits, '_', '#', '$'.
fn scan_name(bytes: &[u8], start: usize) -> usize {
    let mut idx = start;
    while idx < bytes.len()
        && (bytes[idx].is_ascii_alphanumeric() || matches!(bytes[idx], b'_' | b'#' | b'$'))
    {
        idx += 1;
    }
    idx
}

#[derive(Clone)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Bracketed,
    LineComment,
    BlockComment(u32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlValue;

    fn abc() -> Params {
        Params::new()
            .with("a", 1_i64)
            .with("b", "hello")
            .with("c", SqlValue::Null)
    }

    #[test]
    fn rewrites_named_placeholders_by_binding_position() {
        let sql = "select @a as a, @b as b, @c as c";
        let res = positionalize(sql, &abc());
        assert_eq!(res, "select @P1 as a, @P2 as b, @P3 as c");
    }

    #[test]
    fn repeated_references_share_one_placeholder() {
        let res = positionalize("select @a + @a", &abc());
        assert_eq!(res, "select @P1 + @P1");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let res = positionalize("select @A, @B", &abc());
        assert_eq!(res, "select @P1, @P2");
    }

    #[test]
    fn skips_inside_literals_and_comments() {
        let sql = "select '@a', @a -- @b\n/* @c */ from t where x = @b";
        let res = positionalize(sql, &abc());
        assert_eq!(res, "select '@a', @P1 -- @b\n/* @c */ from t where x = @P2");
    }

    #[test]
    fn skips_bracketed_and_quoted_identifiers() {
        let sql = r#"select [odd @a name], "@b" from t where y = @c"#;
        let res = positionalize(sql, &abc());
        assert_eq!(res, r#"select [odd @a name], "@b" from t where y = @P3"#);
    }

    #[test]
    fn leaves_system_variables_untouched() {
        let res = positionalize("select @@ROWCOUNT, @a", &abc());
        assert_eq!(res, "select @@ROWCOUNT, @P1");
    }

    #[test]
    fn leaves_unknown_names_untouched() {
        let res = positionalize("select @unknown, @a", &abc());
        assert_eq!(res, "select @unknown, @P1");
    }

    #[test]
    fn no_parameters_borrows_the_input() {
        let res = positionalize("select 1", &Params::new());
        assert!(matches!(res, Cow::Borrowed(_)));
    }

    #[test]
    fn handles_escaped_quotes() {
        let sql = "select 'it''s @a', @a";
        let res = positionalize(sql, &abc());
        assert_eq!(res, "select 'it''s @a', @P1");
    }

    #[test]
    fn synthesizes_procedure_calls_in_binding_order() {
        let text = procedure_call("dbo.add_user", &abc());
        assert_eq!(text, "EXEC [dbo].[add_user] @a = @P1, @b = @P2, @c = @P3");
    }

    #[test]
    fn procedure_without_parameters() {
        assert_eq!(procedure_call("cleanup", &Params::new()), "EXEC [cleanup]");
    }

    #[test]
    fn already_bracketed_names_are_kept() {
        let text = procedure_call("[dbo].[weird proc]", &Params::new());
        assert_eq!(text, "EXEC [dbo].[weird proc]");
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(ensure_command("  ").is_err());
        assert!(ensure_command("select 1").is_ok());
    }
}
