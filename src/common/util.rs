// Copyright (c) 2016-2021 Fabian Schuiki

//! A collection of helpers to render grammar text for humans.

/// Escape newlines and tabs in a symbol name.
pub fn escape(input: &str) -> String {
    input.replace('\n', r"\n").replace('\t', r"\t")
}

/// Escape control characters in a regular expression.
pub fn esc_control_characters(regex: &str) -> String {
    let mut out = String::with_capacity(regex.len());
    for c in regex.chars() {
        match c {
            '\x07' => out.push_str(r"\a"),
            '\x08' => out.push_str(r"\b"),
            '\x0c' => out.push_str(r"\f"),
            '\n' => out.push_str(r"\n"),
            '\r' => out.push_str(r"\r"),
            '\t' => out.push_str(r"\t"),
            '\x0b' => out.push_str(r"\v"),
            c => out.push(c),
        }
    }
    out
}

/// Undo the escape sequences allowed in quoted grammar strings.
pub fn unescape_str(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes() {
        assert_eq!(escape("a\nb\tc"), r"a\nb\tc");
        assert_eq!(esc_control_characters("x\x08\r"), r"x\b\r");
    }

    #[test]
    fn unescapes() {
        assert_eq!(unescape_str(r#"a\"b\\n\n\q"#), "a\"b\\n\n\\q");
    }
}
