//! Regular expression literal validation.
//!
//! The lexer only finds the extent of a regex literal; this module checks
//! the pattern grammar and the flags. The check is a single iterative pass
//! with an explicit group depth counter, so pathological nesting cannot
//! overflow the stack.

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RegexError {
    #[error("nothing to repeat")]
    NothingToRepeat,
    #[error("numbers out of order in {{}} quantifier")]
    QuantifierOutOfOrder,
    #[error("range out of order in character class")]
    RangeOutOfOrder,
    #[error("missing terminating ] for character class")]
    UnterminatedClass,
    #[error("missing )")]
    MissingParentheses,
    #[error("unmatched parentheses")]
    UnmatchedParentheses,
    #[error("\\ at end of pattern")]
    EscapeAtEnd,
    #[error("unrecognized character after (?")]
    InvalidGroup,
    #[error("invalid flags")]
    InvalidFlags,
}

/// Flags are limited to `g`, `i`, `m`, `u` and `y`, each at most once.
pub fn check_regex_flags(flags: &str) -> Result<(), RegexError> {
    let mut seen = 0u8;
    for c in flags.chars() {
        let bit = match c {
            'g' => 1,
            'i' => 2,
            'm' => 4,
            'u' => 8,
            'y' => 16,
            _ => return Err(RegexError::InvalidFlags),
        };
        if seen & bit != 0 {
            return Err(RegexError::InvalidFlags);
        }
        seen |= bit;
    }
    Ok(())
}

/// Check `pattern` (the text between the slashes) for syntax errors.
pub fn check_regex_syntax(pattern: &str) -> Result<(), RegexError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    let mut depth = 0u32;
    // Whether the previous term accepts a quantifier.
    let mut can_quantify = false;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                i += 1;
                let Some(&c) = chars.get(i) else {
                    return Err(RegexError::EscapeAtEnd);
                };
                i += 1;
                can_quantify = !matches!(c, 'b' | 'B');
            }
            '^' | '$' | '|' => {
                i += 1;
                can_quantify = false;
            }
            '(' => {
                i += 1;
                if chars.get(i) == Some(&'?') {
                    match chars.get(i + 1) {
                        Some(':' | '=' | '!') => i += 2,
                        _ => return Err(RegexError::InvalidGroup),
                    }
                }
                depth += 1;
                can_quantify = false;
            }
            ')' => {
                if depth == 0 {
                    return Err(RegexError::UnmatchedParentheses);
                }
                depth -= 1;
                i += 1;
                can_quantify = true;
            }
            '[' => {
                i = scan_class(&chars, i + 1)?;
                can_quantify = true;
            }
            '*' | '+' | '?' => {
                if !can_quantify {
                    return Err(RegexError::NothingToRepeat);
                }
                i = skip_lazy_marker(&chars, i + 1);
                can_quantify = false;
            }
            '{' => match parse_braced_quantifier(&chars, i) {
                Some((min, max, next)) => {
                    if !can_quantify {
                        return Err(RegexError::NothingToRepeat);
                    }
                    if max.is_some_and(|max| max < min) {
                        return Err(RegexError::QuantifierOutOfOrder);
                    }
                    i = skip_lazy_marker(&chars, next);
                    can_quantify = false;
                }
                // Not a quantifier: a literal brace.
                None => {
                    i += 1;
                    can_quantify = true;
                }
            },
            _ => {
                i += 1;
                can_quantify = true;
            }
        }
    }

    if depth > 0 {
        return Err(RegexError::MissingParentheses);
    }
    Ok(())
}

fn skip_lazy_marker(chars: &[char], i: usize) -> usize {
    if chars.get(i) == Some(&'?') { i + 1 } else { i }
}

/// `{n}`, `{n,}` or `{n,m}` starting at `start`. Returns `(min, max, next)`.
fn parse_braced_quantifier(chars: &[char], start: usize) -> Option<(u32, Option<u32>, usize)> {
    let mut i = start + 1;
    let min = parse_decimal(chars, &mut i)?;
    match chars.get(i)? {
        '}' => Some((min, Some(min), i + 1)),
        ',' => {
            i += 1;
            if chars.get(i)? == &'}' {
                return Some((min, None, i + 1));
            }
            let max = parse_decimal(chars, &mut i)?;
            (chars.get(i)? == &'}').then_some((min, Some(max), i + 1))
        }
        _ => None,
    }
}

fn parse_decimal(chars: &[char], i: &mut usize) -> Option<u32> {
    let start = *i;
    let mut value: u32 = 0;
    while let Some(d) = chars.get(*i).and_then(|c| c.to_digit(10)) {
        value = value.saturating_mul(10).saturating_add(d);
        *i += 1;
    }
    (*i > start).then_some(value)
}

/// Scan a character class body starting after `[`; returns the index after
/// the closing `]`.
fn scan_class(chars: &[char], mut i: usize) -> Result<usize, RegexError> {
    if chars.get(i) == Some(&'^') {
        i += 1;
    }
    loop {
        match chars.get(i) {
            None => return Err(RegexError::UnterminatedClass),
            Some(']') => return Ok(i + 1),
            Some(_) => {}
        }
        let low = class_atom(chars, &mut i)?;
        if chars.get(i) == Some(&'-') && !matches!(chars.get(i + 1), Some(']') | None) {
            i += 1;
            let high = class_atom(chars, &mut i)?;
            if let (Some(low), Some(high)) = (low, high)
                && low > high
            {
                return Err(RegexError::RangeOutOfOrder);
            }
        }
    }
}

/// One class atom. `None` for class escapes (`\d`, `\w`, ...), which cannot
/// bound a range.
fn class_atom(chars: &[char], i: &mut usize) -> Result<Option<u32>, RegexError> {
    let Some(&c) = chars.get(*i) else {
        return Err(RegexError::UnterminatedClass);
    };
    *i += 1;
    if c != '\\' {
        return Ok(Some(c as u32));
    }
    let Some(&e) = chars.get(*i) else {
        return Err(RegexError::EscapeAtEnd);
    };
    *i += 1;
    let value = match e {
        'd' | 'D' | 'w' | 'W' | 's' | 'S' => return Ok(None),
        'b' => 0x08,
        'n' => 0x0A,
        'r' => 0x0D,
        't' => 0x09,
        'f' => 0x0C,
        'v' => 0x0B,
        '0' => 0,
        'x' => read_hex(chars, i, 2).unwrap_or('x' as u32),
        'u' => read_hex(chars, i, 4).unwrap_or('u' as u32),
        'c' => match chars.get(*i) {
            Some(&l) if l.is_ascii_alphabetic() => {
                *i += 1;
                l as u32 % 32
            }
            _ => '\\' as u32,
        },
        other => other as u32,
    };
    Ok(Some(value))
}

fn read_hex(chars: &[char], i: &mut usize, count: usize) -> Option<u32> {
    let mut value = 0;
    for k in 0..count {
        value = value * 16 + chars.get(*i + k)?.to_digit(16)?;
    }
    *i += count;
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_patterns() {
        for pattern in [
            "a|b",
            "(?:ab)+?",
            "[a-z0-9_]",
            "[]",
            "x{2,3}",
            "x{2,}",
            "a{",
            "{}",
            "[\\d-z]",
            "(?=a)(?!b)",
            "\\/",
        ] {
            assert_eq!(check_regex_syntax(pattern), Ok(()), "{pattern}");
        }
    }

    #[test]
    fn test_invalid_patterns() {
        assert_eq!(check_regex_syntax("*a"), Err(RegexError::NothingToRepeat));
        assert_eq!(check_regex_syntax("a**"), Err(RegexError::NothingToRepeat));
        assert_eq!(check_regex_syntax("{1}"), Err(RegexError::NothingToRepeat));
        assert_eq!(
            check_regex_syntax("a{3,1}"),
            Err(RegexError::QuantifierOutOfOrder)
        );
        assert_eq!(
            check_regex_syntax("[z-a]"),
            Err(RegexError::RangeOutOfOrder)
        );
        assert_eq!(check_regex_syntax("[ab"), Err(RegexError::UnterminatedClass));
        assert_eq!(check_regex_syntax("(a"), Err(RegexError::MissingParentheses));
        assert_eq!(
            check_regex_syntax("a)"),
            Err(RegexError::UnmatchedParentheses)
        );
        assert_eq!(check_regex_syntax("(?<a)"), Err(RegexError::InvalidGroup));
        assert_eq!(check_regex_syntax("a\\"), Err(RegexError::EscapeAtEnd));
    }

    #[test]
    fn test_flags() {
        assert_eq!(check_regex_flags("gimuy"), Ok(()));
        assert_eq!(check_regex_flags("gg"), Err(RegexError::InvalidFlags));
        assert_eq!(check_regex_flags("s"), Err(RegexError::InvalidFlags));
    }

    #[test]
    fn test_deep_nesting_is_iterative() {
        let pattern = format!("{}a{}", "(".repeat(100_000), ")".repeat(100_000));
        assert_eq!(check_regex_syntax(&pattern), Ok(()));
    }
}
