//! C-style kernel formatting.
//!
//! Supports `%d`, `%x`, `%p`, `%s` and `%%`. An unknown conversion, or one
//! whose argument is missing or of the wrong kind, is echoed back as typed
//! so it stands out in the output. A `%` at the very end is dropped.

use core::fmt;

/// One argument for [`format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg<'a> {
    /// A signed integer.
    Int(i32),
    /// An unsigned integer.
    Uint(u32),
    /// An address.
    Ptr(usize),
    /// A string; `None` prints as `(null)`.
    Str(Option<&'a str>),
}

/// Formats `fmt` with `args` into `out`.
///
/// # Panics
///
/// Panics with `null fmt` if `fmt` is `None`.
pub fn format<W: fmt::Write + ?Sized>(
    out: &mut W,
    fmt: Option<&str>,
    args: &[Arg<'_>],
) -> fmt::Result {
    let Some(fmt) = fmt else {
        panic!("null fmt");
    };

    let mut args = args.iter();
    let mut chars = fmt.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.write_char(c)?;
            continue;
        }
        let Some(conv) = chars.next() else {
            break;
        };
        match (conv, conv_arg(conv, &mut args)) {
            ('%', _) => out.write_char('%')?,
            ('d', Some(Arg::Int(v))) => write!(out, "{}", v)?,
            ('d', Some(Arg::Uint(v))) => write!(out, "{}", v)?,
            ('d', Some(Arg::Ptr(v))) => write!(out, "{}", v)?,
            ('x' | 'p', Some(Arg::Int(v))) => write!(out, "{:x}", *v as u32)?,
            ('x' | 'p', Some(Arg::Uint(v))) => write!(out, "{:x}", v)?,
            ('x' | 'p', Some(Arg::Ptr(v))) => write!(out, "{:x}", v)?,
            ('s', Some(Arg::Str(s))) => out.write_str(s.unwrap_or("(null)"))?,
            (other, _) => {
                out.write_char('%')?;
                out.write_char(other)?;
            }
        }
    }
    Ok(())
}

/// Takes the next argument if `conv` consumes one.
fn conv_arg<'a, 'b>(
    conv: char,
    args: &mut core::slice::Iter<'b, Arg<'a>>,
) -> Option<&'b Arg<'a>> {
    match conv {
        'd' | 'x' | 'p' | 's' => args.next(),
        _ => None,
    }
}

/// A format string and its arguments, printable with `{}`.
pub struct Printf<'f, 'a> {
    fmt: Option<&'f str>,
    args: &'f [Arg<'a>],
}

impl<'f, 'a> Printf<'f, 'a> {
    /// Pairs a format string with its arguments.
    pub fn new(fmt: Option<&'f str>, args: &'f [Arg<'a>]) -> Self {
        Self { fmt, args }
    }
}

impl fmt::Display for Printf<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format(f, self.fmt, self.args)
    }
}

/// Formats onto the kernel console.
///
/// # Panics
///
/// Panics with `null fmt` if `fmt` is `None`.
pub fn cprintf(fmt: Option<&str>, args: &[Arg<'_>]) {
    if fmt.is_none() {
        panic!("null fmt");
    }
    crate::console::_print(format_args!("{}", Printf::new(fmt, args)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String;

    fn render(fmt: &str, args: &[Arg<'_>]) -> String {
        let mut out = String::new();
        format(&mut out, Some(fmt), args).unwrap();
        out
    }

    #[test]
    fn test_conversions() {
        assert_eq!(render("pid %d\n", &[Arg::Int(-12)]), "pid -12\n");
        assert_eq!(render("%x", &[Arg::Uint(0xbeef)]), "beef");
        assert_eq!(render("%p", &[Arg::Ptr(0x8010_2000)]), "80102000");
        assert_eq!(render("%x", &[Arg::Int(-1)]), "ffffffff");
        assert_eq!(render("%s!", &[Arg::Str(Some("init"))]), "init!");
        assert_eq!(render("100%%", &[]), "100%");
    }

    #[test]
    fn test_null_string() {
        assert_eq!(render("%s", &[Arg::Str(None)]), "(null)");
    }

    #[test]
    fn test_unknown_and_mismatched_conversions_echo() {
        assert_eq!(render("%c", &[]), "%c");
        assert_eq!(render("%d", &[]), "%d");
        assert_eq!(render("%s", &[Arg::Int(3)]), "%s");
        assert_eq!(render("end%", &[]), "end");
    }

    #[test]
    fn test_display_adapter() {
        let args = [Arg::Str(Some("sh")), Arg::Int(2)];
        let text = std::format!("{}", Printf::new(Some("%s %d"), &args));
        assert_eq!(text, "sh 2");
    }

    #[test]
    #[should_panic(expected = "null fmt")]
    fn test_null_format_panics() {
        let mut out = String::new();
        let _ = format(&mut out, None, &[]);
    }
}
