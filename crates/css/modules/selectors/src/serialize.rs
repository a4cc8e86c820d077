//! Serialization of compiled selectors back to selector text.
//! Reference: <https://drafts.csswg.org/cssom/#serializing-selectors>

use crate::{AttrOperator, Selector};
use core::fmt::{self, Display, Formatter, Write as _};

impl Display for Selector {
    /// Writes a simple selector sequence. Output of [`crate::compile`] always
    /// compiles back to an equal selector; constructor-built selectors with
    /// empty names have no such text.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        flatten(self, &mut parts);

        let mut leading_type = None;
        let mut universal = false;
        let mut rest = Vec::new();
        for part in parts {
            match part {
                Selector::Type(tag) if leading_type.is_none() => leading_type = Some(tag),
                Selector::Universal => universal = true,
                other => rest.push(other),
            }
        }

        match leading_type {
            Some(tag) => write_identifier(f, tag)?,
            None if universal || rest.is_empty() => f.write_char('*')?,
            None => {}
        }
        rest.into_iter().try_for_each(|part| write_simple(f, part))
    }
}

fn flatten<'sel>(selector: &'sel Selector, out: &mut Vec<&'sel Selector>) {
    if let Selector::Intersection(left, right) = selector {
        flatten(left, out);
        flatten(right, out);
    } else {
        out.push(selector);
    }
}

fn write_simple(f: &mut Formatter<'_>, selector: &Selector) -> fmt::Result {
    match selector {
        // Only one type selector fits in a sequence; extra ones go through a double negation.
        Selector::Universal | Selector::Type(_) | Selector::Intersection(..) => {
            write!(f, ":not(:not({selector}))")
        }
        Selector::Id(id) => {
            f.write_char('#')?;
            write_name(f, id)
        }
        Selector::Class(class) => {
            f.write_char('.')?;
            write_identifier(f, class)
        }
        Selector::Attribute { key, operator } => {
            f.write_char('[')?;
            write_identifier(f, key)?;
            let (symbol, value) = match operator {
                AttrOperator::Exists => return f.write_char(']'),
                AttrOperator::Equals(value) => ("=", value),
                AttrOperator::Includes(value) => ("~=", value),
                AttrOperator::DashMatch(value) => ("|=", value),
                AttrOperator::Prefix(value) => ("^=", value),
                AttrOperator::Suffix(value) => ("$=", value),
                AttrOperator::Substring(value) => ("*=", value),
            };
            f.write_str(symbol)?;
            write_string(f, value)?;
            f.write_char(']')
        }
        Selector::Negation(inner) => write!(f, ":not({inner})"),
        Selector::NthChild {
            step,
            offset,
            last,
            of_type,
        } => {
            let name = match (last, of_type) {
                (false, false) => "nth-child",
                (true, false) => "nth-last-child",
                (false, true) => "nth-of-type",
                (true, true) => "nth-last-of-type",
            };
            write!(f, ":{name}(")?;
            write_nth(f, *step, *offset)?;
            f.write_char(')')
        }
        Selector::OnlyChild { of_type: false } => f.write_str(":only-child"),
        Selector::OnlyChild { of_type: true } => f.write_str(":only-of-type"),
        Selector::Empty => f.write_str(":empty"),
        Selector::Root => f.write_str(":root"),
    }
}

fn write_nth(f: &mut Formatter<'_>, step: i32, offset: i32) -> fmt::Result {
    match step {
        0 => return write!(f, "{offset}"),
        1 => f.write_char('n')?,
        -1 => f.write_str("-n")?,
        _ => write!(f, "{step}n")?,
    }
    match offset {
        0 => Ok(()),
        positive if positive > 0 => write!(f, "+{positive}"),
        negative => write!(f, "{negative}"),
    }
}

fn write_hex_escape(f: &mut Formatter<'_>, ch: char) -> fmt::Result {
    write!(f, "\\{:x} ", u32::from(ch))
}

/// NUL has no escaped form and reads as U+FFFD.
fn write_control(f: &mut Formatter<'_>, ch: char) -> fmt::Result {
    if ch == '\0' {
        write_hex_escape(f, char::REPLACEMENT_CHARACTER)
    } else {
        write_hex_escape(f, ch)
    }
}

/// Escape so the text re-parses as one identifier.
fn write_identifier(f: &mut Formatter<'_>, ident: &str) -> fmt::Result {
    if ident == "-" {
        return f.write_str("\\-");
    }
    let leading_dash = ident.starts_with('-');
    for (index, ch) in ident.chars().enumerate() {
        let at_name_start = index == 0 || (index == 1 && leading_dash);
        if ch.is_ascii_control() || (at_name_start && ch.is_ascii_digit()) {
            write_control(f, ch)?;
        } else if index == 1 && leading_dash && ch == '-' {
            f.write_str("\\-")?;
        } else {
            write_name_char(f, ch)?;
        }
    }
    Ok(())
}

/// Escape so the text re-parses as one name (no start-character rules).
fn write_name(f: &mut Formatter<'_>, name: &str) -> fmt::Result {
    name.chars().try_for_each(|ch| {
        if ch.is_ascii_control() {
            write_control(f, ch)
        } else {
            write_name_char(f, ch)
        }
    })
}

fn write_name_char(f: &mut Formatter<'_>, ch: char) -> fmt::Result {
    if !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()) {
        f.write_char('\\')?;
    }
    f.write_char(ch)
}

fn write_string(f: &mut Formatter<'_>, value: &str) -> fmt::Result {
    f.write_char('"')?;
    for ch in value.chars() {
        match ch {
            '"' | '\\' => {
                f.write_char('\\')?;
                f.write_char(ch)?;
            }
            // Strings take raw NUL, so it survives a round trip.
            '\0' => f.write_char(ch)?,
            control if control.is_ascii_control() => write_hex_escape(f, control)?,
            other => f.write_char(other)?,
        }
    }
    f.write_char('"')
}

#[cfg(test)]
mod tests {
    use crate::matcher::{
        attribute_equals_selector, class_selector, id_selector, intersection_selector,
        type_selector,
    };
    use crate::{ParseError, compile};
    use rstest::rstest;

    #[rstest]
    #[case("", "*")]
    #[case("*", "*")]
    #[case("DIV", "div")]
    #[case("*.a", "*.a")]
    #[case("p#intro.lead", "p#intro.lead")]
    #[case("[HREF]", "[href]")]
    #[case("[lang|=en]", "[lang|=\"en\"]")]
    #[case("li:nth-child(odd)", "li:nth-child(2n+1)")]
    #[case(":nth-last-of-type(-n+3)", ":nth-last-of-type(-n+3)")]
    #[case(":nth-of-type(3n-1)", ":nth-of-type(3n-1)")]
    #[case(":first-child", ":nth-child(1)")]
    #[case(":only-of-type:empty:root", ":only-of-type:empty:root")]
    #[case(":not(a.b)", ":not(a.b)")]
    fn prints_canonical_text(#[case] text: &str, #[case] expected: &str) -> Result<(), ParseError> {
        assert_eq!(compile(text)?.to_string(), expected);
        Ok(())
    }

    #[rstest]
    #[case(".a\\.b")]
    #[case(".\\31 0")]
    #[case(".-\\31 x")]
    #[case("#1st")]
    #[case("[title='say \"hi\"\\\\']")]
    #[case("[title='tab\\9 here']")]
    #[case(".café:not([data-x^='a]b'])")]
    #[case("span:nth-last-child(0n-4)")]
    fn escaped_text_round_trips(#[case] text: &str) -> Result<(), ParseError> {
        let compiled = compile(text)?;
        assert_eq!(compile(&compiled.to_string())?, compiled);
        Ok(())
    }

    #[test]
    fn constructed_selectors_round_trip() -> Result<(), ParseError> {
        let unusual = intersection_selector(
            intersection_selector(class_selector("x"), type_selector("div")),
            intersection_selector(type_selector("span"), id_selector("1")),
        );
        let printed = unusual.to_string();
        assert_eq!(printed, "div.x:not(:not(span))#1");
        assert_eq!(compile(&printed)?.specificity(), unusual.specificity());

        let attr = attribute_equals_selector("data-x", "line\nbreak");
        assert_eq!(compile(&attr.to_string())?, attr);
        Ok(())
    }

    #[test]
    fn nul_in_names_prints_as_replacement_character() -> Result<(), ParseError> {
        let class = class_selector("a\0b");
        assert_eq!(class.to_string(), ".a\\fffd b");
        assert_eq!(compile(&class.to_string())?, class_selector("a\u{fffd}b"));

        let id = id_selector("\0");
        assert_eq!(compile(&id.to_string())?, id_selector("\u{fffd}"));
        Ok(())
    }

    #[test]
    fn nul_in_compiled_strings_round_trips() -> Result<(), ParseError> {
        let compiled = compile("[title='a\0b']")?;
        assert_eq!(compiled, attribute_equals_selector("title", "a\0b"));
        assert_eq!(compile(&compiled.to_string())?, compiled);
        Ok(())
    }
}
