//! Forward scanner for `$name` / `${...}` placeholders.

use crate::error::ExpandError;

/// Longest variable name accepted, in bytes.
pub const MAX_NAME_LEN: usize = 64;

/// A two-character operator inside a braced placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `:-` — operand when unset or empty.
    Default,
    /// `:+` — operand when set and non-empty.
    Alternate,
    /// `:?` — fail with operand as the message when unset or empty.
    Required,
    /// `:=` — like `:-`, and also store the operand.
    Assign,
}

impl Op {
    /// Priority order used when two tokens start at the same offset.
    const ALL: [Op; 4] = [Op::Default, Op::Alternate, Op::Required, Op::Assign];

    pub fn token(self) -> &'static str {
        match self {
            Op::Default => ":-",
            Op::Alternate => ":+",
            Op::Required => ":?",
            Op::Assign => ":=",
        }
    }
}

/// One piece of scanned input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text to emit verbatim. Includes placeholders that failed validation.
    Lit(&'a str),
    /// `$name` or `${name}`; `raw` is the placeholder's source text.
    Var { name: &'a str, raw: &'a str },
    /// `${name<op>operand}`. The operand is never expanded further.
    Op {
        name: &'a str,
        op: Op,
        operand: &'a str,
    },
}

/// Lazily splits input into [`Segment`]s, left to right.
///
/// The cursor only moves forward. After an error the scanner is exhausted.
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            failed: false,
        }
    }

    /// `$` at `at`, followed by something other than `{`.
    fn bare(&mut self, at: usize) -> Segment<'a> {
        let bytes = self.src.as_bytes();
        let start = at + 1;

        if !is_name_start(bytes[start]) {
            // Re-scan whatever follows as ordinary input.
            self.pos = start;
            return Segment::Lit("$");
        }

        let mut end = start + 1;
        while end < bytes.len() && is_name_byte(bytes[end]) && end - start < MAX_NAME_LEN {
            end += 1;
        }

        self.pos = end;
        Segment::Var {
            name: &self.src[start..end],
            raw: &self.src[at..end],
        }
    }

    /// `${` at `at`.
    fn braced(&mut self, at: usize) -> Result<Segment<'a>, ExpandError> {
        let bytes = self.src.as_bytes();
        let open = at + 1;

        let mut depth = 0usize;
        let mut close = None;
        for (i, &b) in bytes.iter().enumerate().skip(open) {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }

        let Some(close) = close else {
            return Err(ExpandError::UnclosedBrace { offset: at });
        };

        self.pos = close + 1;
        let raw = &self.src[at..=close];
        let content = &self.src[open + 1..close];

        let seg = match find_op(content) {
            Some((idx, op)) => {
                let name = &content[..idx];
                if !is_valid_name(name) {
                    return Ok(Segment::Lit(raw));
                }
                Segment::Op {
                    name,
                    op,
                    operand: &content[idx + 2..],
                }
            }
            None if is_valid_name(content) => Segment::Var { name: content, raw },
            None => Segment::Lit(raw),
        };
        Ok(seg)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Segment<'a>, ExpandError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.src.len() {
            return None;
        }

        let rest = &self.src[self.pos..];
        let at = match rest.find('$') {
            None => {
                self.pos = self.src.len();
                return Some(Ok(Segment::Lit(rest)));
            }
            Some(0) => self.pos,
            Some(off) => {
                self.pos += off;
                return Some(Ok(Segment::Lit(&rest[..off])));
            }
        };

        let seg = match self.src.as_bytes().get(at + 1) {
            None => {
                self.pos = self.src.len();
                Ok(Segment::Lit("$"))
            }
            Some(b'{') => self.braced(at),
            Some(_) => Ok(self.bare(at)),
        };

        if seg.is_err() {
            self.failed = true;
        }
        Some(seg)
    }
}

/// Leftmost operator token in `content`; ties go to [`Op::ALL`] order.
fn find_op(content: &str) -> Option<(usize, Op)> {
    Op::ALL
        .iter()
        .filter_map(|&op| content.find(op.token()).map(|idx| (idx, op)))
        .min_by_key(|&(idx, _)| idx)
}

/// 1–64 bytes, `[A-Za-z_]` then `[A-Za-z0-9_]*`.
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.split_first() {
        Some((&first, rest)) => {
            bytes.len() <= MAX_NAME_LEN
                && is_name_start(first)
                && rest.iter().all(|&b| is_name_byte(b))
        }
        None => false,
    }
}

#[inline]
fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

#[inline]
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> Vec<Segment<'_>> {
        Scanner::new(src)
            .collect::<Result<_, _>>()
            .expect("scan failed")
    }

    #[test]
    fn literal_passthrough() {
        assert_eq!(scan("no sigils here"), [Segment::Lit("no sigils here")]);
        assert!(scan("").is_empty());
    }

    #[test]
    fn bare_name_stops_at_punctuation() {
        assert_eq!(
            scan("a $HOST*b"),
            [
                Segment::Lit("a "),
                Segment::Var {
                    name: "HOST",
                    raw: "$HOST"
                },
                Segment::Lit("*b"),
            ]
        );
    }

    #[test]
    fn digit_first_is_not_a_name() {
        assert_eq!(scan("$1x"), [Segment::Lit("$"), Segment::Lit("1x")]);
    }

    #[test]
    fn trailing_sigil_is_literal() {
        assert_eq!(scan("cost $"), [Segment::Lit("cost "), Segment::Lit("$")]);
    }

    #[test]
    fn double_sigil_rescans_second() {
        assert_eq!(
            scan("$$USER"),
            [
                Segment::Lit("$"),
                Segment::Var {
                    name: "USER",
                    raw: "$USER"
                },
            ]
        );
    }

    #[test]
    fn bare_name_is_capped() {
        let long = "A".repeat(70);
        let src = format!("${long}");
        let segs = scan(&src);
        assert_eq!(
            segs[0],
            Segment::Var {
                name: &long[..64],
                raw: &src[..65]
            }
        );
        assert_eq!(segs[1], Segment::Lit(&long[64..]));
    }

    #[test]
    fn braced_operators() {
        let cases = [
            ("${A:-x}", Op::Default),
            ("${A:+x}", Op::Alternate),
            ("${A:?x}", Op::Required),
            ("${A:=x}", Op::Assign),
        ];
        for (src, op) in cases {
            assert_eq!(
                scan(src),
                [Segment::Op {
                    name: "A",
                    op,
                    operand: "x"
                }],
                "{src}"
            );
        }
    }

    #[test]
    fn leftmost_operator_wins() {
        assert_eq!(
            scan("${A:+x:-y}"),
            [Segment::Op {
                name: "A",
                op: Op::Alternate,
                operand: "x:-y"
            }]
        );
    }

    #[test]
    fn nested_braces_stay_in_operand() {
        assert_eq!(
            scan("${PATH:-${HOME}/bin}!"),
            [
                Segment::Op {
                    name: "PATH",
                    op: Op::Default,
                    operand: "${HOME}/bin"
                },
                Segment::Lit("!"),
            ]
        );
    }

    #[test]
    fn invalid_braced_names_fall_back_to_source() {
        for src in ["${}", "${1a}", "${A-B:-x}", "${ :-x}", "${A B}"] {
            assert_eq!(scan(src), [Segment::Lit(src)], "{src}");
        }
    }

    #[test]
    fn unclosed_brace_stops_scanner() {
        let mut s = Scanner::new("ok ${USER");
        assert_eq!(s.next(), Some(Ok(Segment::Lit("ok "))));
        assert_eq!(
            s.next(),
            Some(Err(ExpandError::UnclosedBrace { offset: 3 }))
        );
        assert_eq!(s.next(), None);
    }

    #[test]
    fn position_advances_past_placeholder() {
        let mut s = Scanner::new("${A}b");
        s.next();
        assert_eq!(s.pos, 4);
    }

    #[test]
    fn name_validation() {
        assert!(is_valid_name("_"));
        assert!(is_valid_name("VAR123"));
        assert!(is_valid_name(&"x".repeat(64)));
        assert!(!is_valid_name(&"x".repeat(65)));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("9lives"));
        assert!(!is_valid_name("has-dash"));
        assert!(!is_valid_name("café"));
    }

    #[test]
    fn multibyte_text_passes_through() {
        assert_eq!(
            scan("é$X€"),
            [
                Segment::Lit("é"),
                Segment::Var { name: "X", raw: "$X" },
                Segment::Lit("€"),
            ]
        );
    }
}
