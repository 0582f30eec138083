//! LDAP-style selection filters.
//!
//! An import may carry a `selection-filter` directive whose expression is
//! evaluated against a candidate export's attributes. The grammar is the
//! familiar parenthesized prefix form:
//!
//! ```text
//! (&(vendor=acme)(|(tier=gold)(!(deprecated=true))))
//! ```
//!
//! Supported comparisons: `=` (with `*` wildcards for substring matching and
//! bare `=*` for presence), `>=`, `<=`, and `~=` (case- and
//! whitespace-insensitive equality). The ordering comparisons use version
//! order when both sides parse as versions and lexical order otherwise.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::WeftError;
use crate::version::Version;

/// A parsed, immutable filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    root: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    Equal(String, String),
    Approx(String, String),
    GreaterEq(String, String),
    LessEq(String, String),
    Present(String),
    /// An `a*b*c` pattern split at its `*`s into literal parts. An empty
    /// first or last part means the pattern begins or ends with a wildcard.
    Substr(String, Vec<String>),
}

impl Filter {
    /// Parse a filter expression, rejecting malformed syntax.
    pub fn parse(input: &str) -> Result<Self, WeftError> {
        let mut parser = Parser {
            chars: input.char_indices().peekable(),
            input,
        };
        let root = parser.parse_expr()?;
        parser.skip_whitespace();
        if parser.chars.next().is_some() {
            return Err(malformed(input, "trailing characters after expression"));
        }
        Ok(Self { root })
    }

    /// Evaluate the filter against an attribute map.
    pub fn matches(&self, attributes: &BTreeMap<String, String>) -> bool {
        eval(&self.root, attributes)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(&self.root, f)
    }
}

fn malformed(input: &str, message: &str) -> WeftError {
    WeftError::MalformedConstraint {
        message: format!("filter `{input}`: {message}"),
    }
}

fn eval(expr: &Expr, attributes: &BTreeMap<String, String>) -> bool {
    match expr {
        Expr::And(children) => children.iter().all(|c| eval(c, attributes)),
        Expr::Or(children) => children.iter().any(|c| eval(c, attributes)),
        Expr::Not(child) => !eval(child, attributes),
        Expr::Equal(attr, value) => attributes.get(attr).is_some_and(|v| v == value),
        Expr::Approx(attr, value) => attributes
            .get(attr)
            .is_some_and(|v| normalize(v) == normalize(value)),
        Expr::GreaterEq(attr, value) => attributes
            .get(attr)
            .is_some_and(|v| ordered(v, value) != Ordering::Less),
        Expr::LessEq(attr, value) => attributes
            .get(attr)
            .is_some_and(|v| ordered(v, value) != Ordering::Greater),
        Expr::Present(attr) => attributes.contains_key(attr),
        Expr::Substr(attr, parts) => attributes.get(attr).is_some_and(|v| substr_match(parts, v)),
    }
}

/// Ordering for `>=`/`<=`: version order when both sides parse as versions
/// (so `10.0.0` sorts after `9.0.0` against the injected `version`
/// attribute), lexical string order otherwise.
fn ordered(left: &str, right: &str) -> Ordering {
    match (Version::parse(left), Version::parse(right)) {
        (Ok(l), Ok(r)) => l.cmp(&r),
        _ => left.cmp(right),
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Match an `a*b*c` pattern split into its literal parts. Empty first/last
/// parts mean the pattern begins/ends with a wildcard.
fn substr_match(parts: &[String], test: &str) -> bool {
    let mut remaining = test;

    let first = &parts[0];
    if !first.is_empty() {
        match remaining.strip_prefix(first.as_str()) {
            Some(rest) => remaining = rest,
            None => return false,
        }
    }

    let last = &parts[parts.len() - 1];
    let middle = &parts[1..parts.len() - 1];

    for part in middle {
        if part.is_empty() {
            continue;
        }
        match remaining.find(part.as_str()) {
            Some(at) => remaining = &remaining[at + part.len()..],
            None => return false,
        }
    }

    last.is_empty() || remaining.ends_with(last.as_str())
}

fn write_expr(expr: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expr {
        Expr::And(children) => {
            write!(f, "(&")?;
            for c in children {
                write_expr(c, f)?;
            }
            write!(f, ")")
        }
        Expr::Or(children) => {
            write!(f, "(|")?;
            for c in children {
                write_expr(c, f)?;
            }
            write!(f, ")")
        }
        Expr::Not(child) => {
            write!(f, "(!")?;
            write_expr(child, f)?;
            write!(f, ")")
        }
        Expr::Equal(a, v) => write!(f, "({a}={v})"),
        Expr::Approx(a, v) => write!(f, "({a}~={v})"),
        Expr::GreaterEq(a, v) => write!(f, "({a}>={v})"),
        Expr::LessEq(a, v) => write!(f, "({a}<={v})"),
        Expr::Present(a) => write!(f, "({a}=*)"),
        Expr::Substr(a, parts) => write!(f, "({a}={})", parts.join("*")),
    }
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    input: &'a str,
}

impl<'a> Parser<'a> {
    fn parse_expr(&mut self) -> Result<Expr, WeftError> {
        self.skip_whitespace();
        self.expect('(')?;
        self.skip_whitespace();

        let expr = match self.chars.peek().map(|&(_, c)| c) {
            Some('&') => {
                self.chars.next();
                Expr::And(self.parse_children()?)
            }
            Some('|') => {
                self.chars.next();
                Expr::Or(self.parse_children()?)
            }
            Some('!') => {
                self.chars.next();
                Expr::Not(Box::new(self.parse_expr()?))
            }
            Some(_) => self.parse_comparison()?,
            None => return Err(malformed(self.input, "unexpected end of expression")),
        };

        self.skip_whitespace();
        self.expect(')')?;
        Ok(expr)
    }

    fn parse_children(&mut self) -> Result<Vec<Expr>, WeftError> {
        let mut children = Vec::new();
        loop {
            self.skip_whitespace();
            match self.chars.peek().map(|&(_, c)| c) {
                Some('(') => children.push(self.parse_expr()?),
                _ => break,
            }
        }
        if children.is_empty() {
            return Err(malformed(self.input, "composite operator needs at least one operand"));
        }
        Ok(children)
    }

    fn parse_comparison(&mut self) -> Result<Expr, WeftError> {
        let attr = self.take_until(|c| matches!(c, '=' | '>' | '<' | '~' | '(' | ')'));
        let attr = attr.trim().to_string();
        if attr.is_empty() {
            return Err(malformed(self.input, "comparison is missing an attribute name"));
        }

        let op = match self.chars.next().map(|(_, c)| c) {
            Some('=') => '=',
            Some('>') => {
                self.expect('=')?;
                '>'
            }
            Some('<') => {
                self.expect('=')?;
                '<'
            }
            Some('~') => {
                self.expect('=')?;
                '~'
            }
            _ => return Err(malformed(self.input, "comparison is missing an operator")),
        };

        let value = self.take_until(|c| c == ')');

        match op {
            '>' => Ok(Expr::GreaterEq(attr, value)),
            '<' => Ok(Expr::LessEq(attr, value)),
            '~' => Ok(Expr::Approx(attr, value)),
            _ => {
                if value == "*" {
                    Ok(Expr::Present(attr))
                } else if value.contains('*') {
                    let parts: Vec<String> = value.split('*').map(str::to_string).collect();
                    Ok(Expr::Substr(attr, parts))
                } else {
                    Ok(Expr::Equal(attr, value))
                }
            }
        }
    }

    fn take_until(&mut self, stop: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if stop(c) {
                break;
            }
            out.push(c);
            self.chars.next();
        }
        out
    }

    fn expect(&mut self, expected: char) -> Result<(), WeftError> {
        match self.chars.next() {
            Some((_, c)) if c == expected => Ok(()),
            _ => Err(malformed(self.input, &format!("expected `{expected}`"))),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
            self.chars.next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn simple_equality() {
        let filter = Filter::parse("(vendor=acme)").unwrap();
        assert!(filter.matches(&attrs(&[("vendor", "acme")])));
        assert!(!filter.matches(&attrs(&[("vendor", "other")])));
        assert!(!filter.matches(&attrs(&[])));
    }

    #[test]
    fn conjunction_and_negation() {
        let filter = Filter::parse("(&(vendor=acme)(!(deprecated=true)))").unwrap();
        assert!(filter.matches(&attrs(&[("vendor", "acme")])));
        assert!(!filter.matches(&attrs(&[("vendor", "acme"), ("deprecated", "true")])));
    }

    #[test]
    fn disjunction() {
        let filter = Filter::parse("(|(tier=gold)(tier=silver))").unwrap();
        assert!(filter.matches(&attrs(&[("tier", "silver")])));
        assert!(!filter.matches(&attrs(&[("tier", "bronze")])));
    }

    #[test]
    fn presence() {
        let filter = Filter::parse("(vendor=*)").unwrap();
        assert!(filter.matches(&attrs(&[("vendor", "anything")])));
        assert!(!filter.matches(&attrs(&[("other", "x")])));
    }

    #[test]
    fn substring_patterns() {
        let filter = Filter::parse("(name=org.weft.*)").unwrap();
        assert!(filter.matches(&attrs(&[("name", "org.weft.http")])));
        assert!(!filter.matches(&attrs(&[("name", "com.acme.http")])));

        let filter = Filter::parse("(name=*http*)").unwrap();
        assert!(filter.matches(&attrs(&[("name", "org.weft.http.client")])));
        assert!(!filter.matches(&attrs(&[("name", "org.weft.io")])));

        let filter = Filter::parse("(name=org*weft*client)").unwrap();
        assert!(filter.matches(&attrs(&[("name", "org.weft.http.client")])));
        assert!(!filter.matches(&attrs(&[("name", "org.weft.http.server")])));
    }

    #[test]
    fn approx_ignores_case_and_whitespace() {
        let filter = Filter::parse("(vendor~=Acme Corp)").unwrap();
        assert!(filter.matches(&attrs(&[("vendor", "acmecorp")])));
        assert!(filter.matches(&attrs(&[("vendor", "ACME CORP")])));
        assert!(!filter.matches(&attrs(&[("vendor", "acme inc")])));
    }

    #[test]
    fn ordering_comparisons() {
        let filter = Filter::parse("(tier>=m)").unwrap();
        assert!(filter.matches(&attrs(&[("tier", "z")])));
        assert!(!filter.matches(&attrs(&[("tier", "a")])));
    }

    #[test]
    fn ordering_comparisons_use_version_order_for_versions() {
        let filter = Filter::parse("(version>=10.0)").unwrap();
        assert!(filter.matches(&attrs(&[("version", "10.0.0")])));
        assert!(filter.matches(&attrs(&[("version", "11.2.0")])));
        assert!(!filter.matches(&attrs(&[("version", "9.0.0")])));

        let filter = Filter::parse("(version<=2.0)").unwrap();
        assert!(filter.matches(&attrs(&[("version", "1.9.0")])));
        assert!(!filter.matches(&attrs(&[("version", "10.0.0")])));
    }

    #[test]
    fn malformed_rejected() {
        for bad in ["", "(", "(vendor=acme", "vendor=acme", "(&)", "(=x)", "(a=b)junk"] {
            assert!(
                matches!(Filter::parse(bad), Err(WeftError::MalformedConstraint { .. })),
                "expected parse failure for `{bad}`"
            );
        }
    }

    #[test]
    fn display_round_trip() {
        let text = "(&(vendor=acme)(|(tier=gold)(!(deprecated=true))))";
        let filter = Filter::parse(text).unwrap();
        assert_eq!(filter.to_string(), text);
        assert_eq!(Filter::parse(&filter.to_string()).unwrap(), filter);
    }
}
