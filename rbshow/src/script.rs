use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

use log::{debug, info, warn};
use redblack::{Key, RedBlackTree};

use crate::error::Error;
use crate::render::{Options, render};

#[derive(Debug, PartialEq, Eq)]
pub enum Op<K> {
    Insert(K),
    Delete(K),
    Print,
}

// An operation along with the 1-based line it came from.
#[derive(Debug, PartialEq, Eq)]
pub struct Line<K> {
    pub number: usize,
    pub op: Op<K>,
}

fn parse_line<K>(line: &str) -> Result<Option<Op<K>>, String>
where
    K: FromStr,
    K::Err: Display,
{
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    if line == "print" {
        return Ok(Some(Op::Print));
    }

    let (insert, key) = if let Some(rest) = line.strip_prefix('+') {
        (true, rest)
    } else if let Some(rest) = line.strip_prefix('-') {
        (false, rest)
    } else {
        match line.split_once(char::is_whitespace) {
            Some(("insert", rest)) => (true, rest),
            Some(("delete", rest)) => (false, rest),
            _ => return Err(format!("unrecognised operation `{line}`")),
        }
    };

    let key = key.trim();
    if key.is_empty() {
        return Err("missing key".to_owned());
    }

    let key = key.parse::<K>().map_err(|e| format!("invalid key `{key}`: {e}"))?;
    Ok(Some(if insert { Op::Insert(key) } else { Op::Delete(key) }))
}

/// Reads every operation from `input`, stopping at the first line that can't be parsed.
pub fn parse<K, R>(input: R) -> Result<Vec<Line<K>>, Error>
where
    K: FromStr,
    K::Err: Display,
    R: BufRead,
{
    let mut ops = Vec::new();

    for (i, line) in input.lines().enumerate() {
        let number = i + 1;
        match parse_line(&line?) {
            Ok(Some(op)) => ops.push(Line { number, op }),
            Ok(None) => {}
            Err(message) => return Err(Error::Parse { line: number, message }),
        }
    }

    Ok(ops)
}

/// Parses and applies a whole script, dumping the tree at every `print` and once at the end.
///
/// Inserting a key that is already present or deleting one that isn't only logs a warning.
pub fn run<K, R, W>(input: R, options: &Options, out: &mut W) -> Result<RedBlackTree<K>, Error>
where
    K: Key + FromStr + Display,
    K::Err: Display,
    R: BufRead,
    W: Write,
{
    let ops = parse::<K, _>(input)?;
    info!("Applying {} operations", ops.len());

    let mut tree = RedBlackTree::new();

    for Line { number, op } in ops {
        match op {
            Op::Insert(k) => {
                debug!("line {number}: insert {k}");
                if tree.contains(&k) {
                    warn!("line {number}: {k} is already present");
                } else {
                    tree.insert(k);
                }
            }
            Op::Delete(k) => {
                debug!("line {number}: delete {k}");
                if tree.remove(&k).is_none() {
                    warn!("line {number}: {k} is not present");
                }
            }
            Op::Print => render(&tree, options, out)?,
        }
    }

    render(&tree, options, out)?;
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{Line, Op, parse, run};
    use crate::error::Error;
    use crate::render::Options;

    #[test]
    fn parse_forms() {
        let script = "# comment\n\n+5\ninsert 7\n  -5  \ndelete   7\nprint\n+-3\n";
        let ops = parse::<i64, _>(Cursor::new(script)).unwrap();

        assert_eq!(ops, [
            Line { number: 3, op: Op::Insert(5) },
            Line { number: 4, op: Op::Insert(7) },
            Line { number: 5, op: Op::Delete(5) },
            Line { number: 6, op: Op::Delete(7) },
            Line { number: 7, op: Op::Print },
            Line { number: 8, op: Op::Insert(-3) },
        ]);
    }

    #[test]
    fn parse_strings() {
        let ops = parse::<String, _>(Cursor::new("insert hello world\n-abc")).unwrap();

        assert_eq!(ops, [
            Line { number: 1, op: Op::Insert("hello world".to_owned()) },
            Line { number: 2, op: Op::Delete("abc".to_owned()) },
        ]);
    }

    #[test]
    fn parse_errors() {
        match parse::<i64, _>(Cursor::new("+1\n+2\nfrobnicate 3\n")) {
            Err(Error::Parse { line, message }) => {
                assert_eq!(line, 3);
                assert_eq!(message, "unrecognised operation `frobnicate 3`");
            }
            other => panic!("unexpected {other:?}"),
        }

        match parse::<i64, _>(Cursor::new("+x")) {
            Err(Error::Parse { line: 1, message }) => assert!(message.starts_with("invalid key `x`")),
            other => panic!("unexpected {other:?}"),
        }

        match parse::<i64, _>(Cursor::new("\n\ndelete\n")) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected {other:?}"),
        }

        let e = parse::<i64, _>(Cursor::new("+")).unwrap_err();
        assert_eq!(e.to_string(), "line 1: missing key");
    }

    #[test]
    fn run_prints_each_dump() {
        let mut out = Vec::new();
        let tree = run::<i64, _, _>(
            Cursor::new("+5\n+2\n+7\nprint\n-5\n"),
            &Options::default(),
            &mut out,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "   2 (R)\n5 (B)\n   7 (R)\n\n   2 (R)\n7 (B)\n\n"
        );
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [2, 7]);
    }

    #[test]
    fn run_tolerates_duplicates_and_misses() {
        let mut out = Vec::new();
        let tree = run::<String, _, _>(
            Cursor::new("+b\n+a\n+b\n-zzz\n-a\n-a\n"),
            &Options::default(),
            &mut out,
        )
        .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "b (B)\n\n");
        assert!(tree.contains("b"));
    }

    #[test]
    fn run_rejects_bad_script_before_output() {
        let mut out = Vec::new();
        let r = run::<i64, _, _>(Cursor::new("+1\nprint\n+nope\n"), &Options::default(), &mut out);

        assert!(matches!(r, Err(Error::Parse { line: 3, .. })));
        assert!(out.is_empty());
    }
}
