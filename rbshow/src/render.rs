use std::cmp::max;
use std::fmt::Display;
use std::io::{self, Write};

use redblack::RedBlackTree;
use unicode_width::UnicodeWidthStr;

/// Layout of a tree dump.
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum Style {
    /// One key per line, indented by depth, suffixed with `(R)` or `(B)`.
    Indented,
    /// Aligned `key | colour | depth` columns.
    Table,
}

/// Options for rendering a tree.
#[derive(Debug)]
pub struct Options {
    style: Style,
    indent: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self { style: Style::Indented, indent: 3 }
    }
}

impl Options {
    #[must_use]
    pub const fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Spaces per level of depth for [`Style::Indented`]. The default is 3.
    #[must_use]
    pub const fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

/// Writes the tree in order followed by a blank line.
pub fn render<T: Display, W: Write>(
    tree: &RedBlackTree<T>,
    options: &Options,
    out: &mut W,
) -> io::Result<()> {
    match options.style {
        Style::Indented => {
            for e in tree.inorder() {
                let pad = " ".repeat(options.indent * e.depth());
                writeln!(out, "{pad}{} ({})", e.key(), e.color().letter())?;
            }
        }
        Style::Table => {
            let rows: Vec<_> =
                tree.inorder().map(|e| (e.key().to_string(), e.color(), e.depth())).collect();

            let (kw, dw) = rows.iter().fold((0, 0), |(kw, dw), (s, _, d)| {
                (max(kw, UnicodeWidthStr::width(s.as_str())), max(dw, d.to_string().len()))
            });

            for (s, c, d) in rows {
                let padding = " ".repeat(kw - UnicodeWidthStr::width(s.as_str()));
                writeln!(out, "{s}{padding} | {} | {d:>dw$}", c.letter())?;
            }
        }
    }

    writeln!(out)
}
