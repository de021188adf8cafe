//! Rich-text answers.
//!
//! Answers are stored by the remote service as HTML. Formatting is applied to
//! an explicit block/inline model parsed from that HTML and serialised back,
//! so only the supported subset of markup ever leaves this module.

mod html;
mod toolbar;

pub use html::safe_href;
pub use toolbar::{AnswerField, FormatAction, RichTextFields, Toolbar};

use itertools::Itertools;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub code: bool,
    pub link: Option<String>,
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inline {
    pub text: String,
    pub style: Style,
}

impl Inline {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::default(),
        }
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Numbered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading,
    ListItem(ListKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub content: Vec<Inline>,
}

impl Block {
    pub fn new(kind: BlockKind, content: Vec<Inline>) -> Self {
        Self { kind, content }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, vec![Inline::plain(text)])
    }

    pub fn text(&self) -> String {
        self.content.iter().map(|inline| inline.text.as_str()).collect()
    }

    fn len(&self) -> usize {
        self.content.iter().map(Inline::len).sum()
    }
}

/// What a formatting action applies to: a char range over
/// [`RichText::plain_text`], or the first occurrence of a phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Range { start: usize, end: usize },
    Phrase(String),
}

impl Selection {
    pub fn range(start: usize, end: usize) -> Self {
        Selection::Range { start, end }
    }

    pub fn phrase(phrase: impl Into<String>) -> Self {
        Selection::Phrase(phrase.into())
    }

    /// Reads a selection sent by a form: `start..end`, a single caret
    /// offset, or otherwise a phrase.
    pub fn parse(value: &str) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        if let Some((start, end)) = value.split_once("..") {
            if let (Ok(start), Ok(end)) = (start.trim().parse(), end.trim().parse()) {
                return Some(Selection::range(start, end));
            }
        }
        if let Ok(caret) = value.trim().parse() {
            return Some(Selection::range(caret, caret));
        }
        Some(Selection::phrase(value))
    }
}

#[derive(Debug, Clone, Copy)]
enum Mark {
    Bold,
    Italic,
    Underline,
    Code,
}

impl Mark {
    fn get(self, style: &Style) -> bool {
        match self {
            Mark::Bold => style.bold,
            Mark::Italic => style.italic,
            Mark::Underline => style.underline,
            Mark::Code => style.code,
        }
    }

    fn set(self, style: &mut Style, on: bool) {
        match self {
            Mark::Bold => style.bold = on,
            Mark::Italic => style.italic = on,
            Mark::Underline => style.underline = on,
            Mark::Code => style.code = on,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText {
    pub blocks: Vec<Block>,
}

impl RichText {
    pub fn from_html(html: &str) -> Self {
        html::parse(html)
    }

    pub fn to_html(&self) -> String {
        html::render(self)
    }

    /// Reduces arbitrary HTML to the supported subset.
    pub fn sanitize(html: &str) -> String {
        Self::from_html(html).to_html()
    }

    /// Text of every block, one line per block.
    pub fn plain_text(&self) -> String {
        self.blocks.iter().map(Block::text).join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|block| block.len() == 0)
    }

    fn char_len(&self) -> usize {
        self.spans().last().map_or(0, |&(_, end)| end)
    }

    /// Start and end offset of each block in the plain-text projection.
    fn spans(&self) -> Vec<(usize, usize)> {
        let mut offset = 0;
        self.blocks
            .iter()
            .map(|block| {
                let start = offset;
                let end = start + block.len();
                offset = end + 1;
                (start, end)
            })
            .collect()
    }

    /// Ordered, clamped char range of `selection`; `None` for a phrase that
    /// does not occur.
    pub fn resolve(&self, selection: &Selection) -> Option<(usize, usize)> {
        match selection {
            Selection::Range { start, end } => {
                let len = self.char_len();
                let (start, end) = if start <= end {
                    (*start, *end)
                } else {
                    (*end, *start)
                };
                Some((start.min(len), end.min(len)))
            }
            Selection::Phrase(phrase) => {
                if phrase.is_empty() {
                    return None;
                }
                let text = self.plain_text();
                let byte = text.find(phrase.as_str())?;
                let start = text[..byte].chars().count();
                Some((start, start + phrase.chars().count()))
            }
        }
    }

    /// Applies `action` to `selection`. Returns `false` when nothing changed.
    pub fn apply(&mut self, action: &FormatAction, selection: &Selection) -> bool {
        let Some((start, end)) = self.resolve(selection) else {
            return false;
        };
        match action {
            FormatAction::BulletList => {
                self.toggle_block(start, end, BlockKind::ListItem(ListKind::Bullet))
            }
            FormatAction::NumberedList => {
                self.toggle_block(start, end, BlockKind::ListItem(ListKind::Numbered))
            }
            FormatAction::Heading => self.toggle_block(start, end, BlockKind::Heading),
            _ if start == end => false,
            FormatAction::Bold => self.toggle_mark(start, end, Mark::Bold),
            FormatAction::Italic => self.toggle_mark(start, end, Mark::Italic),
            FormatAction::Underline => self.toggle_mark(start, end, Mark::Underline),
            FormatAction::Code => self.toggle_mark(start, end, Mark::Code),
            FormatAction::Link(url) => match url.as_deref().and_then(safe_href) {
                Some(href) => {
                    self.restyle(start, end, |style| style.link = Some(href.clone()));
                    true
                }
                None => false,
            },
        }
    }

    /// Removes the mark when the whole range already carries it, adds it
    /// otherwise.
    fn toggle_mark(&mut self, start: usize, end: usize, mark: Mark) -> bool {
        let on = !self.covered(start, end, |style| mark.get(style));
        self.restyle(start, end, |style| mark.set(style, on));
        true
    }

    fn covered(&self, start: usize, end: usize, pred: impl Fn(&Style) -> bool) -> bool {
        let mut any = false;
        for (block, (block_start, block_end)) in self.blocks.iter().zip(self.spans()) {
            let lo = start.clamp(block_start, block_end) - block_start;
            let hi = end.clamp(block_start, block_end) - block_start;
            let mut offset = 0;
            for inline in &block.content {
                let (s, e) = (offset, offset + inline.len());
                offset = e;
                if s == e || e <= lo || s >= hi {
                    continue;
                }
                any = true;
                if !pred(&inline.style) {
                    return false;
                }
            }
        }
        any
    }

    fn restyle(&mut self, start: usize, end: usize, f: impl Fn(&mut Style)) {
        let spans = self.spans();
        for (block, (block_start, block_end)) in self.blocks.iter_mut().zip(spans) {
            let lo = start.clamp(block_start, block_end) - block_start;
            let hi = end.clamp(block_start, block_end) - block_start;
            if lo < hi {
                let content = std::mem::take(&mut block.content);
                block.content = restyle_runs(content, lo, hi, &f);
            }
        }
    }

    /// Sets every block touched by the range to `kind`, or back to
    /// paragraphs when all of them already are.
    fn toggle_block(&mut self, start: usize, end: usize, kind: BlockKind) -> bool {
        let touched: Vec<usize> = self
            .spans()
            .into_iter()
            .enumerate()
            .filter(|&(_, (block_start, block_end))| {
                if start == end {
                    block_start <= start && start <= block_end
                } else {
                    block_start < end && start <= block_end
                }
            })
            .map(|(index, _)| index)
            .collect();
        if touched.is_empty() {
            return false;
        }
        let target = if touched.iter().all(|&i| self.blocks[i].kind == kind) {
            BlockKind::Paragraph
        } else {
            kind
        };
        for i in touched {
            self.blocks[i].kind = target;
        }
        true
    }
}

fn split_chars(text: &str, at: usize) -> (&str, &str) {
    let index = text
        .char_indices()
        .nth(at)
        .map_or(text.len(), |(index, _)| index);
    text.split_at(index)
}

fn restyle_runs(
    content: Vec<Inline>,
    lo: usize,
    hi: usize,
    f: &impl Fn(&mut Style),
) -> Vec<Inline> {
    let mut out = Vec::with_capacity(content.len() + 2);
    let mut offset = 0;
    for inline in content {
        let (s, e) = (offset, offset + inline.len());
        offset = e;
        let a = lo.clamp(s, e) - s;
        let b = hi.clamp(s, e) - s;
        if a == b {
            out.push(inline);
            continue;
        }
        let (head, rest) = split_chars(&inline.text, a);
        let (middle, tail) = split_chars(rest, b - a);
        let mut changed = inline.style.clone();
        f(&mut changed);
        out.push(Inline {
            text: head.to_owned(),
            style: inline.style.clone(),
        });
        out.push(Inline {
            text: middle.to_owned(),
            style: changed,
        });
        out.push(Inline {
            text: tail.to_owned(),
            style: inline.style.clone(),
        });
    }
    merge_runs(out)
}

/// Drops empty runs and joins neighbours with equal style.
pub(crate) fn merge_runs(runs: Vec<Inline>) -> Vec<Inline> {
    runs.into_iter()
        .filter(|inline| !inline.text.is_empty())
        .coalesce(|a, b| {
            if a.style == b.style {
                Ok(Inline {
                    text: a.text + &b.text,
                    style: a.style,
                })
            } else {
                Err((a, b))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> RichText {
        RichText::from_html(html)
    }

    #[test]
    fn bold_wraps_the_selected_range() {
        let mut text = doc("<p>Hello world</p>");
        assert!(text.apply(&FormatAction::Bold, &Selection::range(6, 11)));
        assert_eq!(text.to_html(), "<p>Hello <strong>world</strong></p>");
    }

    #[test]
    fn bold_toggles_off_when_fully_bold() {
        let mut text = doc("<p>Hello <b>world</b></p>");
        assert!(text.apply(&FormatAction::Bold, &Selection::phrase("world")));
        assert_eq!(text.to_html(), "<p>Hello world</p>");
        assert_eq!(text.blocks[0].content.len(), 1);
    }

    #[test]
    fn partially_bold_range_becomes_bold() {
        let mut text = doc("<p>ab<b>cd</b>ef</p>");
        text.apply(&FormatAction::Bold, &Selection::range(1, 5));
        assert_eq!(text.to_html(), "<p>a<strong>bcde</strong>f</p>");
    }

    #[test]
    fn collapsed_selection_changes_nothing() {
        let mut text = doc("<p>Hello</p>");
        assert!(!text.apply(&FormatAction::Italic, &Selection::range(2, 2)));
        assert!(!text.apply(&FormatAction::Bold, &Selection::phrase("absent")));
        assert_eq!(text.to_html(), "<p>Hello</p>");
    }

    #[test]
    fn code_wraps_exactly_the_selection() {
        let mut text = doc("<p>run npm install now</p>");
        text.apply(&FormatAction::Code, &Selection::phrase("npm install"));
        assert_eq!(
            text.to_html(),
            "<p>run <code style=\"background-color: #f3f4f6; padding: 2px 4px; border-radius: 3px; font-family: monospace;\">npm install</code> now</p>"
        );
    }

    #[test]
    fn link_needs_a_usable_url() {
        let mut text = doc("<p>read the docs</p>");
        assert!(!text.apply(&FormatAction::Link(None), &Selection::phrase("docs")));
        assert!(!text.apply(
            &FormatAction::Link(Some("  ".into())),
            &Selection::phrase("docs")
        ));
        assert!(!text.apply(
            &FormatAction::Link(Some("javascript:alert(1)".into())),
            &Selection::phrase("docs")
        ));
        assert!(text.apply(
            &FormatAction::Link(Some("https://docs.example".into())),
            &Selection::phrase("docs")
        ));
        assert_eq!(
            text.to_html(),
            "<p>read the <a href=\"https://docs.example\" target=\"_blank\" rel=\"noopener noreferrer\">docs</a></p>"
        );
    }

    #[test]
    fn list_action_covers_every_touched_block_and_toggles_back() {
        let mut text = doc("<p>one</p><p>two</p><p>three</p>");
        // "one\ntwo\nthree": range from inside "one" to inside "two"
        assert!(text.apply(&FormatAction::BulletList, &Selection::range(1, 5)));
        assert_eq!(text.to_html(), "<ul><li>one</li><li>two</li></ul><p>three</p>");

        text.apply(&FormatAction::BulletList, &Selection::range(0, 7));
        assert_eq!(text.to_html(), "<p>one</p><p>two</p><p>three</p>");
    }

    #[test]
    fn numbered_list_replaces_bullets() {
        let mut text = doc("<ul><li>a</li><li>b</li></ul>");
        text.apply(&FormatAction::NumberedList, &Selection::range(0, 0));
        assert_eq!(text.to_html(), "<ol><li>a</li></ol><ul><li>b</li></ul>");
    }

    #[test]
    fn heading_applies_at_the_caret() {
        let mut text = doc("<p>Title</p><p>Body</p>");
        assert!(text.apply(&FormatAction::Heading, &Selection::range(3, 3)));
        assert_eq!(text.to_html(), "<h3>Title</h3><p>Body</p>");
    }

    #[test]
    fn selection_offsets_count_characters() {
        let mut text = doc("<p>مرحبا بالعالم</p>");
        text.apply(&FormatAction::Underline, &Selection::range(0, 5));
        assert_eq!(text.to_html(), "<p><u>مرحبا</u> بالعالم</p>");
    }

    #[test]
    fn selection_parsing() {
        assert_eq!(Selection::parse("2..5"), Some(Selection::range(2, 5)));
        assert_eq!(Selection::parse("4"), Some(Selection::range(4, 4)));
        assert_eq!(Selection::parse("world"), Some(Selection::phrase("world")));
        assert_eq!(Selection::parse(""), None);
    }

    #[test]
    fn reversed_range_is_normalised() {
        let text = doc("<p>abc</p>");
        assert_eq!(text.resolve(&Selection::range(10, 1)), Some((1, 3)));
    }
}
