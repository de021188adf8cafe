use reqwest::Url;

use super::{merge_runs, Block, BlockKind, Inline, ListKind, RichText, Style};

const CODE_STYLE: &str =
    "background-color: #f3f4f6; padding: 2px 4px; border-radius: 3px; font-family: monospace;";

/// Returns the trimmed URL when it is usable as a link target: absolute
/// `http`, `https` or `mailto` URLs and relative references.
pub fn safe_href(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() || url.chars().any(char::is_control) {
        return None;
    }
    if !has_scheme_prefix(url) {
        return Some(url.to_owned());
    }
    let parsed = Url::parse(url).ok()?;
    matches!(parsed.scheme(), "http" | "https" | "mailto").then(|| url.to_owned())
}

/// Whether a colon appears before the first path, query or fragment delimiter.
fn has_scheme_prefix(url: &str) -> bool {
    let head = url.split(['/', '?', '#']).next().unwrap_or_default();
    head.contains(':')
}

pub(super) fn parse(input: &str) -> RichText {
    if !input.contains('<') {
        return plain(input);
    }
    let mut parser = Parser::default();
    let mut rest = input;
    while !rest.is_empty() {
        match rest.find('<') {
            Some(0) => {
                let starts_tag = rest[1..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');
                match rest.find('>') {
                    Some(end) if starts_tag => {
                        parser.tag(&rest[1..end]);
                        rest = &rest[end + 1..];
                    }
                    _ => {
                        parser.text("<");
                        rest = &rest[1..];
                    }
                }
            }
            Some(next) => {
                parser.text(&rest[..next]);
                rest = &rest[next..];
            }
            None => {
                parser.text(rest);
                rest = "";
            }
        }
    }
    parser.finish()
}

/// Text without markup: one paragraph per non-blank line.
fn plain(input: &str) -> RichText {
    let blocks = input
        .lines()
        .map(|line| decode_entities(line.trim()))
        .filter(|line| !line.is_empty())
        .map(Block::paragraph)
        .collect();
    RichText { blocks }
}

#[derive(Default)]
struct Parser {
    blocks: Vec<Block>,
    current: Option<Block>,
    lists: Vec<ListKind>,
    bold: usize,
    italic: usize,
    underline: usize,
    code: usize,
    links: Vec<Option<String>>,
    skip: usize,
}

fn nest(depth: &mut usize, closing: bool) {
    if closing {
        *depth = depth.saturating_sub(1);
    } else {
        *depth += 1;
    }
}

impl Parser {
    fn tag(&mut self, raw: &str) {
        let raw = raw.trim();
        if raw.starts_with('!') {
            return;
        }
        let (closing, body) = match raw.strip_prefix('/') {
            Some(body) => (true, body),
            None => (false, raw),
        };
        let body = body.trim_end_matches('/').trim();
        let name_end = body.find(char::is_whitespace).unwrap_or(body.len());
        let name = body[..name_end].to_ascii_lowercase();
        let attrs = &body[name_end..];

        if matches!(name.as_str(), "script" | "style") {
            nest(&mut self.skip, closing);
            return;
        }
        if self.skip > 0 {
            return;
        }

        match (name.as_str(), closing) {
            ("p" | "div" | "blockquote" | "pre", false) => self.open_block(BlockKind::Paragraph),
            ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", false) => self.open_block(BlockKind::Heading),
            ("li", false) => {
                let kind = self.lists.last().copied().unwrap_or(ListKind::Bullet);
                self.open_block(BlockKind::ListItem(kind));
            }
            (
                "p" | "div" | "blockquote" | "pre" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li",
                true,
            ) => self.close_block(),
            ("ul", false) => {
                self.close_block();
                self.lists.push(ListKind::Bullet);
            }
            ("ol", false) => {
                self.close_block();
                self.lists.push(ListKind::Numbered);
            }
            ("ul" | "ol", true) => {
                self.close_block();
                self.lists.pop();
            }
            ("br", _) => self.line_break(),
            ("b" | "strong", closing) => nest(&mut self.bold, closing),
            ("i" | "em", closing) => nest(&mut self.italic, closing),
            ("u", closing) => nest(&mut self.underline, closing),
            ("code", closing) => nest(&mut self.code, closing),
            ("a", false) => {
                let href =
                    attribute(attrs, "href").and_then(|href| safe_href(&decode_entities(&href)));
                self.links.push(href);
            }
            ("a", true) => {
                self.links.pop();
            }
            _ => {}
        }
    }

    fn text(&mut self, raw: &str) {
        if self.skip > 0 {
            return;
        }
        let decoded: String = decode_entities(raw)
            .chars()
            .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
            .collect();
        if self.current.is_none() {
            if decoded.trim().is_empty() {
                return;
            }
            self.current = Some(Block::new(BlockKind::Paragraph, Vec::new()));
        }
        let style = self.style();
        if let Some(block) = self.current.as_mut() {
            let text = if block.content.is_empty() {
                decoded.trim_start().to_owned()
            } else {
                decoded
            };
            block.content.push(Inline { text, style });
        }
    }

    fn style(&self) -> Style {
        Style {
            bold: self.bold > 0,
            italic: self.italic > 0,
            underline: self.underline > 0,
            code: self.code > 0,
            link: self.links.last().cloned().flatten(),
        }
    }

    fn open_block(&mut self, kind: BlockKind) {
        self.close_block();
        self.current = Some(Block::new(kind, Vec::new()));
    }

    fn close_block(&mut self) {
        let Some(mut block) = self.current.take() else {
            return;
        };
        if let Some(last) = block.content.last_mut() {
            let trimmed = last.text.trim_end().len();
            last.text.truncate(trimmed);
        }
        block.content = merge_runs(block.content);
        if !block.content.is_empty() {
            self.blocks.push(block);
        }
    }

    fn line_break(&mut self) {
        let kind = self
            .current
            .as_ref()
            .map_or(BlockKind::Paragraph, |block| block.kind);
        self.close_block();
        self.current = Some(Block::new(kind, Vec::new()));
    }

    fn finish(mut self) -> RichText {
        self.close_block();
        RichText {
            blocks: self.blocks,
        }
    }
}

/// Value of attribute `name` in the attribute part of a start tag.
fn attribute(attrs: &str, name: &str) -> Option<String> {
    let mut rest = attrs;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return None;
        }
        let key_end = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let key = &rest[..key_end];
        rest = rest[key_end..].trim_start();
        let value = match rest.strip_prefix('=') {
            Some(after) => {
                let after = after.trim_start();
                let (value, remaining) = match after.chars().next() {
                    Some(quote @ ('"' | '\'')) => {
                        let body = &after[1..];
                        match body.find(quote) {
                            Some(end) => (&body[..end], &body[end + 1..]),
                            None => (body, ""),
                        }
                    }
                    _ => {
                        let end = after.find(char::is_whitespace).unwrap_or(after.len());
                        (&after[..end], &after[end..])
                    }
                };
                rest = remaining;
                Some(value)
            }
            None => None,
        };
        if key.eq_ignore_ascii_case(name) {
            return value.map(str::to_owned);
        }
    }
}

fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_owned();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest[1..]
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&rest[1..1 + end]).map(|c| (c, end + 2)));
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn list_tags(kind: ListKind) -> (&'static str, &'static str) {
    match kind {
        ListKind::Bullet => ("<ul>", "</ul>"),
        ListKind::Numbered => ("<ol>", "</ol>"),
    }
}

pub(super) fn render(doc: &RichText) -> String {
    let mut out = String::new();
    let mut open_list: Option<ListKind> = None;
    for block in &doc.blocks {
        let list = match block.kind {
            BlockKind::ListItem(kind) => Some(kind),
            _ => None,
        };
        if open_list != list {
            if let Some(kind) = open_list {
                out.push_str(list_tags(kind).1);
            }
            if let Some(kind) = list {
                out.push_str(list_tags(kind).0);
            }
            open_list = list;
        }
        let tag = match block.kind {
            BlockKind::Paragraph => "p",
            BlockKind::Heading => "h3",
            BlockKind::ListItem(_) => "li",
        };
        out.push_str(&format!("<{tag}>"));
        for inline in &block.content {
            render_inline(&mut out, inline);
        }
        out.push_str(&format!("</{tag}>"));
    }
    if let Some(kind) = open_list {
        out.push_str(list_tags(kind).1);
    }
    out
}

fn render_inline(out: &mut String, inline: &Inline) {
    let style = &inline.style;
    if let Some(href) = &style.link {
        out.push_str(&format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">",
            escape(href)
        ));
    }
    if style.bold {
        out.push_str("<strong>");
    }
    if style.italic {
        out.push_str("<em>");
    }
    if style.underline {
        out.push_str("<u>");
    }
    if style.code {
        out.push_str(&format!("<code style=\"{CODE_STYLE}\">"));
    }
    out.push_str(&escape(&inline.text));
    if style.code {
        out.push_str("</code>");
    }
    if style.underline {
        out.push_str("</u>");
    }
    if style.italic {
        out.push_str("</em>");
    }
    if style.bold {
        out.push_str("</strong>");
    }
    if style.link.is_some() {
        out.push_str("</a>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_markup_survives() {
        let html = "<h3>Steps</h3><ol><li>Open <em>Figma</em></li><li>Draw</li></ol><p>Done &amp; dusted</p>";
        assert_eq!(RichText::sanitize(html), html);
    }

    #[test]
    fn unknown_and_unsafe_markup_is_dropped() {
        let html = r#"<p onclick="steal()">Hi<script>alert(1)</script> there</p><img src=x onerror=y><style>p{}</style>"#;
        assert_eq!(RichText::sanitize(html), "<p>Hi there</p>");

        let html = r#"<p><a href="javascript:alert(1)">click</a></p>"#;
        assert_eq!(RichText::sanitize(html), "<p>click</p>");

        for href in [
            "java\tscript:alert(1)",
            "java\nscript:alert(1)",
            "java&#9;script:alert(1)",
            "java&#x0A;script:alert(1)",
            "JaVaScRiPt:alert(1)",
            "data:text/html,x",
        ] {
            let html = format!(r#"<p><a href="{href}">click</a></p>"#);
            assert_eq!(RichText::sanitize(&html), "<p>click</p>", "{href}");
        }
    }

    #[test]
    fn only_web_and_mail_links_are_kept() {
        assert_eq!(safe_href(" https://figma.com ").as_deref(), Some("https://figma.com"));
        assert_eq!(
            safe_href("mailto:hi@learn2ux.test").as_deref(),
            Some("mailto:hi@learn2ux.test")
        );
        assert_eq!(safe_href("/en/tools?open=1").as_deref(), Some("/en/tools?open=1"));
        assert_eq!(safe_href("java\nscript:alert(1)"), None);
        assert_eq!(safe_href("ftp://files.test/a"), None);
        assert_eq!(safe_href("vbscript:msgbox"), None);
        assert_eq!(safe_href(""), None);
    }

    #[test]
    fn text_is_escaped() {
        let doc = RichText {
            blocks: vec![Block::paragraph("<b>1 < 2</b>")],
        };
        assert_eq!(doc.to_html(), "<p>&lt;b&gt;1 &lt; 2&lt;/b&gt;</p>");
    }

    #[test]
    fn plain_answers_become_paragraphs() {
        let doc = RichText::from_html("First line\n\n  Second &amp; last ");
        assert_eq!(doc.plain_text(), "First line\nSecond & last");
        assert_eq!(doc.to_html(), "<p>First line</p><p>Second &amp; last</p>");
    }

    #[test]
    fn loose_text_and_breaks_form_blocks() {
        let doc = RichText::from_html("Intro<br>more<div>box</div>\n  <ul>\n<li>x</li>\n</ul>");
        assert_eq!(doc.plain_text(), "Intro\nmore\nbox\nx");
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        let doc = RichText::from_html("<p>1 < 2 and 3 > 2</p>");
        assert_eq!(doc.plain_text(), "1 < 2 and 3 > 2");
    }

    #[test]
    fn attributes_in_any_quoting() {
        assert_eq!(attribute(r#" href="a b" id=x"#, "href").as_deref(), Some("a b"));
        assert_eq!(attribute(" id=x href='y'", "HREF").as_deref(), Some("y"));
        assert_eq!(attribute(" disabled href=z", "href").as_deref(), Some("z"));
        assert_eq!(attribute(" title=t", "href"), None);
    }

    #[test]
    fn numeric_entities() {
        assert_eq!(decode_entities("&#1605;&#x631;"), "مر");
        assert_eq!(decode_entities("fish & chips &bogus;"), "fish & chips &bogus;");
    }
}
