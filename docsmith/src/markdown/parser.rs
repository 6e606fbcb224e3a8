//! Line-oriented Markdown parser
//!
//! Each non-blank line is tested against the block rules in priority order:
//! heading, horizontal rule, fenced code, table, list, quote, image, and
//! finally paragraph. Every rule returns the node it built together with the
//! index of the first line it did not consume.

use super::blocks::BlockNode;
use super::filter::MetadataFilter;
use super::inline::strip_inline_styles;
use regex::Regex;
use std::sync::LazyLock;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid heading regex"));
static RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\*{3,}|-{3,}|_{3,})$").expect("valid rule regex"));
static FENCE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```\s*([\w+#.-]*)\s*$").expect("valid fence regex"));
static FENCE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```\s*$").expect("valid fence close regex"));
static TABLE_ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|(.+)\|$").expect("valid table row regex"));
static TABLE_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\|(\s*:?-+:?\s*\|)+$").expect("valid table separator regex")
});
static LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)([-*+]|\d+\.)\s+(.+)$").expect("valid list item regex")
});
static QUOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^>\s+(.+)$").expect("valid quote regex"));
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^!\[(.*?)\]\((\S*?)(?:\s+"(.*?)")?\)$"#).expect("valid image regex")
});

/// Markdown parser with an optional metadata pre-filter
#[derive(Debug, Clone, Default)]
pub struct MarkdownParser {
    filter: Option<MetadataFilter>,
}

/// A block rule's result: the node and the next unconsumed line index
type Consumed = (BlockNode, usize);

impl MarkdownParser {
    /// Parser without filtering
    pub fn new() -> Self {
        Self { filter: None }
    }

    /// Parser that runs `filter` over the lines before parsing
    pub fn with_filter(filter: MetadataFilter) -> Self {
        Self {
            filter: Some(filter),
        }
    }

    /// Parse Markdown text into block nodes in source order
    pub fn parse(&self, text: &str) -> Vec<BlockNode> {
        let raw: Vec<&str> = text.lines().collect();
        let lines = match &self.filter {
            Some(filter) => {
                let kept = filter.apply(&raw);
                if kept.len() != raw.len() {
                    log::info!("Filtered {} metadata lines", raw.len() - kept.len());
                }
                kept
            }
            None => raw,
        };

        let mut nodes = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            if lines[i].trim().is_empty() {
                i += 1;
                continue;
            }
            let (node, next) = parse_block(&lines, i);
            nodes.push(node);
            // Every rule consumes at least one line.
            i = next.max(i + 1);
        }

        log::debug!("Parsed {} block nodes", nodes.len());
        nodes
    }
}

/// Parse Markdown text without filtering
pub fn parse(text: &str) -> Vec<BlockNode> {
    MarkdownParser::new().parse(text)
}

fn parse_block(lines: &[&str], i: usize) -> Consumed {
    try_heading(lines, i)
        .or_else(|| try_rule(lines, i))
        .or_else(|| try_code(lines, i))
        .or_else(|| try_table(lines, i))
        .or_else(|| try_list(lines, i))
        .or_else(|| try_quote(lines, i))
        .or_else(|| try_image(lines, i))
        .unwrap_or_else(|| paragraph(lines, i))
}

fn try_heading(lines: &[&str], i: usize) -> Option<Consumed> {
    let caps = HEADING_RE.captures(lines[i])?;
    let level = caps[1].len();
    let text = strip_inline_styles(caps[2].trim());
    Some((BlockNode::Heading { level, text }, i + 1))
}

fn try_rule(lines: &[&str], i: usize) -> Option<Consumed> {
    RULE_RE
        .is_match(lines[i].trim())
        .then_some((BlockNode::Rule, i + 1))
}

fn try_code(lines: &[&str], i: usize) -> Option<Consumed> {
    let caps = FENCE_OPEN_RE.captures(lines[i].trim())?;
    let language = Some(caps[1].to_string()).filter(|l| !l.is_empty());

    let mut body = Vec::new();
    let mut j = i + 1;
    while j < lines.len() {
        if FENCE_CLOSE_RE.is_match(lines[j].trim()) {
            j += 1;
            break;
        }
        body.push(lines[j]);
        j += 1;
    }

    let text = body.join("\n");
    Some((BlockNode::Code { language, text }, j))
}

/// Split a `|a|b|` row into trimmed, inline-stripped cells
fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let inner = line
        .strip_prefix('|')
        .and_then(|l| l.strip_suffix('|'))
        .unwrap_or(line);
    inner
        .split('|')
        .map(|cell| strip_inline_styles(cell.trim()))
        .collect()
}

fn is_table_row(line: &str) -> bool {
    TABLE_ROW_RE.is_match(line.trim())
}

fn try_table(lines: &[&str], i: usize) -> Option<Consumed> {
    if !is_table_row(lines[i]) {
        return None;
    }
    let separator = lines.get(i + 1)?;
    if !TABLE_SEPARATOR_RE.is_match(separator.trim()) {
        return None;
    }

    let headers = split_row(lines[i]);
    let mut rows = Vec::new();
    let mut j = i + 2;
    while j < lines.len() && is_table_row(lines[j]) {
        rows.push(split_row(lines[j]));
        j += 1;
    }

    Some((BlockNode::Table { headers, rows }, j))
}

fn try_list(lines: &[&str], i: usize) -> Option<Consumed> {
    let first = LIST_RE.captures(lines[i])?;
    let ordered = first[2].starts_with(|c: char| c.is_ascii_digit());

    let mut items = Vec::new();
    let mut j = i;
    while let Some(caps) = lines.get(j).and_then(|l| LIST_RE.captures(l)) {
        items.push(strip_inline_styles(caps[3].trim()));
        j += 1;
    }

    Some((BlockNode::List { ordered, items }, j))
}

fn try_quote(lines: &[&str], i: usize) -> Option<Consumed> {
    let mut parts = Vec::new();
    let mut j = i;
    while let Some(caps) = lines.get(j).and_then(|l| QUOTE_RE.captures(l)) {
        parts.push(caps[1].to_string());
        j += 1;
    }
    if parts.is_empty() {
        return None;
    }
    Some((
        BlockNode::Quote {
            text: parts.join(" "),
        },
        j,
    ))
}

fn try_image(lines: &[&str], i: usize) -> Option<Consumed> {
    let caps = IMAGE_RE.captures(lines[i].trim())?;
    let alt = caps[1].to_string();
    let url = caps[2].to_string();
    let title = caps
        .get(3)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| alt.clone());
    Some((BlockNode::Image { alt, url, title }, i + 1))
}

/// Whether `line` would start a non-paragraph block
fn starts_block(lines: &[&str], j: usize) -> bool {
    let line = lines[j];
    HEADING_RE.is_match(line)
        || RULE_RE.is_match(line.trim())
        || FENCE_OPEN_RE.is_match(line.trim())
        || is_table_row(line)
        || LIST_RE.is_match(line)
        || QUOTE_RE.is_match(line)
        || IMAGE_RE.is_match(line.trim())
}

/// Fallback: the current line plus following lines until a blank line or a block trigger
///
/// The first line is always consumed, which is how a table header without a
/// valid separator degrades to a paragraph.
fn paragraph(lines: &[&str], i: usize) -> Consumed {
    let mut parts = vec![lines[i].trim()];
    let mut j = i + 1;
    while j < lines.len() && !lines[j].trim().is_empty() && !starts_block(lines, j) {
        parts.push(lines[j].trim());
        j += 1;
    }
    let text = strip_inline_styles(&parts.join(" "));
    (BlockNode::Paragraph { text }, j)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_order_is_preserved() {
        // Arrange
        let md = "# Title\n\nIntro **text**\nsecond line\n\n---\n\n> quoted\n> more\n";

        // Act
        let nodes = parse(md);

        // Assert
        assert_eq!(
            nodes,
            vec![
                BlockNode::Heading {
                    level: 1,
                    text: "Title".to_string()
                },
                BlockNode::Paragraph {
                    text: "Intro text second line".to_string()
                },
                BlockNode::Rule,
                BlockNode::Quote {
                    text: "quoted more".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let md = "## A\n| x | y |\n|---|:-:|\n| 1 | 2 |\n- a\n- b\n```rs\nfn main() {}\n```\n";
        assert_eq!(parse(md), parse(md));
    }

    #[test]
    fn test_short_table_row_is_kept_as_is() {
        // Arrange
        let md = "|A|B|\n|--|--|\n|1|";

        // Act
        let nodes = parse(md);

        // Assert
        assert_eq!(
            nodes,
            vec![BlockNode::Table {
                headers: vec!["A".to_string(), "B".to_string()],
                rows: vec![vec!["1".to_string()]],
            }]
        );
    }

    #[test]
    fn test_table_without_separator_becomes_paragraph() {
        // Arrange
        let md = "|A|B|\nnot a separator";

        // Act
        let nodes = parse(md);

        // Assert
        assert_eq!(
            nodes,
            vec![BlockNode::Paragraph {
                text: "|A|B| not a separator".to_string()
            }]
        );
    }

    #[test]
    fn test_list_type_follows_first_marker() {
        // Arrange
        let md = "1. a\n- b\n\n- c\n2. d";

        // Act
        let nodes = parse(md);

        // Assert
        assert_eq!(
            nodes,
            vec![
                BlockNode::List {
                    ordered: true,
                    items: vec!["a".to_string(), "b".to_string()]
                },
                BlockNode::List {
                    ordered: false,
                    items: vec!["c".to_string(), "d".to_string()]
                },
            ]
        );
    }

    #[test]
    fn test_unterminated_fence_consumes_to_end() {
        // Arrange
        let md = "```python\nprint(1)\n\n# not a heading";

        // Act
        let nodes = parse(md);

        // Assert
        assert_eq!(
            nodes,
            vec![BlockNode::Code {
                language: Some("python".to_string()),
                text: "print(1)\n\n# not a heading".to_string()
            }]
        );
    }

    #[test]
    fn test_code_without_language() {
        let nodes = parse("```\nx\n```\nafter");
        assert_eq!(
            nodes[0],
            BlockNode::Code {
                language: None,
                text: "x".to_string()
            }
        );
        assert_eq!(
            nodes[1],
            BlockNode::Paragraph {
                text: "after".to_string()
            }
        );
    }

    #[test]
    fn test_standalone_image_title_defaults_to_alt() {
        // Arrange
        let md = "![现场照片](img/site.png)\n![图](a.png \"标题\")";

        // Act
        let nodes = parse(md);

        // Assert
        assert_eq!(
            nodes,
            vec![
                BlockNode::Image {
                    alt: "现场照片".to_string(),
                    url: "img/site.png".to_string(),
                    title: "现场照片".to_string()
                },
                BlockNode::Image {
                    alt: "图".to_string(),
                    url: "a.png".to_string(),
                    title: "标题".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_paragraph_stops_at_list() {
        let nodes = parse("line one\n- item");
        assert_eq!(nodes.len(), 2);
        assert!(matches!(nodes[1], BlockNode::List { ordered: false, .. }));
    }

    #[test]
    fn test_heading_requires_space_and_max_six_hashes() {
        let nodes = parse("#tag\n####### seven");
        assert_eq!(
            nodes,
            vec![BlockNode::Paragraph {
                text: "#tag ####### seven".to_string()
            }]
        );
    }

    #[test]
    fn test_filter_runs_before_parsing() {
        // Arrange
        let parser = MarkdownParser::with_filter(MetadataFilter::default());
        let md = "# 报告\n**生成工具**: 助手\n## 数据来源\n- a\n## 结论\n完成";

        // Act
        let nodes = parser.parse(md);

        // Assert
        assert_eq!(nodes.len(), 3);
        assert!(matches!(&nodes[1], BlockNode::Heading { text, .. } if text == "结论"));
    }
}
