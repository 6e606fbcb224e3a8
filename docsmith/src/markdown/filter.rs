//! Generation-metadata filter
//!
//! Auto-generated reports tend to carry statistics banners, source
//! attribution lines and whole "how this report was produced" sections.
//! The filter removes them as a pre-pass over the raw lines, before parsing.

use regex::Regex;
use std::sync::LazyLock;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid heading regex"));

/// Line patterns removed by default
pub const DEFAULT_LINE_PATTERNS: &[&str] = &[
    r"\*\*统计\*\*[:：].*?成功\s*\d+.*?失败\s*\d+",
    r"文档读取情况[:：].*?成功.*?失败",
    r"\*\*来源\*\*[:：].*?claude/CLAUDE-construction\.md",
    r"\*\*来源\*\*[:：].*?\(.*?个章节.*?\)",
    r"\*\*数据来源\*\*[:：]",
    r"##\s*附录[:：]\s*参考文档列表$",
    r"\*\*数据准确性\*\*[:：].*本报告所有数据均来自原始文档",
    r"\*\*信息完整性\*\*[:：]",
    r"\*\*使用建议\*\*[:：]",
    r"\*\*生成工具\*\*[:：]",
    r"路径[:：]\s*/Volumes/",
    r"提取内容[:：].*?段落.*?表格",
];

/// Section titles removed with all their content by default
pub const DEFAULT_SECTIONS: &[&str] = &["文档读取情况", "报告质量说明", "数据来源"];

/// Line and section filter applied before Markdown parsing
#[derive(Debug, Clone)]
pub struct MetadataFilter {
    line_patterns: Vec<Regex>,
    sections: Vec<String>,
}

impl MetadataFilter {
    /// Build a filter from line patterns and section titles
    ///
    /// Patterns are anchored at the start of the trimmed line.
    pub fn new<S: AsRef<str>>(line_patterns: &[S], sections: &[S]) -> Result<Self, regex::Error> {
        let line_patterns = line_patterns
            .iter()
            .map(|p| Regex::new(&format!("^(?:{})", p.as_ref())))
            .collect::<Result<Vec<_>, _>>()?;
        let sections = sections
            .iter()
            .map(|s| s.as_ref().trim().to_string())
            .collect();
        Ok(Self {
            line_patterns,
            sections,
        })
    }

    /// Filter with no rules; passes every line through
    pub fn empty() -> Self {
        Self {
            line_patterns: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// True when a trimmed line matches one of the line patterns
    pub fn is_metadata_line(&self, line: &str) -> bool {
        let trimmed = line.trim();
        self.line_patterns.iter().any(|re| re.is_match(trimmed))
    }

    /// If `line` is a heading naming a removable section, return its level
    fn removable_section_level(&self, line: &str) -> Option<usize> {
        let caps = HEADING_RE.captures(line.trim_end())?;
        let level = caps[1].len();
        let title = caps[2]
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .trim();
        self.sections
            .iter()
            .any(|s| s == title)
            .then_some(level)
    }

    /// Apply the filter, returning the surviving lines in order
    ///
    /// Lines inside fenced code blocks are never matched; they are dropped
    /// only as part of a removed section.
    pub fn apply<'a>(&self, lines: &[&'a str]) -> Vec<&'a str> {
        let mut kept = Vec::with_capacity(lines.len());
        let mut skipping: Option<usize> = None;
        let mut in_fence = false;

        for &line in lines {
            let fence = line.trim_start().starts_with("```");
            if fence || in_fence {
                in_fence ^= fence;
                if skipping.is_none() {
                    kept.push(line);
                }
                continue;
            }
            if let Some(caps) = HEADING_RE.captures(line.trim_end()) {
                let level = caps[1].len();
                if let Some(removed) = self.removable_section_level(line) {
                    log::debug!("Removing generated section: {}", line.trim());
                    skipping = Some(removed);
                    continue;
                }
                if skipping.is_some_and(|removed| level <= removed) {
                    skipping = None;
                }
            }
            if skipping.is_some() {
                continue;
            }
            if self.is_metadata_line(line) {
                log::debug!("Removing metadata line: {}", line.trim());
                continue;
            }
            kept.push(line);
        }

        kept
    }
}

impl Default for MetadataFilter {
    /// Filter with the built-in report conventions
    fn default() -> Self {
        Self::new(DEFAULT_LINE_PATTERNS, DEFAULT_SECTIONS)
            .expect("built-in filter patterns are valid")
    }
}
