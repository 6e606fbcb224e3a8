//! Positional fill of a structure template with new content

use super::apply::image_placeholder;
use super::content::{ContentTree, ParagraphContent};
use super::styled::{HeadingInfo, ParagraphStyleDef, StyledDocument, StyledParagraph, StyledRun};
use super::BuildReport;
use crate::format::{ParagraphFormat, RunFormat};
use crate::structure::{heading_level, Element, StructureTemplate};

const NORMAL_STYLE: &str = "Normal";

/// Heading sizes used when the template has no style of that name
const DEFAULT_HEADING_SIZES: [(usize, f64); 2] = [(1, 16.0), (2, 14.0)];

/// Render `content` with the formatting of `template`
///
/// Content section `i` takes the heading snapshot of template section `i`;
/// subsections match the same way inside their section.
pub fn fill_template(template: &StructureTemplate, content: &ContentTree) -> BuildReport {
    let reference = template.sections();
    let mut filler = Filler::new(template);

    for (i, section) in content.sections.iter().enumerate() {
        let matched = reference.get(i);
        if matched.is_none() {
            filler.warn(format!(
                "Section {} has no counterpart in the template; using default Heading 1",
                i + 1
            ));
        }

        if let Some(title) = &section.title {
            filler.heading(title, 1, matched.map(|s| s.heading));
        }
        let snapshots = matched.map_or(&[][..], |s| s.paragraphs.as_slice());
        filler.paragraphs(&section.paragraphs, snapshots);

        for (j, sub) in section.subsections.iter().enumerate() {
            let sub_matched = matched.and_then(|s| s.subsections.get(j));
            if matched.is_some() && sub_matched.is_none() {
                filler.warn(format!(
                    "Subsection {}.{} has no counterpart in the template; using default Heading 2",
                    i + 1,
                    j + 1
                ));
            }
            if let Some(title) = &sub.title {
                filler.heading(title, 2, sub_matched.map(|s| s.heading));
            }
            let snapshots = sub_matched.map_or(&[][..], |s| s.paragraphs.as_slice());
            filler.paragraphs(&sub.paragraphs, snapshots);
        }
    }

    log::info!(
        "Filled {} sections into template from {}",
        content.sections.len(),
        template.metadata.source_document
    );
    filler.finish()
}

struct Filler<'a> {
    template: &'a StructureTemplate,
    document: StyledDocument,
    warnings: Vec<String>,
    processed: usize,
}

impl<'a> Filler<'a> {
    fn new(template: &'a StructureTemplate) -> Self {
        let mut filler = Self {
            template,
            document: StyledDocument::new(template.page_settings),
            warnings: Vec::new(),
            processed: 0,
        };
        for name in template.styles.keys() {
            filler.register(name);
        }
        filler
    }

    fn finish(self) -> BuildReport {
        BuildReport {
            document: self.document,
            warnings: self.warnings,
            nodes_processed: self.processed,
        }
    }

    fn warn(&mut self, warning: String) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Document style id for a style display name
    fn style_id(&self, name: &str) -> String {
        self.template
            .style(name)
            .map(|s| s.id.clone())
            .unwrap_or_else(|| name.replace(' ', ""))
    }

    /// Add a style to the output style sheet, from the template when it has one
    fn register(&mut self, name: &str) {
        let level = heading_level(name);
        let style = match self.template.style(name) {
            Some(def) => ParagraphStyleDef {
                id: def.id.clone(),
                name: def.name.clone(),
                paragraph: def.paragraph_format.clone(),
                run: def.font.clone(),
                outline_level: level,
            },
            None => {
                let size = DEFAULT_HEADING_SIZES
                    .iter()
                    .find(|(l, _)| Some(*l) == level)
                    .map(|(_, size)| *size);
                ParagraphStyleDef {
                    id: self.style_id(name),
                    name: name.to_string(),
                    paragraph: ParagraphFormat::default(),
                    run: RunFormat {
                        font_size: size,
                        bold: level.map(|_| true),
                        ..Default::default()
                    },
                    outline_level: level,
                }
            }
        };
        self.document.register_style(style);
    }

    fn heading(&mut self, text: &str, level: usize, snapshot: Option<&Element>) {
        let style = snapshot.map_or_else(|| format!("Heading {level}"), |e| e.style.clone());
        self.register(&style);
        let style_id = self.style_id(&style);

        self.document.push_paragraph(StyledParagraph {
            style_id: Some(style_id),
            heading: Some(HeadingInfo {
                level,
                outline_level: level,
            }),
            format: snapshot.map(|e| e.format.clone()).unwrap_or_default(),
            runs: vec![StyledRun::new(
                text,
                snapshot.and_then(|e| e.run_format.clone()).unwrap_or_default(),
            )],
        });
    }

    /// Paragraph `k` takes the formatting of template paragraph `k` when there is one
    fn paragraphs(&mut self, paragraphs: &[ParagraphContent], snapshots: &[&Element]) {
        for (k, content) in paragraphs.iter().enumerate() {
            self.processed += 1;
            self.paragraph(content, snapshots.get(k).copied());
        }
    }

    fn paragraph(&mut self, content: &ParagraphContent, snapshot: Option<&Element>) {
        let snapshot_format = snapshot.map(|e| e.format.clone()).unwrap_or_default();
        let snapshot_run = snapshot
            .and_then(|e| e.run_format.clone())
            .unwrap_or_default();

        let (text, style, format, run) = match content {
            ParagraphContent::Text(text) => {
                (text, NORMAL_STYLE.to_string(), snapshot_format, snapshot_run)
            }
            ParagraphContent::Styled {
                text,
                style,
                format,
                run_format,
            } => {
                let style = match style {
                    Some(name) if name == NORMAL_STYLE || self.template.style(name).is_some() => {
                        name.clone()
                    }
                    Some(name) => {
                        self.warn(format!(
                            "Style '{name}' is not defined in the template; using {NORMAL_STYLE}"
                        ));
                        NORMAL_STYLE.to_string()
                    }
                    None => snapshot.map_or_else(|| NORMAL_STYLE.to_string(), |e| e.style.clone()),
                };
                let format = format.clone().unwrap_or_default().or(&snapshot_format);
                let run = run_format.clone().unwrap_or_default().or(&snapshot_run);
                (text, style, format, run)
            }
            ParagraphContent::Image { image, alt } => {
                self.image(image, alt.as_deref());
                return;
            }
        };

        self.register(&style);
        let style_id = self.style_id(&style);
        self.document.push_paragraph(StyledParagraph {
            style_id: Some(style_id),
            heading: None,
            format,
            runs: vec![StyledRun::new(text.as_str(), run)],
        });
    }

    fn image(&mut self, image: &str, alt: Option<&str>) {
        match image_placeholder(alt.unwrap_or(image), image) {
            Ok(paragraph) => {
                self.document.push_paragraph(paragraph);
                self.warn(format!(
                    "Image '{image}' rendered as a placeholder; images are not embedded"
                ));
            }
            Err(e) => self.warn(format!("Image '{image}' skipped: {e}")),
        }
    }
}
