//! Document operations exposed by the CLI
//!
//! Each operation runs its stages in order (validate, read, build, write)
//! and returns a [`ToolResponse`]. Errors abort the operation; problems with
//! individual blocks or sections are carried as warnings on the response.

use crate::builder::{build_markdown, fill_template, BuildReport, ContentTree};
use crate::config::{AppConfig, ProjectInfo};
use crate::docx_writer::write_docx;
use crate::error::Result;
use crate::input::{read_text, validate_input, DOCX_EXTENSIONS, JSON_EXTENSIONS, MARKDOWN_EXTENSIONS};
use crate::output::{prepare_output, PendingOutput};
use crate::reader::read_docx;
use crate::response::ToolResponse;
use crate::structure::{extract, ExtractOptions, Extraction, StructureTemplate};
use crate::styles::StyleRegistry;
use itertools::Itertools;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Style registry for `config`: built-ins plus the configured template directory
pub fn load_registry(config: &AppConfig) -> Result<StyleRegistry> {
    match &config.templates_dir {
        Some(dir) => StyleRegistry::with_directory(dir),
        None => StyleRegistry::builtin(),
    }
}

/// Inputs of [`generate_word_report`]
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Style template name; the configured default when `None`
    pub template: Option<String>,
    /// Overrides for the configured project information
    pub project: ProjectInfo,
    /// Skip the metadata filter
    pub no_filter: bool,
}

/// Markdown file to styled Word report
pub fn generate_word_report(
    registry: &StyleRegistry,
    config: &AppConfig,
    request: &GenerateRequest,
) -> Result<ToolResponse> {
    let name = request
        .template
        .as_deref()
        .unwrap_or(&config.generate.default_template);
    let template = registry.get_template(name)?;

    let text = read_text(&request.input, MARKDOWN_EXTENSIONS)?;
    let mut pending = prepare_output(&request.output)?;

    log::info!("Stage 1: Parsing {}", request.input.display());
    let nodes = config.markdown_parser(request.no_filter)?.parse(&text);

    log::info!("Stage 2: Building with template '{}'", template.name);
    let project = ProjectInfo {
        project_name: request
            .project
            .project_name
            .clone()
            .or_else(|| config.project.project_name.clone()),
        report_type: request
            .project
            .report_type
            .clone()
            .or_else(|| config.project.report_type.clone()),
    };
    let report = build_markdown(&nodes, template, &config.decorations(&project));

    log::info!("Stage 3: Writing {}", request.output.display());
    write_docx(&report.document, pending.file())?;
    let size = pending.commit()?;

    let details = json!({
        "template_used": template.name,
        "template_display_name": template.display_name,
        "sections_processed": report.nodes_processed,
        "elements_written": report.document.elements.len(),
        "headings": report.document.headings().count(),
    });
    Ok(ToolResponse::written("generate_word_report", &request.output, size, details)
        .with_warnings(report.warnings))
}

/// `{stem}{suffix}` next to `path`, or inside `dir` when given
fn derived_path(path: &Path, dir: Option<&Path>, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let stem = stem.strip_suffix("_template").unwrap_or(stem);
    let dir = dir
        .map(Path::to_path_buf)
        .or_else(|| path.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{stem}{suffix}"))
}

fn read_reference(input: &Path, options: &ExtractOptions) -> Result<Extraction> {
    log::info!("Stage 1: Reading {}", input.display());
    let document = read_docx(input)?;
    let source_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    log::info!("Stage 2: Extracting structure");
    Ok(extract(&document, &source_name, options))
}

fn structure_details(template: &StructureTemplate) -> serde_json::Value {
    json!({
        "source_document": template.metadata.source_document,
        "statistics": template.statistics,
        "section_titles": template
            .sections()
            .iter()
            .map(|s| s.heading.text.clone())
            .collect::<Vec<_>>(),
    })
}

/// Reference `.docx` to a structure template descriptor
///
/// Without `output` the descriptor is written as `{stem}_template.json`
/// next to the input.
pub fn extract_document_structure(
    input: &Path,
    output: Option<&Path>,
    options: &ExtractOptions,
) -> Result<ToolResponse> {
    validate_input(input, DOCX_EXTENSIONS)?;
    let output = output.map_or_else(|| derived_path(input, None, "_template.json"), Path::to_path_buf);
    let mut pending = prepare_output(&output)?;

    let Extraction { template, warnings } = read_reference(input, options)?;
    pending.write_json(&template)?;
    let size = pending.commit()?;

    Ok(
        ToolResponse::written("extract_document_structure", &output, size, structure_details(&template))
            .with_warnings(warnings),
    )
}

/// Fill `template` and write the document into `pending` without committing it
fn write_filled(
    template: &StructureTemplate,
    content: &ContentTree,
    pending: &mut PendingOutput,
) -> Result<BuildReport> {
    let report = fill_template(template, content);
    write_docx(&report.document, pending.file())?;
    Ok(report)
}

/// Structure template + content descriptor to a `.docx`
pub fn fill_template_files(template: &Path, content: &Path, output: &Path) -> Result<ToolResponse> {
    validate_input(template, JSON_EXTENSIONS)?;
    validate_input(content, JSON_EXTENSIONS)?;
    let mut pending = prepare_output(output)?;
    let structure = StructureTemplate::load(template)?;
    let tree = ContentTree::load(content)?;

    log::info!(
        "Filling {} content sections into {}",
        tree.sections.len(),
        template.display()
    );
    let report = write_filled(&structure, &tree, &mut pending)?;
    let size = pending.commit()?;

    let details = json!({
        "template_file": template,
        "content_file": content,
        "sections_filled": tree.sections.len(),
        "paragraphs_filled": report.nodes_processed,
    });
    Ok(ToolResponse::written("fill_template", output, size, details).with_warnings(report.warnings))
}

/// Structure template to an editable content descriptor
pub fn skeleton(template: &Path, output: Option<&Path>) -> Result<ToolResponse> {
    validate_input(template, JSON_EXTENSIONS)?;
    let output = output.map_or_else(|| derived_path(template, None, "_content.json"), Path::to_path_buf);
    let mut pending = prepare_output(&output)?;

    let structure = StructureTemplate::load(template)?;
    let tree = ContentTree::skeleton(&structure);
    pending.write_json(&tree)?;
    let size = pending.commit()?;

    let details = json!({
        "sections": tree.sections.len(),
        "paragraphs": tree.paragraph_count(),
    });
    Ok(ToolResponse::written("skeleton", &output, size, details))
}

/// Inputs of [`clone_format`]
#[derive(Debug, Clone, Default)]
pub struct CloneRequest {
    pub reference: PathBuf,
    pub output_dir: PathBuf,
    /// Stop after writing the structure template
    pub template_only: bool,
    /// Content to fill; a skeleton of the reference when `None`
    pub content: Option<PathBuf>,
    pub options: ExtractOptions,
}

/// Extract, derive content and fill in one run
///
/// Writes `{stem}_template.json`, `{stem}_content.json` (when no content is
/// supplied) and `{stem}_clone.docx` into the output directory. Every
/// destination is prepared before the reference is read, and nothing is
/// committed until all files are fully written.
pub fn clone_format(request: &CloneRequest) -> Result<ToolResponse> {
    validate_input(&request.reference, DOCX_EXTENSIONS)?;
    if let Some(path) = &request.content {
        validate_input(path, JSON_EXTENSIONS)?;
    }
    let dir = Some(request.output_dir.as_path());

    let template_file = derived_path(&request.reference, dir, "_template.json");
    let mut template_out = prepare_output(&template_file)?;
    let fill_outputs = if request.template_only {
        None
    } else {
        let skeleton_out = match &request.content {
            Some(_) => None,
            None => Some(prepare_output(derived_path(
                &request.reference,
                dir,
                "_content.json",
            ))?),
        };
        let docx_out = prepare_output(derived_path(&request.reference, dir, "_clone.docx"))?;
        Some((skeleton_out, docx_out))
    };

    let Extraction {
        template,
        mut warnings,
    } = read_reference(&request.reference, &request.options)?;
    template_out.write_json(&template)?;

    let Some((mut skeleton_out, mut docx_out)) = fill_outputs else {
        let size = template_out.commit()?;
        return Ok(ToolResponse::written(
            "clone_format",
            &template_file,
            size,
            structure_details(&template),
        )
        .with_warnings(warnings));
    };

    let tree = match &request.content {
        Some(path) => ContentTree::load(path)?,
        None => ContentTree::skeleton(&template),
    };
    if let Some(pending) = skeleton_out.as_mut() {
        pending.write_json(&tree)?;
    }

    log::info!("Stage 3: Filling {} sections", tree.sections.len());
    let report = write_filled(&template, &tree, &mut docx_out)?;
    warnings.extend(report.warnings);

    let content_file = skeleton_out.as_ref().map_or_else(
        || request.content.clone().unwrap_or_default(),
        |pending| pending.target().to_path_buf(),
    );
    template_out.commit()?;
    if let Some(pending) = skeleton_out {
        pending.commit()?;
    }
    let output = docx_out.target().to_path_buf();
    let size = docx_out.commit()?;

    let details = json!({
        "template_file": template_file,
        "content_file": content_file,
        "sections_filled": tree.sections.len(),
        "statistics": template.statistics,
    });
    Ok(ToolResponse::written("clone_format", &output, size, details).with_warnings(warnings))
}

/// Markdown file to its block list
pub fn parse_markdown(config: &AppConfig, input: &Path, no_filter: bool) -> Result<ToolResponse> {
    let text = read_text(input, MARKDOWN_EXTENSIONS)?;
    let nodes = config.markdown_parser(no_filter)?.parse(&text);
    let counts = nodes
        .iter()
        .map(|n| n.type_name())
        .counts()
        .into_iter()
        .sorted()
        .map(|(name, count)| (name.to_string(), json!(count)))
        .collect::<serde_json::Map<_, _>>();

    let details = json!({
        "block_count": nodes.len(),
        "block_types": counts,
        "blocks": nodes,
    });
    Ok(ToolResponse::success("parse_markdown", details))
}

/// Registered style templates, with the configured default marked
pub fn list_templates(registry: &StyleRegistry, config: &AppConfig) -> ToolResponse {
    let templates = registry.list_templates();
    log::info!("Templates: {}", templates.iter().map(|t| &t.name).join(", "));
    ToolResponse::success(
        "list_templates",
        json!({
            "default": config.generate.default_template,
            "templates": templates,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocError;
    use std::fs;

    #[test]
    fn test_derived_path() {
        assert_eq!(
            derived_path(Path::new("in/ref.docx"), None, "_template.json"),
            PathBuf::from("in/ref_template.json")
        );
        assert_eq!(
            derived_path(Path::new("in/ref_template.json"), None, "_content.json"),
            PathBuf::from("in/ref_content.json")
        );
        assert_eq!(
            derived_path(Path::new("ref.docx"), Some(Path::new("out")), "_clone.docx"),
            PathBuf::from("out/ref_clone.docx")
        );
    }

    #[test]
    fn test_unknown_template_fails_before_touching_output() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("r.md");
        fs::write(&input, "# T").unwrap();
        let request = GenerateRequest {
            input,
            output: dir.path().join("out").join("r.docx"),
            template: Some("weekly".to_string()),
            ..Default::default()
        };

        // Act
        let result = generate_word_report(
            &StyleRegistry::builtin().unwrap(),
            &AppConfig::default(),
            &request,
        );

        // Assert
        assert!(matches!(result, Err(DocError::UnknownTemplate { .. })));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_parse_markdown_counts_blocks() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("r.md");
        fs::write(&input, "# T\n\npara\n\n- a\n- b\n\nmore").unwrap();

        // Act
        let response = parse_markdown(&AppConfig::default(), &input, false).unwrap();

        // Assert
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["details"]["block_count"], 4);
        assert_eq!(value["details"]["block_types"]["paragraph"], 2);
        assert_eq!(value["details"]["blocks"][0]["type"], "heading");
    }

    #[test]
    fn test_list_templates_includes_builtins() {
        let response = list_templates(&StyleRegistry::builtin().unwrap(), &AppConfig::default());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["details"]["templates"].as_array().unwrap().len(), 4);
        assert_eq!(value["details"]["default"], "project_summary");
    }

    #[test]
    fn test_list_templates_reports_configured_default() {
        // Arrange
        let mut config = AppConfig::default();
        config.generate.default_template = "organize_plan".to_string();

        // Act
        let response = list_templates(&StyleRegistry::builtin().unwrap(), &config);

        // Assert
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["details"]["default"], "organize_plan");
    }
}
