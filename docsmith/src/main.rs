//! docsmith - styled Word documents from Markdown and reference documents
//!
//! A CLI tool for turning report Markdown into styled `.docx` files and for
//! cloning the format of an existing Word document.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use docsmith::config::{AppConfig, ProjectInfo};
use docsmith::error::DocError;
use docsmith::operations::{self, CloneRequest, GenerateRequest};
use docsmith::response::ToolResponse;
use docsmith::structure::ExtractOptions;
use itertools::Itertools;

/// Main entry point for the docsmith CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let json = cli.json;
    match execute(&cli) {
        Ok(response) => {
            if json {
                println!("{}", response.to_json());
            } else {
                print_summary(&response);
            }
            Ok(())
        }
        Err(e) if json => {
            println!("{}", ToolResponse::from(&e).to_json());
            std::process::exit(1);
        }
        Err(e) => {
            let hints = e.suggestions();
            if !hints.is_empty() {
                eprintln!("Hints:\n  - {}", hints.iter().join("\n  - "));
            }
            Err(e).context("docsmith operation failed")
        }
    }
}

fn execute(cli: &Cli) -> Result<ToolResponse, DocError> {
    let config = AppConfig::discover(cli.config.as_deref())?;

    match &cli.command {
        Commands::Generate {
            input,
            output,
            template,
            project_name,
            report_type,
            no_filter,
        } => {
            let registry = operations::load_registry(&config)?;
            let request = GenerateRequest {
                input: input.clone(),
                output: output.clone(),
                template: template.clone(),
                project: ProjectInfo {
                    project_name: project_name.clone(),
                    report_type: report_type.clone(),
                },
                no_filter: *no_filter,
            };
            operations::generate_word_report(&registry, &config, &request)
        }

        Commands::Extract {
            input,
            output,
            max_depth,
            clean_numbering,
        } => {
            let options = ExtractOptions {
                max_depth: *max_depth,
                clean_numbering: *clean_numbering,
            };
            operations::extract_document_structure(input, output.as_deref(), &options)
        }

        Commands::Fill {
            template,
            content,
            output,
        } => operations::fill_template_files(template, content, output),

        Commands::Skeleton { template, output } => {
            operations::skeleton(template, output.as_deref())
        }

        Commands::Clone {
            reference,
            output_dir,
            template_only,
            content,
            clean_numbering,
        } => {
            let request = CloneRequest {
                reference: reference.clone(),
                output_dir: output_dir.clone(),
                template_only: *template_only,
                content: content.clone(),
                options: ExtractOptions {
                    max_depth: None,
                    clean_numbering: *clean_numbering,
                },
            };
            operations::clone_format(&request)
        }

        Commands::Parse { input, no_filter } => {
            operations::parse_markdown(&config, input, *no_filter)
        }

        Commands::ListTemplates => {
            let registry = operations::load_registry(&config)?;
            Ok(operations::list_templates(&registry, &config))
        }
    }
}

/// Human-readable summary of a successful response
fn print_summary(response: &ToolResponse) {
    let ToolResponse::Success {
        operation,
        output_file,
        file_size,
        warnings,
        details,
    } = response
    else {
        return;
    };

    match operation.as_str() {
        "list_templates" => print_templates(details),
        "parse_markdown" => {
            let blocks = details.get("blocks").cloned().unwrap_or_default();
            println!(
                "{}",
                serde_json::to_string_pretty(&blocks).unwrap_or_else(|_| blocks.to_string())
            );
        }
        _ => {
            if let (Some(path), Some(size)) = (output_file, file_size) {
                println!("✓ Successfully wrote: {} ({} bytes)", path.display(), size);
            }
            print_detail_lines(details);
        }
    }

    if !warnings.is_empty() {
        println!("\n{} warning(s):", warnings.len());
        for warning in warnings {
            println!("  - {}", warning);
        }
    }
}

fn print_templates(details: &serde_json::Value) {
    println!("Available style templates:\n");
    let default = details.get("default").and_then(|d| d.as_str()).unwrap_or("");
    for template in details
        .get("templates")
        .and_then(|t| t.as_array())
        .into_iter()
        .flatten()
    {
        let name = template.get("name").and_then(|v| v.as_str()).unwrap_or("");
        let marker = if name == default { " (default)" } else { "" };
        println!(
            "  {}{} - {}",
            name,
            marker,
            template
                .get("display_name")
                .and_then(|v| v.as_str())
                .unwrap_or("")
        );
        if let Some(description) = template.get("description").and_then(|v| v.as_str()) {
            if !description.is_empty() {
                println!("    {}", description);
            }
        }
    }
    println!("\nUsage: docsmith generate <input.md> -o <output.docx> -t <template>");
}

fn print_detail_lines(details: &serde_json::Value) {
    let Some(map) = details.as_object() else {
        return;
    };
    for (key, value) in map {
        match value {
            serde_json::Value::String(s) => println!("  {}: {}", key, s),
            serde_json::Value::Number(n) => println!("  {}: {}", key, n),
            serde_json::Value::Array(items) => println!(
                "  {}: {}",
                key,
                items
                    .iter()
                    .map(|i| i.as_str().map_or_else(|| i.to_string(), str::to_string))
                    .join(", ")
            ),
            _ => {}
        }
    }
}
