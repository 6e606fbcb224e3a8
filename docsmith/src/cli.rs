//! Command-line interface definitions for docsmith

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the docsmith application
#[derive(Parser)]
#[command(name = "docsmith")]
#[command(version)]
#[command(about = "Styled Word reports from Markdown, and format cloning of existing documents", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./docsmith.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the result envelope as JSON instead of a summary
    #[arg(long, global = true)]
    pub json: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for docsmith
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a styled Word report from a Markdown file
    Generate {
        /// Markdown source file
        input: PathBuf,

        /// Output .docx path
        #[arg(short, long)]
        output: PathBuf,

        /// Style template name (see list-templates)
        #[arg(short, long)]
        template: Option<String>,

        /// Project name for the running header
        #[arg(long)]
        project_name: Option<String>,

        /// Report type for the running header
        #[arg(long)]
        report_type: Option<String>,

        /// Keep generation metadata lines and sections
        #[arg(long)]
        no_filter: bool,
    },

    /// Extract a structure template from a reference .docx
    Extract {
        /// Reference Word document
        input: PathBuf,

        /// Template descriptor path (defaults to <stem>_template.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat headings deeper than this as body paragraphs
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,

        /// Strip outline numbers such as "1.2" or "一、" from headings
        #[arg(long)]
        clean_numbering: bool,
    },

    /// Fill a structure template with a content descriptor
    Fill {
        /// Structure template descriptor (.json)
        template: PathBuf,

        /// Content descriptor (.json)
        content: PathBuf,

        /// Output .docx path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write an editable content descriptor mirroring a structure template
    Skeleton {
        /// Structure template descriptor (.json)
        template: PathBuf,

        /// Content descriptor path (defaults to <stem>_content.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract, derive content and fill in one step
    Clone {
        /// Reference Word document
        reference: PathBuf,

        /// Directory for the generated files
        #[arg(long, default_value = "docsmith-output")]
        output_dir: PathBuf,

        /// Only extract the structure template
        #[arg(long)]
        template_only: bool,

        /// Content descriptor to fill instead of a skeleton of the reference
        #[arg(long)]
        content: Option<PathBuf>,

        /// Strip outline numbers from headings
        #[arg(long)]
        clean_numbering: bool,
    },

    /// Parse a Markdown file and print its block list
    Parse {
        /// Markdown source file
        input: PathBuf,

        /// Keep generation metadata lines and sections
        #[arg(long)]
        no_filter: bool,
    },

    /// List available style templates
    ListTemplates,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        // Arrange
        let args = ["docsmith", "generate", "r.md", "-o", "r.docx", "-t", "organize_plan", "--json"];

        // Act
        let cli = Cli::try_parse_from(args).unwrap();

        // Assert
        assert!(cli.json);
        let Commands::Generate {
            template, no_filter, ..
        } = cli.command
        else {
            panic!("expected generate");
        };
        assert_eq!(template.as_deref(), Some("organize_plan"));
        assert!(!no_filter);
    }
}
