//! docsmith - styled Word documents from Markdown and reference documents
//!
//! Two workflows share one document model:
//! - **Generate**: Markdown is parsed into block nodes and rendered with a
//!   named style template ([`styles`], [`markdown`], [`builder`]).
//! - **Clone**: a reference `.docx` is read ([`reader`]), its structure and
//!   styles are extracted into a JSON template ([`structure`]), and new
//!   content is poured into that template ([`builder`]).
//!
//! [`operations`] ties the stages together for the CLI and returns a
//! [`response::ToolResponse`] envelope.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod builder;
pub mod config;
pub mod docx_writer;
pub mod error;
pub mod format;
pub mod input;
pub mod markdown;
pub mod operations;
pub mod output;
pub mod reader;
pub mod response;
pub mod structure;
pub mod styles;
