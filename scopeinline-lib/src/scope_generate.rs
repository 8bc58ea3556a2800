use crate::parser::{html, serialize};
use crate::scope::{ScopeConfig, ScopeSession};
use crate::ScopeError;
use log::info;
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;

pub mod scope_inline {
    use super::*;

    /// One file to scope: read `input`, write the result to `output`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FileJob {
        pub input: PathBuf,
        pub output: PathBuf,
    }

    /// Parses `html_content`, scopes every inline style and serializes the
    /// result. Each call is its own page, so ids start over at
    /// `config.first_id`.
    ///
    /// # Arguments
    ///
    /// * `html_content` - The page to scope.
    /// * `config` - Prefix, marker and first id for the page.
    ///
    /// # Returns
    ///
    /// The serialized page, or `ScopeError` when `config` does not validate.
    pub fn generate(html_content: &str, config: &ScopeConfig) -> Result<String, ScopeError> {
        let dom_tree = html::create_dom_tree(html_content);
        // The parsed document is complete, so starting the session already
        // runs the first pass.
        ScopeSession::start(&dom_tree, config.clone())?.stop();
        Ok(serialize::serialize_document(&dom_tree))
    }

    /// Scopes one file on disk.
    ///
    /// # Arguments
    ///
    /// * `job` - Where to read the page from and where to write it.
    /// * `config` - Shared by every job of a batch.
    ///
    /// # Returns
    ///
    /// `Ok(())` once `job.output` is written. Read and write failures carry
    /// the offending path.
    pub fn generate_file(job: &FileJob, config: &ScopeConfig) -> Result<(), ScopeError> {
        let html_content = fs::read_to_string(&job.input).map_err(|source| ScopeError::Read {
            path: job.input.clone(),
            source,
        })?;
        let scoped = generate(&html_content, config)?;
        fs::write(&job.output, scoped).map_err(|source| ScopeError::Write {
            path: job.output.clone(),
            source,
        })?;
        info!("{} -> {}", job.input.display(), job.output.display());
        Ok(())
    }

    /// Runs every job in parallel. Results come back in job order.
    pub fn generate_files(jobs: &[FileJob], config: &ScopeConfig) -> Vec<Result<(), ScopeError>> {
        jobs.par_iter()
            .map(|job| generate_file(job, config))
            .collect()
    }
}
