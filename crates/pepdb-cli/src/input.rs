use std::path::PathBuf;

use anyhow::{ensure, Context};
use clap::ArgMatches;
use pepdb_core::database::{Builder, Parameters};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
/// Actual index parameters - may include overrides or default values not set by user
pub struct Search {
    pub version: String,
    pub database: Parameters,
    pub export_fasta: bool,
    pub output_paths: Vec<String>,

    #[serde(skip_serializing)]
    pub output_directory: PathBuf,
}

#[derive(Deserialize)]
/// Input parameters deserialized from JSON file
pub struct Input {
    database: Builder,
    output_directory: Option<String>,
    export_fasta: Option<bool>,
}

impl Input {
    pub fn from_arguments(matches: ArgMatches) -> anyhow::Result<Self> {
        let path = matches
            .get_one::<String>("parameters")
            .context("missing path to configuration parameters")?;
        let mut input = Input::load(path)
            .with_context(|| format!("Failed to read parameters from `{path}`"))?;

        // Handle JSON configuration overrides
        if let Some(output_directory) = matches.get_one::<String>("output_directory") {
            log::trace!("overriding `output_directory` parameter.");
            input.output_directory = Some(output_directory.into());
        }
        if let Some(fasta) = matches.get_one::<String>("fasta") {
            log::trace!("overriding `database.fasta` parameter.");
            input.database.update_fasta(fasta.into());
        }
        if matches.get_flag("export-fasta") {
            log::trace!("overriding `export_fasta` parameter.");
            input.export_fasta = Some(true);
        }

        Ok(input)
    }

    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        pepdb_core::read_json(path).map_err(anyhow::Error::from)
    }

    pub fn build(self) -> anyhow::Result<Search> {
        ensure!(
            self.database.fasta.is_some(),
            "`database.fasta` must be set. For more information try '--help'"
        );

        let database = self.database.make_parameters()?;

        let enzyme = &database.enzyme_parameters;
        if enzyme.min_len > enzyme.max_len {
            log::warn!(
                "Minimum peptide length ({}) is greater than maximum ({}): no peptides will be generated",
                enzyme.min_len,
                enzyme.max_len
            );
        }
        if database.peptide_min_mass >= database.peptide_max_mass {
            log::warn!(
                "`peptide_min_mass` ({}) is not below `peptide_max_mass` ({}): no peptides will be generated",
                database.peptide_min_mass,
                database.peptide_max_mass
            );
        }
        if database.generate_entrapments && database.seed.is_none() {
            log::warn!("entrapments will be shuffled without a `seed` and cannot be reproduced");
        }

        let output_directory = match self.output_directory {
            Some(path) => {
                let path = PathBuf::from(path);
                std::fs::create_dir_all(&path)
                    .with_context(|| format!("Failed to create `{}`", path.display()))?;
                path
            }
            None => std::env::current_dir()?,
        };

        Ok(Search {
            version: clap::crate_version!().into(),
            database,
            export_fasta: self.export_fasta.unwrap_or(false),
            output_paths: Vec::new(),
            output_directory,
        })
    }
}
