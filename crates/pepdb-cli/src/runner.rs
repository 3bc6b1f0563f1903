use super::input::Search;
use anyhow::Context;
use log::info;
use pepdb_core::database::IndexedDatabase;
use std::path::PathBuf;
use std::time::Instant;

pub struct Runner {
    pub database: IndexedDatabase,
    pub parameters: Search,
    start: Instant,
}

impl Runner {
    pub fn new(parameters: Search) -> anyhow::Result<Self> {
        let start = Instant::now();
        let (fasta, warnings) = pepdb_core::read_fasta(
            &parameters.database.fasta,
            &parameters.database.decoy_tag,
            parameters.database.max_protein_len,
            &parameters.database.masses,
        )
        .with_context(|| {
            format!(
                "Failed to build database from `{}`",
                parameters.database.fasta
            )
        })?;

        for warning in &warnings {
            log::warn!("{}", warning);
        }
        info!(
            "read {} proteins from `{}` ({} warnings)",
            fasta.len(),
            parameters.database.fasta,
            warnings.len()
        );

        let database = parameters.database.build(fasta);
        info!(
            "generated {} peptides from {} proteins ({} with binding sites) in {:#?}",
            database.peptide_count(),
            database.protein_count(),
            database.adduct_peptide_count(),
            start.elapsed()
        );

        Ok(Self {
            database,
            parameters,
            start,
        })
    }

    pub(crate) fn make_path<S: AsRef<str>>(&self, file_name: S) -> PathBuf {
        self.parameters.output_directory.join(file_name.as_ref())
    }

    /// Write all outputs, and return the effective parameters including the
    /// paths that were written
    pub fn run(mut self) -> anyhow::Result<Search> {
        log::trace!("writing outputs");

        let path = self.write_peptides()?;
        self.parameters.output_paths.push(path);

        let path = self.write_mass_floor()?;
        self.parameters.output_paths.push(path);

        if self.parameters.export_fasta {
            let path = self.write_fasta()?;
            self.parameters.output_paths.push(path);
        }

        let path = self.make_path("results.json");
        self.parameters
            .output_paths
            .push(path.display().to_string());
        println!("{}", serde_json::to_string_pretty(&self.parameters)?);

        let bytes = serde_json::to_vec_pretty(&self.parameters)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write `{}`", path.display()))?;

        info!("finished in {}s", self.start.elapsed().as_secs());
        Ok(self.parameters)
    }
}
