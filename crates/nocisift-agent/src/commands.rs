//! Command handlers. Each prints a plain-text report to stdout; diagnostics
//! go through tracing to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use nocisift_common::{Candidate, TargetCatalog};
use nocisift_db::{CandidateRepository, Database, FavoriteRepository, SearchLogRepository};
use nocisift_ingestion::ChemblClient;
use nocisift_molecules::{evaluate, placeholder_svg, DescriptorCalculator};
use nocisift_ranker::{export_candidates, CandidateSearch, RiskScorer, SearchRequest};
use tracing::{info, warn};

use crate::config::{Config, SearchConfig};
use crate::session::SearchSession;

/// Candidates shown as cards before the full table.
const TOP_CARDS: usize = 6;

/// Command-line search options. Unset values fall back to `[search]`.
#[derive(Debug, Default)]
pub struct SearchOptions {
    pub target: String,
    pub potency: Option<f64>,
    pub limit: Option<usize>,
    pub min_score: Option<f64>,
    pub lipinski_only: Option<bool>,
    pub export: Option<PathBuf>,
    pub save: bool,
}

impl SearchOptions {
    /// The request to run and the drug-score threshold applied afterwards.
    pub fn request(&self, defaults: &SearchConfig) -> anyhow::Result<(SearchRequest, f64)> {
        let request = SearchRequest {
            target: self.target.clone(),
            potency_ceiling_nm: self.potency.unwrap_or(defaults.potency_ceiling_nm),
            limit: self.limit.unwrap_or(defaults.limit),
            lipinski_only: self.lipinski_only.unwrap_or(defaults.lipinski_only),
        };
        let drug_score_min = self.min_score.unwrap_or(defaults.drug_score_min);
        if !(0.0..=1.0).contains(&drug_score_min) {
            anyhow::bail!("--min-score must be between 0 and 1, got {drug_score_min}");
        }
        Ok((request, drug_score_min))
    }
}

/// Long-lived services shared by the commands.
pub struct App {
    config: Config,
    calculator: Arc<DescriptorCalculator>,
    scorer: RiskScorer,
    catalog: TargetCatalog,
    db: Arc<Database>,
}

impl App {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let calculator = Arc::new(DescriptorCalculator::new(
            config.descriptors.mode,
            config.descriptors.cache_capacity,
        ));
        let scorer = config.scoring.clone().map(RiskScorer::new).unwrap_or_default();
        let catalog = config.catalog()?;

        let db = Database::open(&config.database.url)
            .await
            .with_context(|| format!("opening database {}", config.database.url))?;
        db.initialize().await?;

        Ok(Self { config, calculator, scorer, catalog, db: Arc::new(db) })
    }

    pub async fn close(&self) {
        self.db.close().await;
    }

    pub fn targets(&self) {
        for target in self.catalog.iter() {
            println!("{:<18} {:<12} {}", target.name, target.accession, target.description);
        }
    }

    pub async fn search(&self, options: SearchOptions) -> anyhow::Result<()> {
        let (request, drug_score_min) = options.request(&self.config.search)?;

        let source = Arc::new(ChemblClient::with_settings(self.config.chembl_settings())?);
        let search = CandidateSearch::new(source, self.calculator.clone())
            .with_scorer(self.scorer.clone())
            .with_catalog(self.catalog.clone())
            .with_bounds(self.config.search_bounds())
            .with_timeout(self.config.retrieval_timeout());

        let report = search.search(&request).await?;
        for d in &report.dropped {
            info!(compound = %d.compound_id, reason = %d.reason, "Skipped unparseable structure");
        }
        println!(
            "{}: {} records retrieved, {} duplicates collapsed, {} unparseable, {} failed Rule of Five",
            report.target.name,
            report.retrieved,
            report.duplicates_collapsed,
            report.dropped.len(),
            report.lipinski_excluded,
        );

        let potency_ceiling_nm = request.potency_ceiling_nm;
        let mut session = SearchSession::new();
        session.record(report, drug_score_min);
        let results = session.results();

        if results.is_empty() {
            println!("No candidates. Try another target or a higher potency ceiling.");
        } else {
            if let Some(s) = session.summary() {
                println!(
                    "{} candidates | mean IC50 {:.0} nM | mean drug score {:.2} | Rule of Five pass {} | mean MW {:.0}",
                    s.count, s.mean_potency_nm, s.mean_drug_score, s.lipinski_passing, s.mean_molecular_weight
                );
            }
            if session.below_threshold() > 0 {
                println!("{} below drug score {drug_score_min}", session.below_threshold());
            }
            println!();
            for c in session.top(TOP_CARDS) {
                print_card(c);
            }
            println!();
            print_table(results);
        }

        if options.save {
            let target_name = session.last_target().unwrap_or_default();
            if let Some(saved) = self.save_results(target_name, potency_ceiling_nm, results).await? {
                println!("Saved {saved} candidates");
            }
        }

        if let Some(path) = options.export {
            export_candidates(&path, results)?;
            println!("Exported to {}", path.display());
        }
        Ok(())
    }

    /// Upsert the results and log the search. An empty result set is
    /// neither saved nor logged.
    pub async fn save_results(
        &self,
        target: &str,
        potency_ceiling_nm: f64,
        results: &[Candidate],
    ) -> anyhow::Result<Option<u64>> {
        if results.is_empty() {
            return Ok(None);
        }
        let saved = CandidateRepository::new(self.db.clone()).upsert_candidates(results).await?;
        SearchLogRepository::new(self.db.clone())
            .append_search_log(target, potency_ceiling_nm, results.len() as u32)
            .await?;
        Ok(Some(saved))
    }

    pub async fn analyze(
        &self,
        smiles: &str,
        svg: Option<&Path>,
        size: u32,
        favorite: bool,
        note: Option<&str>,
    ) -> anyhow::Result<()> {
        let descriptors = self.calculator.compute(smiles)?;
        let lipinski = evaluate(&descriptors);
        let risk = self.scorer.score(&descriptors)?;

        println!("Structure        {smiles}");
        println!("Interpreter      {}", descriptors.mode);
        println!("MW               {:.1}", descriptors.molecular_weight);
        println!("LogP             {:.2}", descriptors.logp);
        println!("HBD              {}", descriptors.hbd);
        println!("HBA              {}", descriptors.hba);
        println!("TPSA             {:.1} Å²", descriptors.tpsa);
        println!("Rotatable bonds  {}", descriptors.rotatable_bonds);
        println!("Aromatic rings   {}", descriptors.aromatic_rings);
        println!();
        println!("Drug score       {:.2}", nocisift_common::entities::round_display(1.0 - risk));
        println!("Side-effect risk {:.2}", nocisift_common::entities::round_display(risk));
        if lipinski.pass {
            println!("Rule of Five     pass");
        } else {
            println!("Rule of Five     fail: {}", lipinski.violation_labels());
        }

        if let Some(path) = svg {
            let image = match self.calculator.render(smiles, size) {
                Some(image) => image,
                None => {
                    warn!(mode = %self.calculator.mode(), "Depiction unavailable, writing placeholder");
                    placeholder_svg(size)
                }
            };
            std::fs::write(path, image).with_context(|| format!("writing {}", path.display()))?;
            println!("Structure card written to {}", path.display());
        }

        if favorite {
            let id = custom_compound_id(smiles);
            FavoriteRepository::new(self.db.clone()).add_favorite(&id, note).await?;
            println!("Added favorite {id}");
        }
        Ok(())
    }

    pub async fn saved(&self, target: Option<&str>, export: Option<&Path>) -> anyhow::Result<()> {
        // accept accessions and loose casing, but filter on whatever was given
        // when the catalog does not know it
        let target = target.map(|t| match self.catalog.resolve(t) {
            Ok(resolved) => resolved.name.clone(),
            Err(_) => t.to_string(),
        });
        let saved = CandidateRepository::new(self.db.clone())
            .saved_compounds(target.as_deref())
            .await?;
        if saved.is_empty() {
            println!("No saved candidates.");
        } else {
            print_table(&saved);
        }
        if let Some(path) = export {
            export_candidates(path, &saved)?;
            println!("Exported to {}", path.display());
        }
        Ok(())
    }

    pub async fn list_favorites(&self) -> anyhow::Result<()> {
        let favorites = FavoriteRepository::new(self.db.clone()).favorites().await?;
        if favorites.is_empty() {
            println!("No favorites.");
        }
        for f in favorites {
            let added = f.added_at.format("%Y-%m-%d %H:%M");
            let note = f.note.as_deref().unwrap_or("");
            match &f.compound {
                Some(c) => println!(
                    "{:<16} {added}  {:<18} score {:.2}  {note}",
                    f.compound_id,
                    c.target,
                    c.drug_score_display()
                ),
                None => println!("{:<16} {added}  {:<18} {:<11} {note}", f.compound_id, "-", ""),
            }
        }
        Ok(())
    }

    pub async fn add_favorite(&self, compound_id: &str, note: Option<&str>) -> anyhow::Result<()> {
        FavoriteRepository::new(self.db.clone()).add_favorite(compound_id, note).await?;
        println!("Added favorite {compound_id}");
        Ok(())
    }

    pub async fn remove_favorite(&self, compound_id: &str) -> anyhow::Result<()> {
        FavoriteRepository::new(self.db.clone()).remove_favorite(compound_id).await?;
        println!("Removed favorite {compound_id}");
        Ok(())
    }

    pub async fn history(&self, limit: u32) -> anyhow::Result<()> {
        let entries = SearchLogRepository::new(self.db.clone()).search_history(limit).await?;
        if entries.is_empty() {
            println!("No searches yet.");
        }
        for e in entries {
            println!(
                "{}  {:<18} ≤{:>7.0} nM  {} results",
                e.searched_at.format("%Y-%m-%d %H:%M"),
                e.target,
                e.potency_ceiling_nm,
                e.result_count
            );
        }
        Ok(())
    }
}

/// Favorite id for an ad-hoc structure.
fn custom_compound_id(smiles: &str) -> String {
    let prefix: String = smiles.chars().take(10).collect();
    format!("CUSTOM_{prefix}")
}

fn print_card(c: &Candidate) {
    let badge = if c.lipinski.pass { "Ro5 pass" } else { "Ro5 fail" };
    println!(
        "{:<16} score {:.2}  {badge:<8}  IC50 {:.0} nM | MW {:.0} | LogP {:.2}",
        c.compound_id,
        c.drug_score_display(),
        c.potency_nm,
        c.descriptors.molecular_weight,
        c.descriptors.logp,
    );
}

fn print_table(candidates: &[Candidate]) {
    println!(
        "{:<16} {:<18} {:>9} {:>7} {:>6} {:>6} {:>4} {:>4} {:>6} {:>6} {:<4} VIOLATIONS",
        "CHEMBL_ID", "TARGET", "IC50_NM", "MW", "LOGP", "TPSA", "HBD", "HBA", "DRUG", "RISK", "RO5"
    );
    for c in candidates {
        let d = &c.descriptors;
        println!(
            "{:<16} {:<18} {:>9.1} {:>7.1} {:>6.2} {:>6.1} {:>4} {:>4} {:>6.3} {:>6.3} {:<4} {}",
            c.compound_id,
            c.target,
            c.potency_nm,
            d.molecular_weight,
            d.logp,
            d.tpsa,
            d.hbd,
            d.hba,
            c.drug_score_display(),
            c.risk_score_display(),
            if c.lipinski.pass { "yes" } else { "no" },
            c.lipinski.violation_labels(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nocisift_common::{DescriptorBundle, InterpreterMode, LipinskiResult};

    async fn in_memory_app() -> App {
        let config = Config::from_toml(
            r#"
            [database]
            url = "sqlite::memory:"
            "#,
        )
        .unwrap();
        App::build(config).await.unwrap()
    }

    fn candidate(id: &str) -> Candidate {
        Candidate {
            compound_id: id.to_string(),
            target: "TRPV1".to_string(),
            smiles: "CC(=O)Nc1ccc(O)cc1".to_string(),
            potency_nm: 50.0,
            descriptors: DescriptorBundle {
                molecular_weight: 151.2,
                logp: 1.35,
                hbd: 2,
                hba: 3,
                tpsa: 49.3,
                rotatable_bonds: 1,
                aromatic_rings: 1,
                mode: InterpreterMode::Exact,
            },
            lipinski: LipinskiResult { pass: true, violations: vec![] },
            risk_score: 0.0,
            drug_score: 1.0,
        }
    }

    #[test]
    fn test_custom_id_uses_first_ten_characters() {
        assert_eq!(custom_compound_id("CC(=O)Nc1ccc(O)cc1"), "CUSTOM_CC(=O)Nc1c");
        assert_eq!(custom_compound_id("CCO"), "CUSTOM_CCO");
    }

    #[test]
    fn test_unset_options_take_search_config() {
        let config = Config::from_toml(
            r#"
            [search]
            potency_ceiling_nm = 500.0
            limit = 50
            drug_score_min = 0.7
            lipinski_only = false
            "#,
        )
        .unwrap();
        let options = SearchOptions { target: "TRPV1".to_string(), ..SearchOptions::default() };
        let (request, drug_score_min) = options.request(&config.search).unwrap();
        assert_eq!(request.potency_ceiling_nm, 500.0);
        assert_eq!(request.limit, 50);
        assert!(!request.lipinski_only);
        assert_eq!(drug_score_min, 0.7);
    }

    #[test]
    fn test_command_line_overrides_search_config() {
        let defaults = SearchConfig::default();
        assert!(defaults.lipinski_only);
        let options = SearchOptions {
            target: "TRPV1".to_string(),
            limit: Some(20),
            lipinski_only: Some(false),
            ..SearchOptions::default()
        };
        let (request, _) = options.request(&defaults).unwrap();
        assert_eq!(request.limit, 20);
        assert!(!request.lipinski_only);

        let out_of_range = SearchOptions { min_score: Some(1.5), ..SearchOptions::default() };
        assert!(out_of_range.request(&defaults).is_err());
    }

    #[tokio::test]
    async fn test_empty_results_are_not_saved_or_logged() {
        let app = in_memory_app().await;
        assert_eq!(app.save_results("TRPV1", 1000.0, &[]).await.unwrap(), None);
        let history = SearchLogRepository::new(app.db.clone()).search_history(10).await.unwrap();
        assert!(history.is_empty());

        let saved = app.save_results("TRPV1", 1000.0, &[candidate("CHEMBL112")]).await.unwrap();
        assert_eq!(saved, Some(1));
        let history = SearchLogRepository::new(app.db.clone()).search_history(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].result_count, 1);
        app.close().await;
    }
}
