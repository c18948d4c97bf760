//! Structure interpreters and the caching descriptor calculator.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use thiserror::Error;
use tracing::debug;

use nocisift_common::{DescriptorBundle, InterpreterMode};

use crate::{descriptors, heuristic, render, smiles};

/// A notation that could not be interpreted. Local to one compound; callers
/// drop the compound and carry on.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot interpret '{notation}': {reason}")]
pub struct ParseFailure {
    pub notation: String,
    pub reason: String,
}

impl ParseFailure {
    fn new(notation: &str, reason: impl ToString) -> Self {
        Self { notation: notation.to_string(), reason: reason.to_string() }
    }
}

/// Turns structure notation into descriptors and, where supported, a
/// depiction. Implementations never panic on malformed input.
pub trait StructureInterpreter: Send + Sync {
    fn mode(&self) -> InterpreterMode;

    fn compute(&self, notation: &str) -> Result<DescriptorBundle, ParseFailure>;

    /// Image bytes for the structure, or `None` if it cannot be depicted.
    fn render(&self, notation: &str, pixel_size: u32) -> Option<Vec<u8>>;
}

/// Full SMILES parse with graph-based descriptors.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactInterpreter;

impl StructureInterpreter for ExactInterpreter {
    fn mode(&self) -> InterpreterMode {
        InterpreterMode::Exact
    }

    fn compute(&self, notation: &str) -> Result<DescriptorBundle, ParseFailure> {
        let mol = smiles::parse_smiles(notation).map_err(|e| ParseFailure::new(notation, e))?;
        Ok(descriptors::compute(&mol))
    }

    fn render(&self, notation: &str, pixel_size: u32) -> Option<Vec<u8>> {
        let mol = smiles::parse_smiles(notation).ok()?;
        Some(render::structure_card(&mol.formula(), notation.trim(), pixel_size))
    }
}

/// Character-scan estimates. Cannot depict.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicInterpreter;

impl StructureInterpreter for HeuristicInterpreter {
    fn mode(&self) -> InterpreterMode {
        InterpreterMode::Heuristic
    }

    fn compute(&self, notation: &str) -> Result<DescriptorBundle, ParseFailure> {
        heuristic::estimate(notation).map_err(|e| ParseFailure::new(notation, e))
    }

    fn render(&self, _notation: &str, _pixel_size: u32) -> Option<Vec<u8>> {
        None
    }
}

type CacheEntry = Result<DescriptorBundle, ParseFailure>;

/// Descriptor calculator with one interpreter chosen at construction and a
/// bounded LRU keyed by notation. Failures are cached too.
pub struct DescriptorCalculator {
    interpreter: Box<dyn StructureInterpreter>,
    cache: Option<Mutex<LruCache<String, CacheEntry>>>,
}

impl DescriptorCalculator {
    /// Build a calculator for `mode`. A capacity of zero disables caching.
    pub fn new(mode: InterpreterMode, cache_capacity: usize) -> Self {
        let interpreter: Box<dyn StructureInterpreter> = match mode {
            InterpreterMode::Exact => Box::new(ExactInterpreter),
            InterpreterMode::Heuristic => Box::new(HeuristicInterpreter),
        };
        Self::with_interpreter(interpreter, cache_capacity)
    }

    pub fn with_interpreter(interpreter: Box<dyn StructureInterpreter>, cache_capacity: usize) -> Self {
        let cache = NonZeroUsize::new(cache_capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        Self { interpreter, cache }
    }

    pub fn mode(&self) -> InterpreterMode {
        self.interpreter.mode()
    }

    pub fn compute(&self, notation: &str) -> Result<DescriptorBundle, ParseFailure> {
        if let Some(hit) = self.cached(notation) {
            return hit;
        }

        let result = self.interpreter.compute(notation);
        if let Err(failure) = &result {
            debug!(mode = %self.mode(), reason = %failure.reason, "Notation rejected");
        }
        if let Some(cache) = &self.cache {
            if let Ok(mut guard) = cache.lock() {
                guard.put(notation.to_string(), result.clone());
            }
        }
        result
    }

    pub fn render(&self, notation: &str, pixel_size: u32) -> Option<Vec<u8>> {
        self.interpreter.render(notation, pixel_size)
    }

    /// Number of cached notations.
    pub fn cached_len(&self) -> usize {
        self.cache
            .as_ref()
            .and_then(|c| c.lock().ok().map(|g| g.len()))
            .unwrap_or(0)
    }

    fn cached(&self, notation: &str) -> Option<CacheEntry> {
        let cache = self.cache.as_ref()?;
        let mut guard = cache.lock().ok()?;
        guard.get(notation).cloned()
    }
}

impl std::fmt::Debug for DescriptorCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorCalculator")
            .field("mode", &self.mode())
            .field("cached", &self.cached_len())
            .finish()
    }
}
