//! nocisift-molecules: structure notation in, descriptors and drug-likeness out.
//!
//! 1. Parsing SMILES into a molecular graph (`smiles`, `molecule`)
//! 2. Ring perception and aromaticity (`ring`)
//! 3. Descriptor computation, exact and heuristic (`descriptors`, `crippen`, `heuristic`)
//! 4. Interpreter selection and caching (`interpreter`)
//! 5. Lipinski Rule of Five (`druglikeness`)
//! 6. Depiction (`render`)

pub mod element;
pub mod molecule;
pub mod smiles;
pub mod ring;
pub mod crippen;
pub mod descriptors;
pub mod heuristic;
pub mod interpreter;
pub mod druglikeness;
pub mod render;

pub use druglikeness::evaluate;
pub use interpreter::{
    DescriptorCalculator, ExactInterpreter, HeuristicInterpreter, ParseFailure, StructureInterpreter,
};
pub use render::placeholder_svg;
pub use smiles::{parse_smiles, SmilesError};
