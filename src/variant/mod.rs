//! Output specs and their expansion into concrete variants.
//!
//! A spec field holding an array means "one variant per element"; several
//! array fields multiply. `expand` resolves derived fields against source
//! metadata, normalizes every value and produces the cartesian product.

mod expand;
mod field;
mod normalize;
mod product;
mod spec;

pub use expand::{VariantDescriptor, expand};
pub use field::{DeriveFn, Field, MetaTransform};
pub use normalize::{NormalizedOptions, OptionValue, normalize};
pub use product::cartesian_product;
pub use spec::{OptionKey, OutputSpec};
