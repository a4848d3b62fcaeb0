mod argument;
mod declaration;
mod scalar;

pub use argument::{Argument, Position};
pub use declaration::{FlagValue, ParameterDeclaration, VarEntry, flatten_entries};
pub use scalar::{Number, Scalar};
