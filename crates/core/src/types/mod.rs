mod ability;
mod platform;
mod test_definition;

pub use ability::{Ability, PreparedCommand, TechniqueRef};
pub use platform::{Dialect, Platform};
pub use test_definition::{Dependency, InputArgument, TestDefinition};
