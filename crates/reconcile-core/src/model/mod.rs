mod external;
mod named;
mod performer;
mod tag;

pub use external::{ExternalId, PerformerRecord};
pub use named::{Entity, Named};
pub use performer::{Gender, GenderParseError, Performer};
pub use tag::Tag;
