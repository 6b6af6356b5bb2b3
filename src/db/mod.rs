//! SQLite snapshot layer, split across logical submodules. It talks to the
//! roster core exclusively through `Manager`'s public API: loading replays
//! stored records through the same operations the UI uses, saving walks the
//! read iterators. Record layout is this module's concern alone.

mod connection;
mod snapshot;

pub use connection::ensure_schema;
pub use snapshot::{load_roster, save_roster};

#[cfg(test)]
pub(crate) use connection::open_in_memory;
