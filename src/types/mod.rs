//! Value types shared by the graph, engine and cache layers.

mod commit;
mod identity;
mod object_id;
mod reference;

pub use commit::Commit;
pub use identity::Identity;
pub use object_id::{OBJECT_ID_LEN, ObjectId};
pub use reference::Ref;
