//! Sandboxed filesystem access beneath a single root directory.
//! Path resolution and containment, directory listing, and the mutation operations
//! used by the HTTP API.

pub mod root;
pub mod names;
pub mod size;
pub mod listing;
pub mod ops;
pub mod upload;

pub use root::{Root, ResolveError, client_parent, client_join};
pub use names::{validate_entry_name, upload_basename};
pub use size::format_size;
pub use listing::{EntryDescriptor, DirectoryListing, ListMode, list_directory};
pub use ops::{resolve_for_write, delete_entry, rename_entry, make_directory, move_entry};
pub use upload::{UploadRequest, UploadOutcome, SpooledUpload, spool, store_upload};
