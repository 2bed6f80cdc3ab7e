mod ids;
mod record;
pub(crate) mod track;

pub use ids::TrackId;
pub use record::{BibleChapterRecord, HymnRecord, PlaylistRow, TrackRecord};
pub use track::{SourceType, Track};
