//! boardgame-shelf: core library for a personal board-game catalog built from BoardGameGeek data.

pub mod extract;
pub mod manifest;
pub mod merge;
pub mod types;

pub use extract::{
    collection_ids, collection_total, contains_item, decode_entities, parse_item, parse_items,
    split_items, FragmentReader, PatternReader,
};
pub use manifest::{parse_manifest, write_manifest};
pub use merge::{compare_names, merge_games, MergedGame, OutputDocument, PROVENANCE};
pub use types::*;
