//! Live camera feed per lot.

use crate::lot::Lot;

const FEED_EXT: &str = ".mp4";

/// Video file for a lot: spaces become underscores
pub fn feed_file(lot_name: &str) -> String {
    format!("{}{}", lot_name.replace(' ', "_"), FEED_EXT)
}

pub struct FeedItem {
    pub lot: String,
    pub file: String,
}

pub fn feed_items<P>(lots: &[Lot<P>]) -> Vec<FeedItem> {
    lots.iter()
        .map(|l| FeedItem {
            lot: l.name.clone(),
            file: feed_file(&l.name),
        })
        .collect()
}
