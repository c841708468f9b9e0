use popcorn_models::WatchedEntry;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WatchedError {
    #[error("{0} is already in the watched list")]
    AlreadyWatched(String),
}

/// Append `entry`, keeping identifiers unique within the list
pub fn add_entry(list: &[WatchedEntry], entry: WatchedEntry) -> Result<Vec<WatchedEntry>, WatchedError> {
    if is_watched(list, &entry.external_id) {
        return Err(WatchedError::AlreadyWatched(entry.external_id));
    }
    let mut next = list.to_vec();
    next.push(entry);
    Ok(next)
}

/// Drop every entry with the given identifier
pub fn remove_entry(list: &[WatchedEntry], external_id: &str) -> Vec<WatchedEntry> {
    list.iter()
        .filter(|entry| entry.external_id != external_id)
        .cloned()
        .collect()
}

pub fn find_entry<'a>(list: &'a [WatchedEntry], external_id: &str) -> Option<&'a WatchedEntry> {
    list.iter().find(|entry| entry.external_id == external_id)
}

pub fn is_watched(list: &[WatchedEntry], external_id: &str) -> bool {
    find_entry(list, external_id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use popcorn_models::UserRating;

    fn create_entry(id: &str, title: &str, rating: u8) -> WatchedEntry {
        WatchedEntry {
            external_id: id.to_string(),
            title: title.to_string(),
            year: "1999".to_string(),
            poster_url: "N/A".to_string(),
            imdb_rating: Some(8.0),
            runtime_minutes: Some(120),
            user_rating: UserRating::new(rating).unwrap(),
        }
    }

    #[test]
    fn test_add_then_remove_restores_list() {
        let before = vec![create_entry("tt001", "Movie 1", 7), create_entry("tt002", "Movie 2", 9)];

        let added = add_entry(&before, create_entry("tt003", "Movie 3", 5)).unwrap();
        assert_eq!(added.len(), 3);
        assert_eq!(added[2].external_id, "tt003");

        let removed = remove_entry(&added, "tt003");
        assert_eq!(removed, before);
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let list = vec![create_entry("tt001", "Movie 1", 7)];
        let err = add_entry(&list, create_entry("tt001", "Movie 1", 3)).unwrap_err();
        assert_eq!(err, WatchedError::AlreadyWatched("tt001".to_string()));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let list = vec![create_entry("tt001", "Movie 1", 7)];
        assert_eq!(remove_entry(&list, "tt999"), list);
    }

    #[test]
    fn test_find_entry_exposes_user_rating() {
        let list = vec![create_entry("tt001", "Movie 1", 7), create_entry("tt002", "Movie 2", 9)];
        assert_eq!(find_entry(&list, "tt002").map(|e| e.user_rating.value()), Some(9));
        assert!(is_watched(&list, "tt001"));
        assert!(!is_watched(&list, "tt003"));
    }
}
