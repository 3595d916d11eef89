//! Favorite animal ids for fast membership checks

/// Ordered, duplicate-free set of favorite animal ids
///
/// Values are never mutated once published; [`FavoriteSet::with`] and
/// [`FavoriteSet::without`] build new sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    ids: Vec<String>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, animal_id: &str) -> bool {
        self.ids.iter().any(|id| id == animal_id)
    }

    pub fn with(&self, animal_id: &str) -> Self {
        let mut ids = self.ids.clone();
        if !self.contains(animal_id) {
            ids.push(animal_id.to_string());
        }
        Self { ids }
    }

    pub fn without(&self, animal_id: &str) -> Self {
        Self {
            ids: self.ids.iter().filter(|id| *id != animal_id).cloned().collect(),
        }
    }

    /// Set `animal_id`'s membership to `member`
    pub fn with_membership(&self, animal_id: &str, member: bool) -> Self {
        if member {
            self.with(animal_id)
        } else {
            self.without(animal_id)
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.clone()
    }
}

impl FromIterator<String> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut ids: Vec<String> = Vec::new();
        for id in iter {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Self { ids }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_iter_dedups_in_order() {
        let set: FavoriteSet = ["b", "a", "b"].into_iter().map(String::from).collect();
        assert_eq!(set.to_vec(), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_with_without_leave_original_untouched() {
        let original: FavoriteSet = ["a"].into_iter().map(String::from).collect();
        let added = original.with("b");
        let removed = added.without("a");

        assert_eq!(original.len(), 1);
        assert!(added.contains("a") && added.contains("b"));
        assert!(!removed.contains("a"));
        assert_eq!(added.with("b"), added);
        assert_eq!(removed.with_membership("a", true).len(), 2);
    }
}
