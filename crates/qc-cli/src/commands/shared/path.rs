/// `{collection}/{id}` with the id percent-encoded.
#[must_use]
pub fn resource_path(collection: &str, id: &str) -> String {
    format!("{collection}/{}", urlencoding::encode(id.trim()))
}

#[cfg(test)]
mod tests {
    use super::resource_path;

    #[test]
    fn encodes_ids() {
        assert_eq!(resource_path("/core/users", "42"), "/core/users/42");
        assert_eq!(resource_path("/core/quests", "a/b "), "/core/quests/a%2Fb");
    }
}
