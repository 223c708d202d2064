/// True if any pattern is contained in the entity id or the friendly name, ignoring case.
pub fn is_match(entity_id: &str, friendly_name: &str, patterns: &[String]) -> bool {
    let entity_id = entity_id.to_lowercase();
    let friendly_name = friendly_name.to_lowercase();

    patterns
        .iter()
        .map(|p| p.to_lowercase())
        .filter(|p| !p.is_empty())
        .any(|p| entity_id.contains(&p) || friendly_name.contains(&p))
}
