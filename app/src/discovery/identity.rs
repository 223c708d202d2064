use regex::Regex;

/// Derives the device id from the first capture group of `pattern`. The entity id takes precedence over the
/// friendly name, so all entities of one physical device resolve to the same id as long as their ids share a stem.
pub fn extract_device_id(entity_id: &str, friendly_name: &str, pattern: &Regex) -> Option<String> {
    first_capture(entity_id, pattern).or_else(|| first_capture(friendly_name, pattern))
}

fn first_capture(input: &str, pattern: &Regex) -> Option<String> {
    pattern
        .captures(input)?
        .get(1)
        .map(|m| m.as_str().to_owned())
        .filter(|id| !id.is_empty())
}
