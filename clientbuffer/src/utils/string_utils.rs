/// Channel type prefixes recognised on the wire
const CHANTYPES: &[char] = &['#', '&', '!', '+'];

pub fn is_channel_name(name: &str) -> bool {
    name.starts_with(CHANTYPES)
}
