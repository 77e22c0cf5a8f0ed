use uuid::Uuid;

const SEPARATOR: char = '_';

/// Chat channel key for a pair of participants: both identifiers sorted
/// lexicographically and joined. Independent of argument order.
pub fn channel_id(a: &Uuid, b: &Uuid) -> String {
    let (a, b) = (a.to_string(), b.to_string());
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    format!("{first}{SEPARATOR}{second}")
}
