//! Header shaping for the outbound envelope.
//!
//! The single-valued `headers` field of an envelope cannot repeat a key, so a
//! header with several values is spread across casing variants of its name
//! (`set-cookie`, `Set-cookie`, `sEt-cookie`, ...). Clients treat header names
//! case-insensitively and see every value again.
//!
//! Known limitations, kept for wire compatibility:
//! - a name with `n` ASCII letters has only `2^n` variants, so surplus values
//!   are dropped;
//! - a generated variant can collide with a genuinely differently-cased header
//!   from the response, in which case the later write wins.

use super::MultiValuedHeaders;

/// Iterator over the upper/lower casing variants of a header name.
///
/// Variants come out in binary counting order over the name's letters, the
/// first letter toggling fastest and starting from all-lowercase:
/// `ab` yields `ab`, `Ab`, `aB`, `AB`. Non-letters are kept as-is.
#[derive(Debug, Clone)]
pub struct CasePermutations {
    chars: Vec<char>,
    next: u64,
    end: Option<u64>,
    exhausted: bool,
}

impl CasePermutations {
    pub fn new(name: &str) -> Self {
        Self {
            chars: name.chars().collect(),
            next: 0,
            end: casing_slots(name),
            exhausted: false,
        }
    }
}

impl Iterator for CasePermutations {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.exhausted || self.end.is_some_and(|end| self.next >= end) {
            return None;
        }

        let index = self.next;
        match self.next.checked_add(1) {
            Some(n) => self.next = n,
            None => self.exhausted = true,
        }

        let mut out = String::with_capacity(self.chars.len());
        let mut bit = 0u32;
        for &c in &self.chars {
            if c.is_ascii_alphabetic() {
                let upper = bit < u64::BITS && (index >> bit) & 1 == 1;
                out.push(if upper {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                });
                bit += 1;
            } else {
                out.push(c);
            }
        }
        Some(out)
    }
}

/// Number of distinct casings of `name`, or `None` when it does not fit in a
/// `u64` (64 letters or more, far beyond any realistic value count).
pub fn casing_slots(name: &str) -> Option<u64> {
    let letters = name.chars().filter(char::is_ascii_alphabetic).count();
    u32::try_from(letters)
        .ok()
        .and_then(|n| 1u64.checked_shl(n))
}

/// Flatten headers into a single-valued map, spreading repeated names across
/// casing variants.
///
/// Names with one value keep their original casing. The result is an ordered
/// list of unique keys.
pub fn split_headers(headers: &MultiValuedHeaders) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();

    for (name, values) in headers.grouped() {
        if values.len() == 1 {
            let value = values.into_iter().next().unwrap_or_default();
            insert_or_replace(&mut out, name, value);
            continue;
        }

        if let Some(slots) = casing_slots(&name) {
            let wanted = values.len() as u64;
            if wanted > slots {
                tracing::warn!(
                    header = %name,
                    values = wanted,
                    slots,
                    "header_values_dropped: not enough casing variants"
                );
            }
        }

        for (value, casing) in values.into_iter().zip(CasePermutations::new(&name)) {
            insert_or_replace(&mut out, casing, value);
        }
    }

    out
}

/// Group headers into a multi-valued map, one entry per distinct name.
pub fn group_headers(headers: &MultiValuedHeaders) -> Vec<(String, Vec<String>)> {
    headers.grouped()
}

fn insert_or_replace(out: &mut Vec<(String, String)>, key: String, value: String) {
    match out.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => out.push((key, value)),
    }
}
