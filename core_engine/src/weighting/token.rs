use std::fmt;

const WEIGHT_MARK: char = '/';
const COUNT_MARK: char = '*';

/// One entrant as `<name>[/<weight>][*<count>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub name: String,
    pub weight: u32,
    pub count: u32,
}

impl Token {
    pub fn new(name: impl Into<String>, weight: u32, count: u32) -> Self {
        Self {
            name: name.into(),
            weight: weight.max(1),
            count: count.max(1),
        }
    }

    /// Never fails: missing parts default to an empty name and 1.
    pub fn parse(raw: &str) -> Self {
        let name = raw
            .trim_start()
            .split(|ch: char| ch == WEIGHT_MARK || ch == COUNT_MARK)
            .next()
            .unwrap_or("")
            .trim();
        Self::new(
            name,
            marked_number(raw, WEIGHT_MARK).unwrap_or(1),
            marked_number(raw, COUNT_MARK).unwrap_or(1),
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.weight > 1 {
            write!(f, "{WEIGHT_MARK}{}", self.weight)?;
        }
        if self.count > 1 {
            write!(f, "{COUNT_MARK}{}", self.count)?;
        }
        Ok(())
    }
}

/// Digits after the first `mark` that is immediately followed by one.
fn marked_number(raw: &str, mark: char) -> Option<u32> {
    raw.match_indices(mark).find_map(|(idx, _)| {
        let rest = &raw[idx + mark.len_utf8()..];
        let end = rest
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(rest.len());
        (end > 0).then(|| saturating_parse(&rest[..end]))
    })
}

fn saturating_parse(digits: &str) -> u32 {
    digits.bytes().fold(0u32, |acc, b| {
        acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
    })
}
