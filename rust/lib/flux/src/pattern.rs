use std::sync::RwLock;

/// A parsed MQTT-style path pattern.
///
/// Segments are separated by `/`:
/// - a literal segment matches itself
/// - `+` matches exactly one segment
/// - `#` matches any number of remaining segments, including none, and must
///   be the final segment
///
/// `resource/#` therefore matches `resource` itself as well as
/// `resource/hosts` and `resource/hosts/page/2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Single,
    Multi,
}

impl Pattern {
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split('/')
            .map(|s| match s {
                "+" => Segment::Single,
                "#" => Segment::Multi,
                other => Segment::Literal(other.to_string()),
            })
            .collect();
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    /// The pattern as it was written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern contains any wildcard.
    pub fn is_exact(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Test a concrete path against this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let mut levels = path.split('/');
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                // `#` only counts when it is the last segment.
                Segment::Multi => return i + 1 == self.segments.len(),
                Segment::Single => {
                    if levels.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(lit) => match levels.next() {
                    Some(level) if level == lit => {}
                    _ => return false,
                },
            }
        }
        levels.next().is_none()
    }
}

/// An ordered registry of `(pattern, value)` pairs.
///
/// Lookups return every value whose pattern matches, in registration order.
/// Registration order matters to callers: request handlers run in the order
/// they were added.
pub struct PatternTable<T> {
    entries: RwLock<Vec<(Pattern, T)>>,
}

impl<T: Clone> PatternTable<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn insert(&self, pattern: &str, value: T) {
        self.entries
            .write()
            .unwrap()
            .push((Pattern::parse(pattern), value));
    }

    /// Remove values registered under exactly `pattern` for which `pred`
    /// returns true. Returns the number removed.
    pub fn remove<F>(&self, pattern: &str, pred: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|(p, v)| !(p.as_str() == pattern && pred(v)));
        before - entries.len()
    }

    /// All values whose pattern matches `path`, in registration order.
    pub fn match_path(&self, path: &str) -> Vec<T> {
        self.entries
            .read()
            .unwrap()
            .iter()
            .filter(|(p, _)| p.matches(path))
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Whether a value is registered under exactly this pattern string.
    pub fn has_pattern(&self, pattern: &str) -> bool {
        self.entries
            .read()
            .unwrap()
            .iter()
            .any(|(p, _)| p.as_str() == pattern)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for PatternTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
