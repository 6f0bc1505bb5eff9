use std::collections::HashMap;


/// An immutable snapshot of environment variables.
///
/// Lookups and `expand` substitutions of one load are done against a single
/// snapshot, so that concurrent changes to the process environment cannot
/// lead to inconsistent results. Use [`Vars::os`] for the process
/// environment or build one from pairs for tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vars(HashMap<String, String>);

impl Vars {
    /// Captures the current process environment. Variables whose name or
    /// value is not valid Unicode are skipped.
    pub fn os() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds all pairs of `other` whose key is not present yet.
    pub fn merge_missing(&mut self, other: impl IntoIterator<Item = (String, String)>) {
        for (k, v) in other {
            self.0.entry(k).or_insert(v);
        }
    }

    /// Replaces `${NAME}` and `$NAME` by the value of `NAME`, or by the empty
    /// string if it is not set. A `$` that does not start a reference is
    /// kept as is.
    pub fn expand(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut rest = s;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            if let Some(braced) = after.strip_prefix('{') {
                match braced.find('}') {
                    Some(end) => {
                        out.push_str(self.get(&braced[..end]).unwrap_or(""));
                        rest = &braced[end + 1..];
                    }
                    None => {
                        out.push_str(&rest[pos..]);
                        rest = "";
                    }
                }
                continue;
            }

            let len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            if len == 0 {
                out.push('$');
            } else {
                out.push_str(self.get(&after[..len]).unwrap_or(""));
            }
            rest = &after[len..];
        }

        out.push_str(rest);
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Vars {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
