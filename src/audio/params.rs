// Flat ASCII key-value parameter encoding used by the framework for both
// global and per-stream configuration: `key=value;key=value`.
//
// Unknown keys are ignored by consumers, never rejected, so the map preserves
// everything it is given, in order.

/// Order-preserving key-value parameter set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    pairs: Vec<(String, String)>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value;key=value`. Empty segments and segments without `=`
    /// are skipped; they carry no information the HAL can act on.
    pub fn parse(encoded: &str) -> Self {
        let mut pairs = Vec::new();
        for segment in encoded.split(';') {
            if segment.is_empty() {
                continue;
            }
            if let Some((key, value)) = segment.split_once('=') {
                if !key.is_empty() {
                    pairs.push((key.to_string(), value.to_string()));
                }
            }
        }
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parse a value as a decimal integer, if present and well formed.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(pair) = self.pairs.iter_mut().find(|(k, _)| k == key) {
            pair.1 = value;
        } else {
            self.pairs.push((key.to_string(), value));
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    /// Serialize back to the `key=value;key=value` wire form.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(";")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_encode_round_trip() {
        let params = ParameterMap::parse("routing=2;tty_mode=tty_full");
        assert_eq!(params.get("routing"), Some("2"));
        assert_eq!(params.get("tty_mode"), Some("tty_full"));
        assert_eq!(params.encode(), "routing=2;tty_mode=tty_full");
    }

    #[test]
    fn parse_skips_malformed_segments() {
        let params = ParameterMap::parse(";;novalue;=orphan;key=ok;");
        assert_eq!(params.get("key"), Some("ok"));
        assert!(!params.contains("novalue"));
        assert!(!params.contains(""));
    }

    #[test]
    fn set_replaces_in_place() {
        let mut params = ParameterMap::parse("a=1;b=2");
        params.set("a", "3");
        assert_eq!(params.encode(), "a=3;b=2");
    }

    #[test]
    fn get_int_rejects_garbage() {
        let params = ParameterMap::parse("routing=abc;count=7");
        assert_eq!(params.get_int("routing"), None);
        assert_eq!(params.get_int("count"), Some(7));
    }

    #[test]
    fn values_may_contain_equals() {
        let params = ParameterMap::parse("expr=a=b");
        assert_eq!(params.get("expr"), Some("a=b"));
    }
}
