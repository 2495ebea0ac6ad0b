// Reply side of the `/cgi` codec.
//
// A reply looks like:
//
//   [2,1,0,0,0,0]0
//   signalStrength=3
//   networkType=3
//   [error]0
//
// A bracketed header opens an object belonging to the act with the trailing
// index; `name=value` lines fill it; `[error]<code>` ends the reply.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Error;

/// One decoded object instance: field name to raw string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParamObject {
    stack: String,
    fields: BTreeMap<String, String>,
}

impl ParamObject {
    /// Build an object from literal pairs.
    pub fn from_pairs<'a>(stack: &str, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            stack: stack.to_owned(),
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
        }
    }

    /// Raw value of a field, if the device sent it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The instance address from the header, e.g. `2,1,0,0,0,0` (or `cgi`).
    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A decoded session-call reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    objects: Vec<(usize, ParamObject)>,
    error_code: i64,
}

impl Reply {
    /// Parse a reply body.
    ///
    /// Only the shape is checked here: a missing `[error]` terminator, a
    /// header without `]`, or a non-numeric index/code is a
    /// [`Error::MalformedResponse`]. A non-zero error code is *not* an error
    /// at this layer; see [`Reply::error_code`].
    pub fn decode(body: &str) -> Result<Self, Error> {
        let mut objects: Vec<(usize, ParamObject)> = Vec::new();
        let mut error_code = None;

        for line in body.lines() {
            if let Some(header) = line.strip_prefix('[') {
                let (tag, index) = header
                    .split_once(']')
                    .ok_or_else(|| Error::malformed(format!("unterminated header {line:?}"), body))?;
                let index = index.trim();

                if tag == "error" {
                    let code = index.parse::<i64>().map_err(|_| {
                        Error::malformed(format!("non-numeric error code {index:?}"), body)
                    })?;
                    error_code = Some(code);
                    break;
                }

                let index = index.parse::<usize>().map_err(|_| {
                    Error::malformed(format!("non-numeric act index in {line:?}"), body)
                })?;
                objects.push((
                    index,
                    ParamObject {
                        stack: tag.to_owned(),
                        fields: BTreeMap::new(),
                    },
                ));
                continue;
            }

            // Lines before the first header carry nothing we address.
            if let (Some((name, value)), Some((_, object))) =
                (line.split_once('='), objects.last_mut())
            {
                object.fields.insert(name.to_owned(), value.to_owned());
            }
        }

        let error_code =
            error_code.ok_or_else(|| Error::malformed("missing [error] terminator", body))?;

        Ok(Self {
            objects,
            error_code,
        })
    }

    /// The `[error]` code; `0` means every act succeeded.
    pub fn error_code(&self) -> i64 {
        self.error_code
    }

    /// All objects returned for the act at `index` in the batch.
    pub fn objects(&self, index: usize) -> impl Iterator<Item = &ParamObject> {
        self.objects
            .iter()
            .filter(move |(i, _)| *i == index)
            .map(|(_, object)| object)
    }

    /// The first object returned for the act at `index`.
    pub fn object(&self, index: usize) -> Option<&ParamObject> {
        self.objects(index).next()
    }

    /// Consume the reply, keeping the objects for the act at `index`.
    pub fn into_objects(self, index: usize) -> Vec<ParamObject> {
        self.objects
            .into_iter()
            .filter(|(i, _)| *i == index)
            .map(|(_, object)| object)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_object() {
        let body = "[2,1,0,0,0,0]0\nsignalStrength=3\nnetworkType=3\n[error]0\n";
        let reply = Reply::decode(body).expect("well-formed");

        assert_eq!(reply.error_code(), 0);
        let link = reply.object(0).expect("object for act 0");
        assert_eq!(link.stack(), "2,1,0,0,0,0");
        assert_eq!(link.get("signalStrength"), Some("3"));
        assert_eq!(link.get("networkType"), Some("3"));
        assert_eq!(link.get("simStatus"), None);
    }

    #[test]
    fn groups_list_entries_by_act_index() {
        let body = "[0,0,0,0,0,0]0\r\n\
                    [1,0,0,0,0,0]1\r\nindex=1\r\nunread=1\r\n\
                    [2,0,0,0,0,0]1\r\nindex=2\r\nunread=0\r\n\
                    [error]0\r\n";
        let reply = Reply::decode(body).expect("well-formed");

        assert_eq!(reply.objects(0).count(), 1);
        let messages: Vec<_> = reply.objects(1).collect();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].get("index"), Some("1"));
        assert_eq!(messages[1].get("unread"), Some("0"));
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let body = "[1,0,0,0,0,0]0\ncontent=a=b\n[error]0";
        let reply = Reply::decode(body).expect("well-formed");
        assert_eq!(reply.object(0).and_then(|o| o.get("content")), Some("a=b"));
    }

    #[test]
    fn multi_line_value_keeps_only_its_first_line() {
        let body = "[1,0,0,0,0,0]0\ncontent=see you\nat noon\nunread=1\n[error]0\n";
        let reply = Reply::decode(body).expect("well-formed");
        let entry = reply.object(0).expect("entry");
        assert_eq!(entry.get("content"), Some("see you"));
        assert_eq!(entry.fields().len(), 2);
    }

    #[test]
    fn nonzero_error_code_is_reported_not_raised() {
        let reply = Reply::decode("[error]71017\n").expect("well-formed");
        assert_eq!(reply.error_code(), 71017);
        assert!(reply.object(0).is_none());
    }

    #[test]
    fn cgi_section_is_accepted() {
        let reply = Reply::decode("[cgi]0\n$.ret=0;\n[error]0\n").expect("well-formed");
        assert_eq!(reply.object(0).map(ParamObject::stack), Some("cgi"));
    }

    #[test]
    fn missing_terminator_is_malformed() {
        let err = Reply::decode("[2,1,0,0,0,0]0\nsignalStrength=3\n").expect_err("should not decode");
        assert!(matches!(err, Error::MalformedResponse { .. }), "{err:?}");
    }

    #[test]
    fn garbage_headers_are_malformed() {
        for body in ["[2,1,0,0,0,0\n[error]0", "[2,1,0,0,0,0]x\n[error]0", "[error]ok"] {
            let err = Reply::decode(body).expect_err("should not decode");
            assert!(matches!(err, Error::MalformedResponse { .. }), "{body:?}: {err:?}");
        }
    }

    #[test]
    fn html_page_is_malformed() {
        let err = Reply::decode("<html><body>login</body></html>").expect_err("should not decode");
        assert!(err.is_connection_failed());
    }
}
