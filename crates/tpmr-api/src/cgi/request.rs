// Request side of the `/cgi` codec.

use std::fmt::Write;

use crate::error::Error;

/// Stack address used when an object is a singleton.
pub const DEFAULT_STACK: &str = "0,0,0,0,0,0";

/// Operation carried by a single act. [`ActKind::code`] is the value placed
/// in the `/cgi?` query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActKind {
    Get,
    Set,
    Add,
    Del,
    /// Get every instance of a list object.
    GetList,
    /// Get the instance addressed by the stack.
    GetStack,
    /// Run a device operation (reboot, etc.)
    Operation,
    /// Invoke a CGI handler such as `/cgi/logout`.
    Cgi,
}

impl ActKind {
    pub fn code(self) -> u8 {
        match self {
            Self::Get => 1,
            Self::Set => 2,
            Self::Add => 3,
            Self::Del => 4,
            Self::GetList => 5,
            Self::GetStack => 6,
            Self::Operation => 7,
            Self::Cgi => 8,
        }
    }
}

/// One addressed operation on a parameter object or command.
///
/// For reads, `fields` names the attributes wanted back; for writes, each
/// entry is a `name=value` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Act {
    pub kind: ActKind,
    pub object: String,
    pub stack: String,
    pub parent_stack: String,
    pub fields: Vec<String>,
}

impl Act {
    pub fn new(kind: ActKind, object: impl Into<String>) -> Self {
        Self {
            kind,
            object: object.into(),
            stack: DEFAULT_STACK.to_owned(),
            parent_stack: DEFAULT_STACK.to_owned(),
            fields: Vec::new(),
        }
    }

    pub fn get(object: impl Into<String>) -> Self {
        Self::new(ActKind::Get, object)
    }

    pub fn get_list(object: impl Into<String>) -> Self {
        Self::new(ActKind::GetList, object)
    }

    pub fn set(object: impl Into<String>) -> Self {
        Self::new(ActKind::Set, object)
    }

    pub fn operation(object: impl Into<String>) -> Self {
        Self::new(ActKind::Operation, object)
    }

    pub fn cgi(object: impl Into<String>) -> Self {
        Self::new(ActKind::Cgi, object)
    }

    /// Address a specific instance.
    pub fn stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }

    /// Request (or assign) the given fields.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Append a single `name=value` assignment.
    pub fn assign(mut self, name: &str, value: impl std::fmt::Display) -> Self {
        self.fields.push(format!("{name}={value}"));
        self
    }
}

/// Query string for a batch: the act codes joined with `&`, e.g. `2&5`.
pub fn query_string(acts: &[Act]) -> String {
    acts.iter()
        .map(|act| act.kind.code().to_string())
        .collect::<Vec<_>>()
        .join("&")
}

/// Encode a batch into the device's request body.
///
/// Each act becomes
/// `[{object}#{stack}#{parent_stack}]{index},{count}\r\n{field}\r\n...`
/// where `index` is the act's position in the batch. The field block always
/// ends with `\r\n`, even when empty.
///
/// Fields are line-delimited and counted in the header, so a field holding
/// `\r` or `\n` is rejected with [`Error::InvalidValue`].
pub fn encode_acts(acts: &[Act]) -> Result<String, Error> {
    let mut body = String::new();
    for (index, act) in acts.iter().enumerate() {
        if let Some(field) = act.fields.iter().find(|f| f.contains(['\r', '\n'])) {
            let name = field.split_once('=').map_or(field.as_str(), |(name, _)| name);
            return Err(Error::InvalidValue {
                field: format!("{}.{name}", act.object),
                reason: "line breaks cannot be sent to the device".into(),
            });
        }
        let _ = write!(
            body,
            "[{}#{}#{}]{},{}\r\n{}\r\n",
            act.object,
            act.stack,
            act.parent_stack,
            index,
            act.fields.len(),
            act.fields.join("\r\n"),
        );
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn encodes_single_read() {
        let acts = [Act::get("IGD_DEV_INFO").fields(["modelName", "softwareVersion"])];
        assert_eq!(
            encode_acts(&acts).expect("encodes"),
            "[IGD_DEV_INFO#0,0,0,0,0,0#0,0,0,0,0,0]0,2\r\nmodelName\r\nsoftwareVersion\r\n"
        );
        assert_eq!(query_string(&acts), "1");
    }

    #[test]
    fn encodes_empty_field_list_with_trailing_newline() {
        let acts = [Act::operation("ACT_REBOOT")];
        assert_eq!(
            encode_acts(&acts).expect("encodes"),
            "[ACT_REBOOT#0,0,0,0,0,0#0,0,0,0,0,0]0,0\r\n\r\n"
        );
        assert_eq!(query_string(&acts), "7");
    }

    #[test]
    fn numbers_acts_in_batch_order() {
        let acts = [
            Act::set("LTE_SMS_RECVMSGBOX").assign("PageNumber", 1),
            Act::get_list("LTE_SMS_RECVMSGENTRY").fields(["index", "unread"]),
        ];
        assert_eq!(
            encode_acts(&acts).expect("encodes"),
            "[LTE_SMS_RECVMSGBOX#0,0,0,0,0,0#0,0,0,0,0,0]0,1\r\nPageNumber=1\r\n\
             [LTE_SMS_RECVMSGENTRY#0,0,0,0,0,0#0,0,0,0,0,0]1,2\r\nindex\r\nunread\r\n"
        );
        assert_eq!(query_string(&acts), "2&5");
    }

    #[test]
    fn custom_stack_is_used() {
        let act = Act::set("LAN_WLAN").stack("1,2,0,0,0,0").assign("enable", 0);
        assert_eq!(
            encode_acts(&[act]).expect("encodes"),
            "[LAN_WLAN#1,2,0,0,0,0#0,0,0,0,0,0]0,1\r\nenable=0\r\n"
        );
    }

    #[test]
    fn line_break_in_value_is_rejected() {
        let act = Act::set("LTE_SMS_SENDNEWMSG")
            .assign("to", "+15550100")
            .assign("textContent", "hello\r\nto=+19990000");
        let err = encode_acts(&[act]).expect_err("line break");
        assert!(
            matches!(&err, Error::InvalidValue { field, .. } if field == "LTE_SMS_SENDNEWMSG.textContent"),
            "got {err:?}"
        );
    }

    #[test]
    fn bare_newline_in_value_is_rejected() {
        let act = Act::set("LTE_SMS_SENDNEWMSG").assign("textContent", "two\nlines");
        assert!(encode_acts(&[act]).is_err());
    }
}
