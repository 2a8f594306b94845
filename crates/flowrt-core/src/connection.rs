/// Reserved instance id denoting "the enclosing graph's own port" in a
/// [`Connection`] endpoint.
pub const THIS_INSTANCE: &str = "__this";

/// One side of a [`Connection`]: an instance id and a pin name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Endpoint {
    pub ins_id: String,
    pub pin_id: String,
}

impl Endpoint {
    #[must_use]
    pub fn new(ins_id: impl Into<String>, pin_id: impl Into<String>) -> Self {
        Self {
            ins_id: ins_id.into(),
            pin_id: pin_id.into(),
        }
    }

    #[must_use]
    pub fn is_this(&self) -> bool {
        self.ins_id == THIS_INSTANCE
    }

    /// The stable `<nodeId>.<pinName>` port identity string.
    #[must_use]
    pub fn port_id(&self) -> String {
        format!("{}.{}", self.ins_id, self.pin_id)
    }
}

/// A directed edge between two `(node, pin)` pairs.
///
/// `delayed` and `hidden` are parsed and preserved for round-tripping but
/// have no runtime effect in the core engine (the `delayed` flag is an open
/// design question upstream; see `DESIGN.md`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connection {
    pub from: Endpoint,
    pub to: Endpoint,
    #[cfg_attr(feature = "serde", serde(default))]
    pub delayed: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hidden: bool,
}

impl Connection {
    #[must_use]
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self {
            from,
            to,
            delayed: false,
            hidden: false,
        }
    }
}
