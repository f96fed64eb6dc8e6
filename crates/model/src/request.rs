/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelRequest {
    /// The input messages.
    pub messages: Vec<ModelMessage>,
}

/// A complete message.
///
/// Conversations in this system only ever carry user text and assistant
/// text. Tool results are embedded into assistant messages by the caller
/// before the request is built, so there is no dedicated tool role.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelMessage {
    /// A user input text.
    User(String),
    /// An assistant text.
    Assistant(String),
}
