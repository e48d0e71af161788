use super::ChatMessage;

/// Work requested by the UI loop, carried out by the actions service. Every
/// request is tagged with the sequence number of the workflow that issued it.
#[derive(Debug, PartialEq)]
pub enum Action {
    DescribeConstellation(u64, String),
    ContinueChat(u64, Vec<ChatMessage>, String),
}
