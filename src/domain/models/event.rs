use super::ConstellationDetails;

#[derive(Debug, PartialEq)]
pub enum Event {
    ChatReplyFailed(u64),
    ChatReplyResolved(u64, Option<String>),
    ConstellationFailed(u64),
    ConstellationResolved(u64, Option<ConstellationDetails>),
    KeyboardBackspace(),
    KeyboardCTRLC(),
    KeyboardChar(char),
    KeyboardDown(),
    KeyboardEnter(),
    KeyboardEsc(),
    KeyboardTab(),
    KeyboardUp(),
    LoadingPhaseElapsed(u64),
    UIResize(),
    UIScrollDown(),
    UIScrollUp(),
    UITick(),
}
