/// Cosmetic labels shown while a constellation is being fetched. They pace the
/// loading screen and say nothing about actual gateway progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadingPhase {
    Charting,
    Painting,
}

impl LoadingPhase {
    pub fn label(&self) -> &'static str {
        match self {
            LoadingPhase::Charting => return "Consulting the star charts...",
            LoadingPhase::Painting => return "Painting the constellation...",
        }
    }

    /// Shown when the loading screen is up without a phase label.
    pub fn placeholder() -> &'static str {
        return "Traveling to the Stars...";
    }
}
