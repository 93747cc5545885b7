/// Result of running an extractor over a detail or reader page.
///
/// `NotFound` is an expected outcome (the series or chapter doesn't exist
/// upstream, or the layout changed beyond recognition), so it is a value
/// rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Found(T),
    NotFound,
}
impl<T> Outcome<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Outcome::Found(value) => Some(value),
            Outcome::NotFound => None,
        }
    }
}
