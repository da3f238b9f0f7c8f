/// Cleans rendered message text before it is placed in an event.
///
/// Only the multi-line path goes through the redactor; single values are
/// rendered with their `Display` output unchanged. Any
/// `Fn(&str) -> String` can be used directly.
pub trait Redactor: Send + Sync {
    fn clean(&self, text: &str) -> String;
}

/// A redactor that returns the text as-is.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRedactor;

impl Redactor for NoopRedactor {
    fn clean(&self, text: &str) -> String {
        text.to_string()
    }
}

impl<F> Redactor for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn clean(&self, text: &str) -> String {
        self(text)
    }
}
