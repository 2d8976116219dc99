//! Port for localized reply texts.

/// Key to localized string lookup.
///
/// Lookups never fail: unknown keys resolve to the key itself.
pub trait MessageCatalog: Send + Sync {
    /// Text for `key`, or `key` when absent.
    fn text(&self, key: &str) -> String;

    /// Text for `key` with `{0}`, `{1}`, ... replaced by `args`.
    fn render(&self, key: &str, args: &[&str]) -> String {
        args.iter()
            .enumerate()
            .fold(self.text(key), |text, (index, arg)| {
                text.replace(&format!("{{{index}}}"), arg)
            })
    }
}
