/// Combines the `watch()` streams of several fields into one stream that
/// yields a fresh clone of the owner whenever any field changes.
///
/// # Example
/// ```ignore
/// impl MyProperties {
///     pub fn watch(&self) -> impl Stream<Item = Self> + Send {
///         watch_all!(self, state, position)
///     }
/// }
/// ```
#[macro_export]
macro_rules! watch_all {
    ($self:expr, $($source:ident),+ $(,)?) => {
        {
            use ::futures::StreamExt;

            let snapshot = $self.clone();
            let streams: Vec<::futures::stream::BoxStream<'static, ()>> = vec![
                $($self.$source.watch().map(|_| ()).boxed(),)+
            ];
            ::futures::stream::select_all(streams).map(move |_| snapshot.clone())
        }
    };
}
