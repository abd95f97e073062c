/// Capability to raise a user-visible alert.
///
/// Fire-and-forget: delivery errors are logged by the implementation, never
/// propagated into the scheduling loop.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}
